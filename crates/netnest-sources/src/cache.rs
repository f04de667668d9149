// Single-slot TTL caches
//
// Backs both the controller session cache and the probe result cache.
// One value, one expiry instant, atomically swapped. Reads are
// lock-free; two callers racing to refresh cannot corrupt the slot,
// the last writer wins and both observe a consistent entry.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::time::Instant;

/// A thread-safe cell holding at most one value with an expiry.
#[derive(Debug)]
pub struct TtlCell<T> {
    slot: ArcSwapOption<Entry<T>>,
}

#[derive(Debug)]
struct Entry<T> {
    value: Arc<T>,
    expires_at: Instant,
}

impl<T> TtlCell<T> {
    /// An empty cell.
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Return the cached value if present and its expiry is still in
    /// the future. An expired entry reads as absent; it is replaced on
    /// the next [`put`](Self::put) rather than eagerly cleared.
    pub fn get(&self) -> Option<Arc<T>> {
        let entry = self.slot.load_full()?;
        if Instant::now() < entry.expires_at {
            Some(Arc::clone(&entry.value))
        } else {
            None
        }
    }

    /// Store `value`, valid for `ttl` from now, replacing any previous
    /// entry. Returns the stored handle so callers can keep reading the
    /// value they just produced without a second lookup.
    pub fn put(&self, value: T, ttl: Duration) -> Arc<T> {
        let value = Arc::new(value);
        self.slot.store(Some(Arc::new(Entry {
            value: Arc::clone(&value),
            expires_at: Instant::now() + ttl,
        })));
        value
    }

    /// Drop whatever is cached, expired or not.
    pub fn invalidate(&self) {
        self.slot.store(None);
    }
}

impl<T> Default for TtlCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn serves_value_one_second_before_expiry() {
        let cell = TtlCell::new();
        cell.put(42u32, Duration::from_secs(480));
        advance(Duration::from_secs(479)).await;
        assert_eq!(cell.get().as_deref(), Some(&42));
    }

    #[tokio::test(start_paused = true)]
    async fn expires_value_one_second_after_ttl() {
        let cell = TtlCell::new();
        cell.put(42u32, Duration::from_secs(480));
        advance(Duration::from_secs(481)).await;
        assert!(cell.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_clears_fresh_value() {
        let cell = TtlCell::new();
        cell.put("cookie".to_owned(), Duration::from_secs(480));
        cell.invalidate();
        assert!(cell.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_replaces_previous_value() {
        let cell = TtlCell::new();
        cell.put(1u32, Duration::from_secs(10));
        let latest = cell.put(2u32, Duration::from_secs(10));
        assert_eq!(*latest, 2);
        assert_eq!(cell.get().as_deref(), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn put_returns_the_stored_handle() {
        let cell = TtlCell::new();
        let stored = cell.put(7u32, Duration::from_secs(10));
        let read = cell.get().unwrap();
        assert!(Arc::ptr_eq(&stored, &read));
    }
}
