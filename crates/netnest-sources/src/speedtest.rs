//! Bandwidth probe: run the Ookla CLI, cache the parsed result.
//!
//! A probe takes the better part of a minute and burns real bandwidth,
//! so successful results are cached for ten minutes and served from the
//! cache until they expire. Failed probes never touch the cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::TtlCell;
use crate::error::{Error, Result};
use crate::process;

/// Settings for the bandwidth probe.
#[derive(Debug, Clone)]
pub struct SpeedtestConfig {
    pub enabled: bool,
    /// Probe argv; the default emits Ookla's JSON format.
    pub command: Vec<String>,
    /// Wall-clock budget for one probe run.
    pub timeout: Duration,
    /// How long a successful result is served from cache.
    pub cache_ttl: Duration,
}

impl Default for SpeedtestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["speedtest".into(), "-f".into(), "json".into()],
            timeout: Duration::from_secs(120),
            cache_ttl: Duration::from_secs(600),
        }
    }
}

/// One parsed measurement, already in user-facing units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSnapshot {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: i64,
    /// When the probe ran; cached reads keep the original stamp.
    pub measured_at: DateTime<Utc>,
}

impl SpeedSnapshot {
    /// Whole minutes since the measurement was taken.
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.measured_at).num_minutes()
    }
}

/// Cached runner for the bandwidth probe.
pub struct SpeedProbe {
    config: SpeedtestConfig,
    cache: TtlCell<SpeedSnapshot>,
}

impl SpeedProbe {
    pub fn new(config: SpeedtestConfig) -> Self {
        Self {
            config,
            cache: TtlCell::new(),
        }
    }

    /// Measured or cached snapshot.
    ///
    /// A fresh cache entry short-circuits the probe entirely. A failed
    /// probe (timeout, non-zero exit, output matching no schema) yields
    /// `None` and leaves the cache untouched; an expired entry ages out
    /// on its own rather than being refreshed by a failure.
    pub async fn get_result(&self) -> Option<Arc<SpeedSnapshot>> {
        if !self.config.enabled {
            return None;
        }
        if let Some(snapshot) = self.cache.get() {
            debug!("bandwidth probe served from cache");
            return Some(snapshot);
        }
        match self.run_probe().await {
            Ok(snapshot) => Some(self.cache.put(snapshot, self.config.cache_ttl)),
            Err(err) => {
                warn!(error = %err, "bandwidth probe failed");
                None
            }
        }
    }

    async fn run_probe(&self) -> Result<SpeedSnapshot> {
        let capture = process::run(&self.config.command, self.config.timeout).await?;
        if !capture.success() {
            warn!(
                code = capture.exit_code,
                output = truncate(&capture.output, 200),
                "probe exited non-zero"
            );
            return Err(Error::CommandFailed {
                code: capture.exit_code,
            });
        }
        parse_snapshot(&capture.output)
            .ok_or(Error::UnexpectedPayload("probe output matched no schema"))
    }
}

type Parser = fn(&Value) -> Option<SpeedSnapshot>;

/// Schema variants in preference order. Ookla's current CLI nests
/// latency/bandwidth and reports bytes/second; the flat legacy shape
/// reports bits/second. Each variant declines (rather than erroring)
/// when both throughput directions come out non-positive.
const PARSERS: &[Parser] = &[parse_nested_bytes, parse_flat_bits];

fn parse_snapshot(output: &str) -> Option<SpeedSnapshot> {
    let body: Value = serde_json::from_str(output).ok()?;
    PARSERS.iter().find_map(|parse| parse(&body))
}

fn parse_nested_bytes(body: &Value) -> Option<SpeedSnapshot> {
    let download = number_at(body, "/download/bandwidth");
    let upload = number_at(body, "/upload/bandwidth");
    if download <= 0.0 && upload <= 0.0 {
        return None;
    }
    Some(SpeedSnapshot {
        download_mbps: round1(download / 125_000.0),
        upload_mbps: round1(upload / 125_000.0),
        ping_ms: number_at(body, "/ping/latency").round() as i64,
        measured_at: Utc::now(),
    })
}

fn parse_flat_bits(body: &Value) -> Option<SpeedSnapshot> {
    let download = number_at(body, "/download");
    let upload = number_at(body, "/upload");
    if download <= 0.0 && upload <= 0.0 {
        return None;
    }
    Some(SpeedSnapshot {
        download_mbps: round1(download / 1_000_000.0),
        upload_mbps: round1(upload / 1_000_000.0),
        ping_ms: number_at(body, "/ping").round() as i64,
        measured_at: Utc::now(),
    })
}

fn number_at(body: &Value, pointer: &str) -> f64 {
    body.pointer(pointer).and_then(Value::as_f64).unwrap_or_default()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
