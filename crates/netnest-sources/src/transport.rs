// Shared transport configuration for building reqwest::Client instances.
//
// Every HTTP-backed source builds its client here so TLS and timeout
// policy live in one place. No cookie jar is installed: the controller
// flow rebuilds its own Cookie header from raw Set-Cookie values and a
// jar would fight that.

use std::time::Duration;

use crate::error::Result;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Accept any certificate (self-signed local controllers). Only the
    /// client built from this config is affected.
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    /// Config with the given timeout and default TLS verification.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("netnest/0.1.0");

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(builder.build()?)
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by the Govee cloud client to inject the `Govee-API-Key`
    /// header on every request.
    pub fn build_client_with_headers(
        &self,
        headers: reqwest::header::HeaderMap,
    ) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("netnest/0.1.0")
            .default_headers(headers);

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(builder.build()?)
    }
}
