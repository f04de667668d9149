//! UniFi controller source: session lifecycle plus station listing.
//!
//! The controller only honors cookie-authenticated requests and
//! penalizes frequent logins. [`UnifiClient`] signs in once, caches the
//! rebuilt cookie header (plus anti-forgery token) for eight minutes,
//! and re-authenticates lazily after a session rejection.

mod client;
mod models;

pub use client::UnifiClient;
pub use models::Flavor;

use std::time::Duration;

use secrecy::SecretString;

/// How long a cached session is trusted before the next sign-in.
/// Sits under typical controller session lifetimes and keeps the login
/// rate below the controller's penalty threshold.
pub(crate) const SESSION_TTL: Duration = Duration::from_secs(8 * 60);

/// Stations last seen within this many seconds count as online.
pub(crate) const ONLINE_WINDOW_SECS: i64 = 300;

/// Settings for the controller source.
#[derive(Debug, Clone)]
pub struct UnifiConfig {
    pub enabled: bool,
    /// Controller root, e.g. `https://192.168.1.1`. A single trailing
    /// slash is tolerated and stripped.
    pub base_url: String,
    pub username: String,
    pub password: SecretString,
    /// Site identifier, `default` on almost every home controller.
    pub site: String,
    pub flavor: Flavor,
    /// Accept the controller's self-signed certificate.
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl Default for UnifiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            username: String::new(),
            password: SecretString::from(String::new()),
            site: "default".into(),
            flavor: Flavor::UnifiOs,
            accept_invalid_certs: true,
            timeout: Duration::from_secs(10),
        }
    }
}

/// One authenticated controller session.
///
/// `cookie_header` is the already-joined `name=value; ...` string sent
/// back verbatim on every request; `csrf_token` rides along as
/// `X-CSRF-Token` when the controller issued one.
#[derive(Debug, Clone)]
pub struct Session {
    pub cookie_header: String,
    pub csrf_token: Option<String>,
}
