// Controller HTTP client
//
// Sign-in is cookie based: POST credentials to each candidate login
// path until one response carries Set-Cookie, rebuild a single Cookie
// header from those values, and cache it with the anti-forgery token.
// Station fetches ride the cached session; a 401/403 clears it so the
// next call signs in again.

use std::sync::Arc;

use indexmap::IndexMap;
use reqwest::StatusCode;
use reqwest::header;
use secrecy::ExposeSecret;
use tracing::{debug, warn};
use url::Url;

use crate::cache::TtlCell;
use crate::error::{Error, Result};
use crate::model::{Device, DeviceStatus, Inventory};
use crate::transport::TransportConfig;

use super::models::{StationEntry, StationResponse};
use super::{ONLINE_WINDOW_SECS, SESSION_TTL, Session, UnifiConfig};

/// Client for one UniFi controller, owning its session cache.
pub struct UnifiClient {
    config: UnifiConfig,
    http: reqwest::Client,
    session: TtlCell<Session>,
    /// Base URL with a single trailing slash stripped.
    base: String,
}

impl UnifiClient {
    /// Build a client from settings. The HTTP client is constructed
    /// eagerly; whether the source is usable is decided per call.
    pub fn new(config: UnifiConfig) -> Result<Self> {
        let transport = TransportConfig {
            timeout: config.timeout,
            accept_invalid_certs: config.accept_invalid_certs,
        };
        let http = transport.build_client()?;
        let base = config
            .base_url
            .strip_suffix('/')
            .unwrap_or(&config.base_url)
            .to_owned();
        Ok(Self {
            config,
            http,
            session: TtlCell::new(),
            base,
        })
    }

    /// Fetch the controller's station list as a normalized inventory.
    ///
    /// Returns `None` when the source is disabled or missing settings,
    /// when sign-in fails on every path, and on any transport or
    /// payload error. A session rejection additionally clears the
    /// cached session; re-authentication happens on the *next* call,
    /// not recursively within this one.
    pub async fn fetch_clients(&self) -> Option<Inventory> {
        if let Err(err) = self.check_preconditions() {
            debug!(error = %err, "controller source skipped");
            return None;
        }
        match self.try_fetch().await {
            Ok(devices) => Some(Inventory::now(devices)),
            Err(err) => {
                if err.is_session_rejection() {
                    self.session.invalidate();
                }
                warn!(error = %err, "controller fetch failed");
                None
            }
        }
    }

    fn check_preconditions(&self) -> Result<()> {
        if !self.config.enabled {
            return Err(Error::NotConfigured("enabled"));
        }
        if self.base.trim().is_empty() {
            return Err(Error::NotConfigured("base_url"));
        }
        if self.config.username.trim().is_empty() {
            return Err(Error::NotConfigured("username"));
        }
        if self.config.password.expose_secret().trim().is_empty() {
            return Err(Error::NotConfigured("password"));
        }
        Ok(())
    }

    async fn try_fetch(&self) -> Result<Vec<Device>> {
        let session = if let Some(session) = self.session.get() {
            session
        } else {
            self.sign_in().await?
        };

        let url = Url::parse(&format!(
            "{}{}",
            self.base,
            self.config.flavor.stations_path(&self.config.site)
        ))?;
        debug!(%url, "GET station list");

        let mut request = self
            .http
            .get(url)
            .header(header::COOKIE, &session.cookie_header);
        if let Some(token) = session.csrf_token.as_deref() {
            if !token.trim().is_empty() {
                request = request.header("X-CSRF-Token", token);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::SessionRejected {
                status: status.as_u16(),
            });
        }

        let body: StationResponse = response.json().await?;
        let stations = body
            .data
            .ok_or(Error::UnexpectedPayload("station list without data array"))?;

        let now_secs = chrono::Utc::now().timestamp();
        Ok(stations
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<StationEntry>(raw).ok())
            .map(|entry| normalize_station(&entry, now_secs))
            .collect())
    }

    /// POST credentials to each candidate login path until one response
    /// carries a session cookie. The fresh session is cached for
    /// [`SESSION_TTL`] and also returned for immediate use.
    async fn sign_in(&self) -> Result<Arc<Session>> {
        let body = serde_json::json!({
            "username": self.config.username,
            "password": self.config.password.expose_secret(),
        });

        for path in self.config.flavor.login_paths() {
            let url = match Url::parse(&format!("{}{path}", self.base)) {
                Ok(url) => url,
                Err(err) => {
                    debug!(error = %err, path, "skipping malformed login URL");
                    continue;
                }
            };
            let response = match self.http.post(url).json(&body).send().await {
                Ok(response) => response,
                Err(err) => {
                    debug!(error = %err, path, "login attempt failed");
                    continue;
                }
            };
            if let Some(session) = session_from_response(&response) {
                debug!(path, "controller sign-in succeeded");
                return Ok(self.session.put(session, SESSION_TTL));
            }
        }
        Err(Error::LoginFailed)
    }
}

/// Extract a session from a login response, if it set any cookie.
fn session_from_response(response: &reqwest::Response) -> Option<Session> {
    let cookie_header = rebuild_cookie_header(
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok()),
    )?;
    let csrf_token = ["X-CSRF-Token", "X-Updated-Csrf-Token"]
        .iter()
        .find_map(|name| response.headers().get(*name))
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    Some(Session {
        cookie_header,
        csrf_token,
    })
}

/// Rebuild a single `Cookie` header from raw `Set-Cookie` values.
///
/// Controllers emit duplicate cookie names across a login exchange; the
/// last value per name wins, while names keep the order of their first
/// appearance. Attributes after the first `;` are dropped. Returns
/// `None` when no parsable `name=value` pair is present.
fn rebuild_cookie_header<'a>(raw_values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut cookies: IndexMap<&str, &str> = IndexMap::new();
    for raw in raw_values {
        let pair = raw.split_once(';').map_or(raw, |(first, _)| first).trim();
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                cookies.insert(name, value.trim());
            }
        }
    }
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Map one station record into the common schema.
///
/// Name preference: hostname, then the generic name field, then the
/// MAC, then `"Unknown"`. A station is online iff it was last seen
/// within [`ONLINE_WINDOW_SECS`]; an absent or non-numeric timestamp
/// reads as offline.
fn normalize_station(entry: &StationEntry, now_secs: i64) -> Device {
    let mac = entry.mac.clone().unwrap_or_default();
    let name = entry
        .hostname
        .clone()
        .or_else(|| entry.name.clone())
        .unwrap_or_else(|| {
            if mac.is_empty() {
                "Unknown".to_owned()
            } else {
                mac.clone()
            }
        });
    let online = entry
        .last_seen
        .is_some_and(|seen| now_secs - seen < ONLINE_WINDOW_SECS);

    Device {
        name,
        address: entry.ip.clone().unwrap_or_default(),
        identity: mac,
        status: Some(if online {
            DeviceStatus::Online
        } else {
            DeviceStatus::Offline
        }),
        source: "controller".into(),
        ..Device::default()
    }
}
