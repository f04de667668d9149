//! Configuration for the netnest CLI.
//!
//! One TOML file plus `NETNEST_*` environment overrides, merged through
//! figment and lowered into the typed per-source settings that
//! `netnest_sources` consumes. The TOML layer stores plain strings and
//! integers; validation happens once, in the lowering step.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netnest_sources::agents::AgentsConfig;
use netnest_sources::govee::GoveeConfig;
use netnest_sources::hub::HubConfig;
use netnest_sources::speedtest::SpeedtestConfig;
use netnest_sources::tailscale::TailscaleConfig;
use netnest_sources::unifi::{Flavor, UnifiConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML settings ───────────────────────────────────────────────────

/// Top-level settings file, one section per source plus CLI defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub defaults: Defaults,
    pub unifi: UnifiSettings,
    pub govee: GoveeSettings,
    pub tailscale: TailscaleSettings,
    pub speedtest: SpeedtestSettings,
    pub agents: AgentsSettings,
}

/// CLI presentation defaults, overridable per invocation by flags.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    pub output: String,
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "table".into(),
            color: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UnifiSettings {
    pub enabled: bool,
    /// Controller root, e.g. "https://192.168.1.1".
    pub base_url: String,
    pub username: String,
    /// Plaintext password; prefer the NETNEST_UNIFI__PASSWORD env var.
    pub password: String,
    pub site: String,
    /// "unifios" or "classic".
    pub flavor: String,
    pub accept_invalid_certs: bool,
    pub timeout_secs: u64,
}

impl Default for UnifiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            site: "default".into(),
            flavor: "unifios".into(),
            accept_invalid_certs: true,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GoveeSettings {
    pub enabled: bool,
    /// Cloud API key; prefer the NETNEST_GOVEE__API_KEY env var.
    pub api_key: String,
    pub openapi_base: String,
    pub legacy_base: String,
    pub lan_discovery: bool,
    pub lan_multicast_addr: String,
    pub lan_multicast_port: u16,
    pub lan_listen_port: u16,
    pub lan_timeout_ms: u64,
    pub timeout_secs: u64,
}

impl Default for GoveeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            openapi_base: "https://openapi.api.govee.com".into(),
            legacy_base: "https://developer-api.govee.com".into(),
            lan_discovery: false,
            lan_multicast_addr: "239.255.255.250".into(),
            lan_multicast_port: 4001,
            lan_listen_port: 4002,
            lan_timeout_ms: 5000,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TailscaleSettings {
    pub enabled: bool,
    pub command: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for TailscaleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["tailscale".into(), "status".into(), "--json".into()],
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeedtestSettings {
    pub enabled: bool,
    pub command: Vec<String>,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for SpeedtestSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["speedtest".into(), "-f".into(), "json".into()],
            timeout_secs: 120,
            cache_ttl_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentsSettings {
    /// Server agent root URL; blank disables it.
    pub server_url: String,
    /// Desktop agent root URL; blank disables it.
    pub desktop_url: String,
    pub timeout_secs: u64,
}

impl Default for AgentsSettings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            desktop_url: String::new(),
            timeout_secs: 5,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "netnest", "netnest").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netnest");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load settings from `path` (or the canonical location) with
/// `NETNEST_*` environment overrides on top. Sections use a double
/// underscore: `NETNEST_UNIFI__BASE_URL`, `NETNEST_GOVEE__API_KEY`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("NETNEST_").split("__"));

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

// ── Lowering ────────────────────────────────────────────────────────

impl Settings {
    /// Validate and convert into the typed per-source configuration.
    pub fn into_hub_config(self) -> Result<HubConfig, ConfigError> {
        let unifi = UnifiConfig {
            enabled: self.unifi.enabled,
            base_url: checked_url("unifi.base_url", self.unifi.base_url)?,
            username: self.unifi.username,
            password: SecretString::from(self.unifi.password),
            site: self.unifi.site,
            flavor: parse_flavor(&self.unifi.flavor)?,
            accept_invalid_certs: self.unifi.accept_invalid_certs,
            timeout: Duration::from_secs(self.unifi.timeout_secs),
        };

        let govee = GoveeConfig {
            enabled: self.govee.enabled,
            api_key: SecretString::from(self.govee.api_key),
            openapi_base: checked_url("govee.openapi_base", self.govee.openapi_base)?,
            legacy_base: checked_url("govee.legacy_base", self.govee.legacy_base)?,
            lan_discovery: self.govee.lan_discovery,
            lan_multicast_addr: parse_multicast(&self.govee.lan_multicast_addr)?,
            lan_multicast_port: self.govee.lan_multicast_port,
            lan_listen_port: self.govee.lan_listen_port,
            lan_timeout: Duration::from_millis(self.govee.lan_timeout_ms),
            timeout: Duration::from_secs(self.govee.timeout_secs),
        };

        let tailscale = TailscaleConfig {
            enabled: self.tailscale.enabled,
            command: self.tailscale.command,
            timeout: Duration::from_secs(self.tailscale.timeout_secs),
        };

        let speedtest = SpeedtestConfig {
            enabled: self.speedtest.enabled,
            command: self.speedtest.command,
            timeout: Duration::from_secs(self.speedtest.timeout_secs),
            cache_ttl: Duration::from_secs(self.speedtest.cache_ttl_secs),
        };

        let agents = AgentsConfig {
            server_url: optional_url("agents.server_url", self.agents.server_url)?,
            desktop_url: optional_url("agents.desktop_url", self.agents.desktop_url)?,
            timeout: Duration::from_secs(self.agents.timeout_secs),
        };

        Ok(HubConfig {
            unifi,
            govee,
            tailscale,
            speedtest,
            agents,
        })
    }
}

fn parse_flavor(raw: &str) -> Result<Flavor, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "unifios" | "unifi-os" => Ok(Flavor::UnifiOs),
        "classic" | "legacy" => Ok(Flavor::Classic),
        other => Err(ConfigError::Validation {
            field: "unifi.flavor".into(),
            reason: format!("expected 'unifios' or 'classic', got '{other}'"),
        }),
    }
}

fn parse_multicast(raw: &str) -> Result<Ipv4Addr, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "govee.lan_multicast_addr".into(),
        reason: format!("not an IPv4 address: {raw}"),
    })
}

/// Pass a URL through unchanged after checking it parses. Blank is
/// allowed here; whether blank disables the source is decided per
/// source at call time.
fn checked_url(field: &str, raw: String) -> Result<String, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(raw);
    }
    match url::Url::parse(raw.trim()) {
        Ok(_) => Ok(raw),
        Err(err) => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL: {err}"),
        }),
    }
}

fn optional_url(field: &str, raw: String) -> Result<Option<String>, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    checked_url(field, raw).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn from_toml(raw: &str) -> Settings {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::string(raw))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults_cover_missing_sections() {
        let settings = from_toml("");
        assert!(!settings.unifi.enabled);
        assert!(!settings.govee.enabled);
        assert!(settings.tailscale.enabled);
        assert!(settings.speedtest.enabled);
        assert_eq!(settings.defaults.output, "table");
        assert_eq!(settings.unifi.site, "default");
        assert_eq!(settings.govee.lan_multicast_addr, "239.255.255.250");
        assert_eq!(settings.speedtest.cache_ttl_secs, 600);
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            [unifi]
            enabled = true
            base_url = "https://192.168.1.1"
            username = "admin"
            flavor = "classic"

            [govee]
            enabled = true
            api_key = "key-123"
            lan_timeout_ms = 2500

            [speedtest]
            command = ["speedtest-cli", "--json"]
            "#,
        );
        assert!(settings.unifi.enabled);
        assert_eq!(settings.unifi.base_url, "https://192.168.1.1");
        assert_eq!(settings.unifi.flavor, "classic");
        assert_eq!(settings.govee.lan_timeout_ms, 2500);
        assert_eq!(settings.speedtest.command, vec!["speedtest-cli", "--json"]);
        // Untouched sections keep their defaults.
        assert_eq!(settings.govee.lan_multicast_port, 4001);
    }

    #[test]
    fn lowers_into_typed_hub_config() {
        let settings = from_toml(
            r#"
            [unifi]
            enabled = true
            base_url = "https://192.168.1.1"
            username = "admin"
            password = "hunter2"
            flavor = "classic"
            timeout_secs = 7

            [govee]
            enabled = true
            api_key = "key-123"
            lan_discovery = true
            lan_timeout_ms = 2500

            [agents]
            server_url = "http://10.0.0.2:9000"
            "#,
        );
        let hub = settings.into_hub_config().unwrap();

        assert!(hub.unifi.enabled);
        assert_eq!(hub.unifi.flavor, Flavor::Classic);
        assert_eq!(hub.unifi.timeout, Duration::from_secs(7));
        assert_eq!(hub.unifi.password.expose_secret(), "hunter2");
        assert_eq!(hub.govee.lan_multicast_addr, Ipv4Addr::new(239, 255, 255, 250));
        assert_eq!(hub.govee.lan_timeout, Duration::from_millis(2500));
        assert_eq!(hub.agents.server_url.as_deref(), Some("http://10.0.0.2:9000"));
        assert_eq!(hub.agents.desktop_url, None);
    }

    #[test]
    fn rejects_unknown_flavor() {
        let settings = from_toml("[unifi]\nflavor = \"weird\"");
        let err = settings.into_hub_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "unifi.flavor"));
    }

    #[test]
    fn rejects_bad_multicast_address() {
        let settings = from_toml("[govee]\nlan_multicast_addr = \"not-an-ip\"");
        let err = settings.into_hub_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { field, .. } if field == "govee.lan_multicast_addr")
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let settings = from_toml("[unifi]\nbase_url = \"not a url\"");
        let err = settings.into_hub_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "unifi.base_url"));
    }

    #[test]
    fn blank_base_url_passes_through() {
        let hub = from_toml("").into_hub_config().unwrap();
        assert_eq!(hub.unifi.base_url, "");
        assert_eq!(hub.agents.server_url, None);
    }
}
