// Controller wire types
//
// Station payloads drift across firmware versions: numbers arrive as
// ints or floats, text fields are sometimes null, and whole records can
// be malformed. Lenient field deserializers keep one odd station from
// discarding the rest of the list.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Controller flavor. UniFi OS consoles proxy the network application
/// under `/proxy/network`; classic standalone controllers serve it at
/// the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    UnifiOs,
    Classic,
}

impl Flavor {
    /// Candidate login paths, tried in order until one yields a cookie.
    pub(crate) fn login_paths(self) -> &'static [&'static str] {
        match self {
            Self::UnifiOs => &["/api/auth/login", "/proxy/network/api/auth/login"],
            Self::Classic => &["/api/login"],
        }
    }

    /// Site-scoped station listing path.
    pub(crate) fn stations_path(self, site: &str) -> String {
        match self {
            Self::UnifiOs => format!("/proxy/network/api/s/{site}/stat/sta"),
            Self::Classic => format!("/api/s/{site}/stat/sta"),
        }
    }
}

/// `{"data": [...]}` wrapper around the station list. Records stay raw
/// here so a malformed one can be skipped instead of failing the list.
#[derive(Debug, Deserialize)]
pub(crate) struct StationResponse {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

/// One station record, reduced to the fields normalization reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub hostname: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub mac: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub ip: Option<String>,
    #[serde(deserialize_with = "lenient_epoch")]
    pub last_seen: Option<i64>,
}

/// Accept any JSON value where a string is expected: null reads as
/// absent, non-strings are stringified.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

/// Epoch seconds, tolerating float timestamps. Anything non-numeric
/// reads as absent (the station then counts as offline).
fn lenient_epoch<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }))
}
