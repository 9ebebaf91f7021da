//! Filter configuration.
//!
//! Deployments hand the filter a flat map of string keys to loosely typed
//! values. Every key is optional and parsed leniently: a value of the wrong
//! shape falls back to its default instead of failing construction.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::errors::ConfigError;

pub type ConfMap = BTreeMap<String, Value>;

pub const DEFAULT_LOCKED_KEY: &str = "locked";
pub const DEFAULT_RECHECK_SECS: u64 = 60;
pub const DEFAULT_DENIED_METHODS: [&str; 3] = ["PUT", "DELETE", "POST"];

const LOCKED_HEADER_KEY: &str = "locked_header";
const RECHECK_KEY: &str = "recheck_account_existence";
const DENIED_METHODS_KEY: &str = "denied_methods";

/// Immutable per-filter configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessDecisionConfig {
    locked_metadata_key: String,
    recheck_interval: Duration,
    denied_methods: Vec<String>,
}

impl Default for AccessDecisionConfig {
    fn default() -> Self {
        Self {
            locked_metadata_key: DEFAULT_LOCKED_KEY.to_string(),
            recheck_interval: Duration::from_secs(DEFAULT_RECHECK_SECS),
            denied_methods: default_denied_methods(),
        }
    }
}

impl AccessDecisionConfig {
    pub fn from_conf(conf: &ConfMap) -> Self {
        Self {
            locked_metadata_key: parse_locked_key(conf.get(LOCKED_HEADER_KEY)),
            recheck_interval: parse_recheck(conf.get(RECHECK_KEY)),
            denied_methods: parse_denied_methods(conf.get(DENIED_METHODS_KEY)),
        }
    }

    pub fn with_locked_metadata_key(mut self, key: impl AsRef<str>) -> Self {
        self.locked_metadata_key = key.as_ref().to_ascii_lowercase();
        self
    }

    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    pub fn with_denied_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denied_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn locked_metadata_key(&self) -> &str {
        &self.locked_metadata_key
    }

    pub fn recheck_interval(&self) -> Duration {
        self.recheck_interval
    }

    pub fn denied_methods(&self) -> &[String] {
        &self.denied_methods
    }

    /// Exact, case-sensitive membership test.
    pub fn denies_method(&self, method: &str) -> bool {
        self.denied_methods.iter().any(|denied| denied == method)
    }
}

fn default_denied_methods() -> Vec<String> {
    DEFAULT_DENIED_METHODS.iter().map(|m| m.to_string()).collect()
}

fn parse_locked_key(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(key)) if !key.is_empty() => key.to_ascii_lowercase(),
        None | Some(Value::Null) => DEFAULT_LOCKED_KEY.to_string(),
        Some(other) => {
            warn!(value = %other, "ignoring unusable {LOCKED_HEADER_KEY}");
            DEFAULT_LOCKED_KEY.to_string()
        }
    }
}

fn parse_recheck(raw: Option<&Value>) -> Duration {
    let default = Duration::from_secs(DEFAULT_RECHECK_SECS);
    match raw {
        None | Some(Value::Null) => default,
        Some(Value::Number(number)) => match number.as_u64() {
            Some(secs) => Duration::from_secs(secs),
            None => {
                warn!(value = %number, "ignoring non-integer {RECHECK_KEY}");
                default
            }
        },
        Some(Value::String(text)) => {
            let text = text.trim();
            if let Ok(secs) = text.parse::<u64>() {
                return Duration::from_secs(secs);
            }
            humantime::parse_duration(text).unwrap_or_else(|_| {
                warn!(value = text, "ignoring unparseable {RECHECK_KEY}");
                default
            })
        }
        Some(other) => {
            warn!(value = %other, "ignoring unusable {RECHECK_KEY}");
            default
        }
    }
}

/// A comma-joined string is split verbatim; a list of strings is taken as is.
fn parse_denied_methods(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::String(joined)) if !joined.is_empty() => {
            joined.split(',').map(|m| m.to_string()).collect()
        }
        Some(Value::Array(items)) if !items.is_empty() => {
            let methods: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(|m| m.to_string()))
                .collect();
            methods.unwrap_or_else(|| {
                warn!("{DENIED_METHODS_KEY} contains non-string entries; using defaults");
                default_denied_methods()
            })
        }
        None | Some(Value::Null) => default_denied_methods(),
        Some(Value::String(_)) | Some(Value::Array(_)) => default_denied_methods(),
        Some(other) => {
            warn!(value = %other, "ignoring unusable {DENIED_METHODS_KEY}");
            default_denied_methods()
        }
    }
}

/// Overlays `local` on top of `global`; local keys win.
pub fn merge_conf(global: &ConfMap, local: &ConfMap) -> ConfMap {
    let mut merged = global.clone();
    merged.extend(local.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

pub fn parse_conf_str(raw: &str) -> Result<ConfMap, ConfigError> {
    match serde_json::from_str(raw) {
        Ok(conf) => Ok(conf),
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            ConfigError::Deserialize(format!(
                "json error: {}; yaml error: {}",
                json_err, yaml_err
            ))
        }),
    }
}

pub fn load_conf_from_reader<R: Read>(mut reader: R) -> Result<ConfMap, ConfigError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Ok(ConfMap::new());
    }
    parse_conf_str(&buf)
}

pub fn load_conf_from_path(path: impl AsRef<Path>) -> Result<ConfMap, ConfigError> {
    let file = File::open(path.as_ref())?;
    load_conf_from_reader(file)
}
