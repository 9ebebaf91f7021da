//! Filter settings loaded from disk and the environment.
//!
//! A settings file is a JSON or YAML mapping. Top-level keys form the
//! deployment-wide conf; an optional `account_locked` section holds the
//! filter-local conf. `ACCOUNT_LOCKED__<KEY>` environment variables are
//! applied on top of the local section.

use std::env;
use std::path::Path;

use access_gate::{load_conf_from_path, merge_conf, AccessDecisionConfig, ConfMap};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;

use crate::filter::{filter_factory, AccountLockFilter};

const ENV_PREFIX: &str = "ACCOUNT_LOCKED__";
const FILTER_SECTION: &str = "account_locked";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSettings {
    pub global: ConfMap,
    pub local: ConfMap,
}

impl FilterSettings {
    pub fn merged(&self) -> ConfMap {
        merge_conf(&self.global, &self.local)
    }

    pub fn access_config(&self) -> AccessDecisionConfig {
        AccessDecisionConfig::from_conf(&self.merged())
    }

    pub fn into_filter(self) -> AccountLockFilter {
        filter_factory(&self.global, &self.local)
    }
}

/// Loads settings from `path` (when it exists) plus environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<FilterSettings> {
    let mut settings = FilterSettings::default();

    if let Some(path) = path.filter(|p| p.exists()) {
        let mut conf = load_conf_from_path(path)
            .with_context(|| format!("failed to load filter settings from {}", path.display()))?;
        match conf.remove(FILTER_SECTION) {
            Some(Value::Object(section)) => settings.local = section.into_iter().collect(),
            Some(Value::Null) | None => {}
            Some(other) => bail!(
                "section `{}` in {} must be a mapping, found {}",
                FILTER_SECTION,
                path.display(),
                other
            ),
        }
        settings.global = conf;
        info!(path = %path.display(), "Loaded account lock settings");
    }

    for (key, raw) in env::vars() {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key = stripped.to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            settings.local.insert(key, parse_env_value(&raw));
        }
    }

    Ok(settings)
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    Value::String(raw.to_string())
}
