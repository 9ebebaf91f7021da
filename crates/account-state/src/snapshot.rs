use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header prefix carrying user metadata on account responses.
pub const ACCOUNT_META_PREFIX: &str = "x-account-meta-";

const CONTAINER_COUNT_HEADER: &str = "x-account-container-count";
const OBJECT_COUNT_HEADER: &str = "x-account-object-count";
const BYTES_USED_HEADER: &str = "x-account-bytes-used";

/// Point-in-time view of one account, as reported by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub container_count: Option<u64>,
    #[serde(default)]
    pub object_count: Option<u64>,
    #[serde(default, rename = "bytes")]
    pub byte_count: Option<u64>,
    #[serde(default, rename = "meta")]
    pub metadata: HashMap<String, String>,
}

impl AccountSnapshot {
    /// Builds a snapshot from a backend status and its response headers.
    ///
    /// Header names are matched case-insensitively. Metadata keys come out
    /// lower-cased with the account metadata prefix removed; any other header
    /// is ignored.
    pub fn from_headers<'a, I>(status: u16, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut snapshot = AccountSnapshot {
            status,
            ..AccountSnapshot::default()
        };

        for (name, value) in headers {
            let name = name.to_ascii_lowercase();
            if let Some(key) = name.strip_prefix(ACCOUNT_META_PREFIX) {
                if !key.is_empty() {
                    snapshot.metadata.insert(key.to_string(), value.to_string());
                }
                continue;
            }
            match name.as_str() {
                CONTAINER_COUNT_HEADER => snapshot.container_count = parse_counter(value),
                OBJECT_COUNT_HEADER => snapshot.object_count = parse_counter(value),
                BYTES_USED_HEADER => snapshot.byte_count = parse_counter(value),
                _ => {}
            }
        }

        snapshot
    }

    /// Value stored for a metadata key, if any.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Encodes the snapshot for storage in a shared cache.
    pub fn to_cache_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Decodes a cached value. Empty objects and values of another shape are
    /// reported as `None` so the caller treats them as a miss.
    pub fn from_cache_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) if map.is_empty() => None,
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }
}

fn parse_counter(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}
