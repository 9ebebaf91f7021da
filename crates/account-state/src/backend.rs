use async_trait::async_trait;

use crate::errors::StateError;

/// Source tag attached to lookups issued by the lock filter.
pub const INTERNAL_SOURCE: &str = "LCK";

/// Synthetic request sent to the storage backend on behalf of the filter.
///
/// These requests are pre-authorized: the backend must serve them without
/// running end-user authorization. `source` lets logs and metrics tell them
/// apart from user traffic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendRequest {
    pub method: String,
    pub path: String,
    pub source: String,
}

impl BackendRequest {
    pub fn head(path: impl Into<String>) -> Self {
        Self {
            method: "HEAD".to_string(),
            path: path.into(),
            source: INTERNAL_SOURCE.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl BackendResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Storage backend able to answer internal account lookups.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn head(&self, request: BackendRequest) -> Result<BackendResponse, StateError>;
}
