use std::fmt;
use std::sync::Arc;

use account_state::{AccountCache, StoragePath};

/// Framework-neutral view of an inbound storage request.
#[derive(Clone)]
pub struct AccessRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    remote_user: Option<String>,
    cache: Option<Arc<dyn AccountCache>>,
}

impl AccessRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
            remote_user: None,
            cache: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_remote_user(mut self, user: impl Into<String>) -> Self {
        self.remote_user = Some(user.into());
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn AccountCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn remote_user(&self) -> Option<&str> {
        self.remote_user.as_deref()
    }

    pub fn cache(&self) -> Option<&dyn AccountCache> {
        self.cache.as_deref()
    }

    /// Case-insensitive header presence check.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
    }

    /// Parsed request path, or `None` when it is not a versioned storage path.
    pub fn storage_path(&self) -> Option<StoragePath> {
        StoragePath::parse(&self.path).ok()
    }
}

impl fmt::Debug for AccessRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("remote_user", &self.remote_user)
            .field("has_cache", &self.cache.is_some())
            .finish()
    }
}
