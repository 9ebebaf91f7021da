use crate::errors::StateError;

/// A versioned storage path: `/<version>/<account>[/<container>[/<object>]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoragePath {
    pub version: String,
    pub account: Option<String>,
    pub container: Option<String>,
    pub object: Option<String>,
}

impl StoragePath {
    /// Splits a request path into its segments. The object segment keeps any
    /// embedded slashes.
    pub fn parse(raw: &str) -> Result<Self, StateError> {
        let Some(trimmed) = raw.strip_prefix('/') else {
            return Err(StateError::InvalidPath(raw.to_string()));
        };

        let mut parts = trimmed.splitn(4, '/');
        let version = match parts.next() {
            Some(segment) if !segment.is_empty() => segment.to_string(),
            _ => return Err(StateError::InvalidPath(raw.to_string())),
        };
        let account = non_empty(parts.next());
        let container = non_empty(parts.next());
        let object = non_empty(parts.next());

        if account.is_none() && container.is_some() {
            return Err(StateError::InvalidPath(raw.to_string()));
        }
        if container.is_none() && object.is_some() {
            return Err(StateError::InvalidPath(raw.to_string()));
        }

        Ok(Self {
            version,
            account,
            container,
            object,
        })
    }

    /// Path of the account resource this path belongs to, if any.
    pub fn account_path(&self) -> Option<String> {
        self.account
            .as_ref()
            .map(|account| format!("/{}/{}", self.version, account))
    }
}

fn non_empty(segment: Option<&str>) -> Option<String> {
    segment
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}
