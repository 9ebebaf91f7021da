use thiserror::Error;

/// Errors surfaced while reading filter configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize filter config: {0}")]
    Deserialize(String),
}
