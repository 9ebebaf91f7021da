use thiserror::Error;

/// Errors raised while resolving account state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
    #[error("backend transport failure: {0}")]
    Transport(String),
    #[error("backend returned status {0}")]
    UnexpectedStatus(u16),
}
