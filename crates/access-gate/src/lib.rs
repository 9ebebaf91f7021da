//! Access-decision engine for locked storage accounts.
//!
//! Write-type requests against an account whose lock flag is set are denied;
//! the metadata update that clears the flag is always let through. When the
//! account state cannot be determined the engine fails open.

pub mod config;
pub mod engine;
pub mod errors;
pub mod request;
pub mod truthy;

pub use config::{
    load_conf_from_path, merge_conf, parse_conf_str, AccessDecisionConfig, ConfMap,
    DEFAULT_DENIED_METHODS, DEFAULT_LOCKED_KEY, DEFAULT_RECHECK_SECS,
};
pub use engine::{AccessDecisionEngine, AccessGate, Decision};
pub use errors::ConfigError;
pub use request::AccessRequest;
pub use truthy::is_truthy;
