//! Account-locked filter for object-storage front ends.
//!
//! Wraps an axum application so that write requests against a locked
//! account are answered with `403 Forbidden` before they reach storage.
//! The decision logic lives in `access-gate`; account state resolution and
//! caching live in `account-state`.

pub mod backend;
pub mod filter;
pub mod middleware;
pub mod settings;
pub mod telemetry;

pub use access_gate::{AccessDecisionConfig, AccessDecisionEngine, AccessGate, ConfMap, Decision};
pub use account_state::{AccountCache, MemoryCache};
pub use backend::{InternalRequest, ServiceBackend};
pub use filter::{filter_factory, AccountLockFilter};
pub use middleware::{account_lock_middleware, AccountLockState, RemoteUser};
pub use settings::{load_settings, FilterSettings};
pub use telemetry::init_logging;
