//! Account state for the account-locked gate.
//!
//! Builds [`AccountSnapshot`]s from backend `HEAD` responses and keeps them in a
//! pluggable [`AccountCache`] so that lock checks do not hit the backend on
//! every request.

pub mod backend;
pub mod cache;
pub mod errors;
pub mod path;
pub mod resolver;
pub mod snapshot;

pub use backend::{BackendRequest, BackendResponse, StorageBackend, INTERNAL_SOURCE};
pub use cache::{AccountCache, MemoryCache, DEFAULT_SWEEP_INTERVAL};
pub use errors::StateError;
pub use path::StoragePath;
pub use resolver::{account_cache_key, AccountStateResolver, ACCOUNT_CACHE_PREFIX};
pub use snapshot::{AccountSnapshot, ACCOUNT_META_PREFIX};
