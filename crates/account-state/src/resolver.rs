use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::{BackendRequest, StorageBackend};
use crate::cache::AccountCache;
use crate::errors::StateError;
use crate::snapshot::AccountSnapshot;

/// Namespace for account entries in a cache shared with other consumers.
pub const ACCOUNT_CACHE_PREFIX: &str = "account/";

pub fn account_cache_key(account: &str) -> String {
    format!("{ACCOUNT_CACHE_PREFIX}{account}")
}

/// Cache-aside resolver for [`AccountSnapshot`]s.
///
/// Concurrent misses for the same account may each query the backend; the
/// last writer wins and every writer stores an equivalent snapshot.
pub struct AccountStateResolver {
    backend: Arc<dyn StorageBackend>,
    ttl: Duration,
}

impl AccountStateResolver {
    pub fn new(backend: Arc<dyn StorageBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Resolves the snapshot for `account`, folding every failure into `None`.
    pub async fn resolve(
        &self,
        version: &str,
        account: &str,
        cache: Option<&dyn AccountCache>,
    ) -> Option<AccountSnapshot> {
        match self.try_resolve(version, account, cache).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(account, error = %err, "account state unavailable");
                None
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but surfaces backend failures.
    ///
    /// Returns `Ok(None)` when no cache is available.
    pub async fn try_resolve(
        &self,
        version: &str,
        account: &str,
        cache: Option<&dyn AccountCache>,
    ) -> Result<Option<AccountSnapshot>, StateError> {
        let Some(cache) = cache else {
            return Ok(None);
        };

        let key = account_cache_key(account);
        if let Some(cached) = cache.get(&key).await {
            if let Some(snapshot) = AccountSnapshot::from_cache_value(&cached) {
                return Ok(Some(snapshot));
            }
            debug!(account, "ignoring empty or undecodable cache entry");
        }

        let request = BackendRequest::head(format!("/{version}/{account}"));
        let response = self.backend.head(request).await?;
        if !is_cacheable_status(response.status) {
            return Err(StateError::UnexpectedStatus(response.status));
        }

        let snapshot = AccountSnapshot::from_headers(response.status, response.header_pairs());
        debug!(
            account,
            status = snapshot.status,
            ttl_secs = self.ttl.as_secs(),
            "caching account snapshot"
        );
        cache.set(&key, snapshot.to_cache_value(), self.ttl).await;
        Ok(Some(snapshot))
    }
}

fn is_cacheable_status(status: u16) -> bool {
    (200..300).contains(&status) || status == 404 || status == 410
}
