use std::sync::Arc;

use access_gate::{merge_conf, AccessDecisionConfig, AccessDecisionEngine, ConfMap};
use account_state::{AccountCache, MemoryCache};
use axum::{middleware, Router};
use tracing::info;

use crate::backend::ServiceBackend;
use crate::middleware::{account_lock_middleware, AccountLockState};

/// Builds the filter from deployment-wide and filter-local settings; local
/// keys take precedence.
pub fn filter_factory(global_conf: &ConfMap, local_conf: &ConfMap) -> AccountLockFilter {
    let conf = merge_conf(global_conf, local_conf);
    AccountLockFilter::new(AccessDecisionConfig::from_conf(&conf))
}

/// Configured, not yet attached, account-lock filter.
#[derive(Clone)]
pub struct AccountLockFilter {
    config: AccessDecisionConfig,
    cache: Option<Arc<dyn AccountCache>>,
}

impl AccountLockFilter {
    pub fn new(config: AccessDecisionConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Without a cache every request fails open.
    pub fn with_cache(mut self, cache: Arc<dyn AccountCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_memory_cache(self) -> Self {
        self.with_cache(Arc::new(MemoryCache::new()))
    }

    pub fn config(&self) -> &AccessDecisionConfig {
        &self.config
    }

    /// Gates `app`. Account lookups are served by `app` itself, underneath
    /// the gate.
    pub fn wrap(&self, app: Router) -> Router {
        let engine = AccessDecisionEngine::new(
            self.config.clone(),
            Arc::new(ServiceBackend::new(app.clone())),
        );
        info!(
            locked_key = self.config.locked_metadata_key(),
            denied_methods = ?self.config.denied_methods(),
            recheck_secs = self.config.recheck_interval().as_secs(),
            cache = self.cache.is_some(),
            "account lock filter enabled"
        );
        let state = AccountLockState::new(Arc::new(engine), self.cache.clone());
        app.layer(middleware::from_fn_with_state(state, account_lock_middleware))
    }
}
