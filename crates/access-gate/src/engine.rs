use std::sync::Arc;

use account_state::{AccountSnapshot, AccountStateResolver, StorageBackend, ACCOUNT_META_PREFIX};
use async_trait::async_trait;
use tracing::debug;

use crate::config::AccessDecisionConfig;
use crate::request::AccessRequest;
use crate::truthy::is_truthy;

const UNLOCK_METHOD: &str = "POST";

/// Outcome of evaluating a request against the account lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Seam used by HTTP integrations to gate requests.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn evaluate(&self, request: &AccessRequest) -> Decision;
}

pub struct AccessDecisionEngine {
    config: AccessDecisionConfig,
    resolver: AccountStateResolver,
    unlock_header: String,
}

impl AccessDecisionEngine {
    pub fn new(config: AccessDecisionConfig, backend: Arc<dyn StorageBackend>) -> Self {
        let resolver = AccountStateResolver::new(backend, config.recheck_interval());
        let unlock_header = format!("{ACCOUNT_META_PREFIX}{}", config.locked_metadata_key());
        Self {
            config,
            resolver,
            unlock_header,
        }
    }

    /// A POST that sets the lock flag itself; always let through so a locked
    /// account can be unlocked.
    pub fn is_unlock_update(&self, request: &AccessRequest) -> bool {
        request.method() == UNLOCK_METHOD && request.has_header(&self.unlock_header)
    }

    pub fn is_locked(&self, snapshot: &AccountSnapshot) -> bool {
        snapshot
            .meta(self.config.locked_metadata_key())
            .map(is_truthy)
            .unwrap_or(false)
    }

    pub async fn evaluate(&self, request: &AccessRequest) -> Decision {
        if self.is_unlock_update(request) {
            return Decision::Allow;
        }

        if !self.config.denies_method(request.method()) {
            return Decision::Allow;
        }

        let Some(path) = request.storage_path() else {
            return Decision::Allow;
        };
        let Some(account) = path.account.as_deref() else {
            return Decision::Allow;
        };

        // No snapshot means cache disabled, backend down or unusable answer.
        let Some(snapshot) = self
            .resolver
            .resolve(&path.version, account, request.cache())
            .await
        else {
            return Decision::Allow;
        };

        if self.is_locked(&snapshot) {
            debug!(
                account,
                user = request.remote_user().unwrap_or("-"),
                method = request.method(),
                "account locked; denying request"
            );
            return Decision::Deny;
        }

        Decision::Allow
    }
}

#[async_trait]
impl AccessGate for AccessDecisionEngine {
    async fn evaluate(&self, request: &AccessRequest) -> Decision {
        AccessDecisionEngine::evaluate(self, request).await
    }
}
