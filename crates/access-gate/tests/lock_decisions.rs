use access_gate::{
    AccessDecisionConfig, AccessDecisionEngine, AccessGate, AccessRequest, ConfMap, Decision,
};
use account_state::{
    account_cache_key, AccountCache, BackendRequest, BackendResponse, MemoryCache, StateError,
    StorageBackend,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers account lookups based on the account name suffix.
#[derive(Default)]
struct SuffixBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl StorageBackend for SuffixBackend {
    async fn head(&self, request: BackendRequest) -> Result<BackendResponse, StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = BackendResponse::new(204);
        let response = if request.path.ends_with("denied_other") {
            response.with_header("x-account-meta-other", "true")
        } else if request.path.ends_with("denied") {
            response.with_header("x-account-meta-locked", "true")
        } else if request.path.ends_with("allowed") {
            response.with_header("x-account-meta-locked", "false")
        } else {
            response
        };
        Ok(response)
    }
}

struct DownBackend;

#[async_trait]
impl StorageBackend for DownBackend {
    async fn head(&self, _request: BackendRequest) -> Result<BackendResponse, StateError> {
        Err(StateError::Transport("backend unreachable".into()))
    }
}

/// Returns the same value for every key and drops writes.
struct FixedCache(Value);

#[async_trait]
impl AccountCache for FixedCache {
    async fn get(&self, _key: &str) -> Option<Value> {
        Some(self.0.clone())
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) {}
}

fn engine_with(config: AccessDecisionConfig) -> (AccessDecisionEngine, Arc<SuffixBackend>) {
    let backend = Arc::new(SuffixBackend::default());
    (AccessDecisionEngine::new(config, backend.clone()), backend)
}

fn fixed_cache(value: Value) -> Arc<dyn AccountCache> {
    Arc::new(FixedCache(value))
}

#[tokio::test]
async fn unlock_update_is_allowed_while_locked() {
    let (engine, backend) = engine_with(AccessDecisionConfig::default());
    for header in ["X-Account-Meta-Locked", "x-account-meta-locked", "X-ACCOUNT-META-LOCKED"] {
        let request = AccessRequest::new("POST", "/v1/AUTH_account/cont")
            .with_header(header, "false")
            .with_cache(fixed_cache(json!({ "meta": { "locked": "true" } })));
        assert_eq!(engine.evaluate(&request).await, Decision::Allow, "{header}");
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unlock_header_does_not_bypass_other_methods() {
    let (engine, _) = engine_with(AccessDecisionConfig::default());
    let request = AccessRequest::new("PUT", "/v1/AUTH_account/cont")
        .with_header("X-Account-Meta-Locked", "false")
        .with_cache(fixed_cache(json!({ "meta": { "locked": "true" } })));
    assert_eq!(engine.evaluate(&request).await, Decision::Deny);
}

#[tokio::test]
async fn methods_outside_denied_set_pass_through() {
    let (engine, backend) = engine_with(AccessDecisionConfig::default());
    for method in ["GET", "HEAD", "OPTIONS", "put"] {
        let request = AccessRequest::new(method, "/v1/AUTH_account/cont")
            .with_header("X-Container-Meta-Locked", "true")
            .with_cache(fixed_cache(json!({ "meta": { "locked": "true" } })));
        assert_eq!(engine.evaluate(&request).await, Decision::Allow, "{method}");
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_cache_fails_open() {
    let (engine, backend) = engine_with(AccessDecisionConfig::default());
    for method in ["PUT", "DELETE", "POST"] {
        let request = AccessRequest::new(method, "/v1/AUTH_denied/cont");
        assert_eq!(engine.evaluate(&request).await, Decision::Allow);
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cached_truthy_flag_denies() {
    let (engine, _) = engine_with(AccessDecisionConfig::default());
    for value in ["true", "True", "1", "yes", "on"] {
        let request = AccessRequest::new("POST", "/v1/AUTH_account/cont")
            .with_cache(fixed_cache(json!({ "meta": { "locked": value } })));
        assert_eq!(engine.evaluate(&request).await, Decision::Deny, "{value}");
    }
}

#[tokio::test]
async fn cached_falsy_or_absent_flag_allows() {
    let (engine, _) = engine_with(AccessDecisionConfig::default());
    for meta in [
        json!({ "locked": "false" }),
        json!({ "locked": "0" }),
        json!({ "locked": "" }),
        json!({ "quota": "true" }),
        json!({}),
    ] {
        let request = AccessRequest::new("DELETE", "/v1/AUTH_account/cont")
            .with_cache(fixed_cache(json!({ "status": 204, "meta": meta.clone() })));
        assert_eq!(engine.evaluate(&request).await, Decision::Allow, "{meta}");
    }
}

#[tokio::test]
async fn empty_cache_entry_falls_through_to_backend() {
    let (engine, backend) = engine_with(AccessDecisionConfig::default());
    let request =
        AccessRequest::new("POST", "/v1/acc_allowed").with_cache(fixed_cache(json!({})));
    assert_eq!(engine.evaluate(&request).await, Decision::Allow);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

    let request = AccessRequest::new("POST", "/v1/acc_denied").with_cache(fixed_cache(json!({})));
    assert_eq!(engine.evaluate(&request).await, Decision::Deny);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn locked_account_denies_put_after_cache_miss() {
    let (engine, backend) = engine_with(AccessDecisionConfig::default());
    let cache = Arc::new(MemoryCache::new());

    let request = AccessRequest::new("PUT", "/v1/AUTH_acc1_denied/cont/obj")
        .with_cache(cache.clone());
    assert_eq!(engine.evaluate(&request).await, Decision::Deny);

    let stored = cache
        .get(&account_cache_key("AUTH_acc1_denied"))
        .await
        .unwrap();
    assert_eq!(stored["meta"], json!({ "locked": "true" }));
    assert_eq!(stored["status"], json!(204));

    assert_eq!(engine.evaluate(&request).await, Decision::Deny);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unlocked_account_allows_delete_after_cache_miss() {
    let (engine, _) = engine_with(AccessDecisionConfig::default());
    let cache = Arc::new(MemoryCache::new());

    let request =
        AccessRequest::new("DELETE", "/v1/AUTH_acc1_allowed/cont").with_cache(cache.clone());
    assert_eq!(engine.evaluate(&request).await, Decision::Allow);

    let stored = cache
        .get(&account_cache_key("AUTH_acc1_allowed"))
        .await
        .unwrap();
    assert_eq!(stored["meta"], json!({ "locked": "false" }));
}

#[tokio::test]
async fn custom_locked_header() {
    let mut conf = ConfMap::new();
    conf.insert("locked_header".into(), json!("other"));
    let (engine, _) = engine_with(AccessDecisionConfig::from_conf(&conf));
    let cache = Arc::new(MemoryCache::new());

    let request = AccessRequest::new("POST", "/v1/acc_denied_other").with_cache(cache.clone());
    assert_eq!(engine.evaluate(&request).await, Decision::Deny);

    let stored = cache
        .get(&account_cache_key("acc_denied_other"))
        .await
        .unwrap();
    assert_eq!(stored["meta"]["other"], json!("true"));

    let unlock = AccessRequest::new("POST", "/v1/acc_denied_other")
        .with_header("X-Account-Meta-Other", "false")
        .with_cache(cache.clone());
    assert_eq!(engine.evaluate(&unlock).await, Decision::Allow);

    // The default key no longer signals anything.
    let request = AccessRequest::new("POST", "/v1/acc_denied").with_cache(cache);
    assert_eq!(engine.evaluate(&request).await, Decision::Allow);
}

#[tokio::test]
async fn configured_methods_replace_defaults() {
    let config = AccessDecisionConfig::default().with_denied_methods(["GET"]);
    let (engine, _) = engine_with(config);
    let cache = fixed_cache(json!({ "meta": { "locked": "true" } }));

    let get = AccessRequest::new("GET", "/v1/AUTH_acc/cont").with_cache(cache.clone());
    assert_eq!(engine.evaluate(&get).await, Decision::Deny);

    let put = AccessRequest::new("PUT", "/v1/AUTH_acc/cont").with_cache(cache);
    assert_eq!(engine.evaluate(&put).await, Decision::Allow);
}

#[tokio::test]
async fn backend_outage_fails_open() {
    let engine = AccessDecisionEngine::new(AccessDecisionConfig::default(), Arc::new(DownBackend));
    let cache = Arc::new(MemoryCache::new());
    let request = AccessRequest::new("PUT", "/v1/AUTH_acc/cont").with_cache(cache.clone());

    assert_eq!(engine.evaluate(&request).await, Decision::Allow);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn paths_without_account_are_not_gated() {
    let (engine, backend) = engine_with(AccessDecisionConfig::default());
    let cache = fixed_cache(json!({ "meta": { "locked": "true" } }));
    for path in ["/info", "/v1", "no-leading-slash"] {
        let request = AccessRequest::new("PUT", path).with_cache(cache.clone());
        assert_eq!(engine.evaluate(&request).await, Decision::Allow, "{path}");
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn engine_is_usable_through_gate_trait() {
    let (engine, _) = engine_with(AccessDecisionConfig::default());
    let gate: Arc<dyn AccessGate> = Arc::new(engine);
    let request = AccessRequest::new("PUT", "/v1/AUTH_acc/cont")
        .with_remote_user("demo:demo")
        .with_cache(fixed_cache(json!({ "meta": { "locked": "on" } })));
    assert_eq!(gate.evaluate(&request).await, Decision::Deny);
}
