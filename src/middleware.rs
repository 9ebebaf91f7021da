use std::sync::Arc;

use access_gate::{AccessGate, AccessRequest, Decision};
use account_state::AccountCache;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::trace;

use crate::backend::InternalRequest;

/// Identity established by an upstream authentication layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteUser(pub String);

#[derive(Clone)]
pub struct AccountLockState {
    gate: Arc<dyn AccessGate>,
    cache: Option<Arc<dyn AccountCache>>,
}

impl AccountLockState {
    pub fn new(gate: Arc<dyn AccessGate>, cache: Option<Arc<dyn AccountCache>>) -> Self {
        Self { gate, cache }
    }
}

pub async fn account_lock_middleware(
    State(state): State<AccountLockState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(internal) = req.extensions().get::<InternalRequest>() {
        trace!(source = %internal.source, "skipping lock check for internal request");
        return Ok(next.run(req).await);
    }

    let access = access_request(&req, state.cache.clone());
    match state.gate.evaluate(&access).await {
        Decision::Allow => Ok(next.run(req).await),
        Decision::Deny => Err(StatusCode::FORBIDDEN),
    }
}

fn access_request(req: &Request<Body>, cache: Option<Arc<dyn AccountCache>>) -> AccessRequest {
    let mut access = AccessRequest::new(req.method().as_str(), req.uri().path());
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            access = access.with_header(name.as_str(), value);
        }
    }
    if let Some(RemoteUser(user)) = req.extensions().get::<RemoteUser>() {
        access = access.with_remote_user(user.clone());
    }
    if let Some(cache) = cache {
        access = access.with_cache(cache);
    }
    access
}
