use std::convert::Infallible;

use account_state::{BackendRequest, BackendResponse, StateError, StorageBackend};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
};
use tower::{Service, ServiceExt};

/// Marks a request issued by the filter itself rather than by a user.
///
/// Downstream services can read `source` to keep these lookups out of user
/// facing logs and metrics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalRequest {
    pub source: String,
}

/// [`StorageBackend`] that dispatches account lookups into a tower service, usually the
/// storage application the filter is wrapping.
#[derive(Clone)]
pub struct ServiceBackend<S> {
    inner: S,
}

impl<S> ServiceBackend<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn transport_error(err: impl std::fmt::Display) -> StateError {
    StateError::Transport(err.to_string())
}

#[async_trait]
impl<S> StorageBackend for ServiceBackend<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    async fn head(&self, request: BackendRequest) -> Result<BackendResponse, StateError> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(transport_error)?;
        let lookup = Request::builder()
            .method(method)
            .uri(request.path.as_str())
            .extension(InternalRequest {
                source: request.source.clone(),
            })
            .body(Body::empty())
            .map_err(transport_error)?;

        let response = self
            .inner
            .clone()
            .oneshot(lookup)
            .await
            .unwrap_or_else(|never| match never {});

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Ok(BackendResponse {
            status: response.status().as_u16(),
            headers,
        })
    }
}
