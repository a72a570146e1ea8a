//! Correlation-id propagation
//!
//! Every request gets a correlation id: the caller's `X-Correlation-Id`
//! when it parses as a UUID, a freshly minted one otherwise. Handlers
//! read it from request extensions to stamp error bodies, the request
//! span carries it for log correlation, and the response echoes it back.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// The header name for the correlation ID
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Correlation id honored from the request or minted here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Get the correlation ID as a UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

/// Pull a valid id out of the request headers, or mint one
fn resolve(headers: &HeaderMap) -> CorrelationId {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .and_then(|raw| Uuid::try_parse(raw).ok())
        .map_or_else(|| CorrelationId(Uuid::new_v4()), CorrelationId)
}

/// Middleware function; apply with `axum::middleware::from_fn`
pub async fn propagate_correlation_id(mut request: Request, next: Next) -> Response {
    let id = resolve(request.headers());

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %id.as_uuid(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    request.extensions_mut().insert(id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(echo) = HeaderValue::from_str(&id.as_uuid().to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, echo);
    }
    response
}
