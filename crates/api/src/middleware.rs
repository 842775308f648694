use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use ledgerly_auth::{AuthError, JwtValidator};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Bearer-token gate.
///
/// No usable `Authorization: Bearer` header is a 403; a token that fails
/// verification is a 401. The internal reason is logged, never returned.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        tracing::debug!("rejected request without bearer token");
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "no_token",
            "No token provided or invalid format",
        );
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            match &e {
                AuthError::BadSignature => {
                    tracing::warn!(reason = e.reason(), "rejected token with bad signature")
                }
                AuthError::Malformed(detail) => {
                    tracing::debug!(reason = e.reason(), %detail, "rejected malformed token")
                }
                AuthError::Expired => {
                    tracing::debug!(reason = e.reason(), "rejected expired token")
                }
            }
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or expired token",
            );
        }
    };

    req.extensions_mut().insert(PrincipalContext::from(claims));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// Wrap each request in a span carrying a fresh request id, and echo the id
/// back as `x-request-id`.
pub async fn request_span(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "http_request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let mut res = next.run(req).await;
        tracing::info!(status = res.status().as_u16(), "request completed");
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            res.headers_mut().insert("x-request-id", value);
        }
        res
    }
    .instrument(span)
    .await
}
