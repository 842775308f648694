use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::dto;
use crate::context::PrincipalContext;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(dto::WhoAmI {
        id: principal.user_id(),
        username: principal.username().to_string(),
    })
}
