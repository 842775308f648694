use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};

use crate::app::dto::{CreatedUser, CredentialsRequest, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let (username, password) = body.require()?;

    let id = services.register(&username, &password).await?;
    Ok((StatusCode::CREATED, Json(CreatedUser { id })))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let (username, password) = body.require()?;

    let jwt = services.login(&username, &password).await?;
    Ok(Json(TokenResponse {
        token: format!("Bearer {jwt}"),
    }))
}
