use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use ledgerly_core::TransactionId;
use ledgerly_ledger::{Transaction, TransactionInput};

use crate::app::dto::{CreatedTransaction, ListQuery, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route(
            "/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

/// A path id that is not an integer cannot name a record, so it is a 404
/// rather than a 400.
fn parse_id(raw: &str) -> Result<TransactionId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn read_body(
    body: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<TransactionInput, ApiError> {
    body.map(|Json(b)| b)
        .map_err(|e| ApiError::InvalidRequest(e.body_text()))
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let records = services.ledger().list(query.sort.unwrap_or_default()).await?;
    Ok(Json(records))
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedTransaction>), ApiError> {
    let record = read_body(body)?.validate()?;
    let id = services.ledger().create(record).await?;
    tracing::info!(transaction_id = %id, "transaction created");
    Ok((StatusCode::CREATED, Json(CreatedTransaction { id })))
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    let id = parse_id(&id)?;
    services
        .ledger()
        .get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Existence is checked before the body is looked at, so an unknown id is a
/// 404 whatever the body contains.
pub async fn update_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    if services.ledger().get(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let record = read_body(body)?.validate()?;
    // The row may have been deleted since the check; the store reports that as NotFound.
    services.ledger().update(id, record).await?;
    tracing::info!(transaction_id = %id, "transaction updated");
    Ok(Json(MessageResponse {
        message: "Transaction updated successfully",
    }))
}

pub async fn delete_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    services.ledger().delete(id).await?;
    tracing::info!(transaction_id = %id, "transaction deleted");
    Ok(Json(MessageResponse {
        message: "Transaction deleted successfully",
    }))
}
