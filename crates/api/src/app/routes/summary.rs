use std::sync::Arc;

use axum::{extract::Extension, Json};

use ledgerly_ledger::Summary;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// Totals are computed by the store (grouped sum), not by listing records.
pub async fn get_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Summary>, ApiError> {
    Ok(Json(services.ledger().summary().await?))
}
