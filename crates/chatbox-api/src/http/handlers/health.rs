//! Liveness endpoint.

use axum::Json;
use axum::extract::State;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /health - Health check with a database round trip (no auth required).
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db_pool.reader)
        .await
        .map_err(|e| AppError::Internal(format!("Database unavailable: {e}")))?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
