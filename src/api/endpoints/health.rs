//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database_ok: bool,
    pub model: String,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let database_ok = ctx.with_db(|_| Ok(())).await.is_ok();

    Ok(Json(HealthResponse {
        status: "ok",
        database_ok,
        model: ctx.core.llm().model().to_string(),
        version: crate::config::APP_VERSION,
    }))
}
