//! `POST /api/visual-insights`: chart payloads built from a patient's stored reports.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{required, ApiContext};
use crate::db::repository::list_health_records;
use crate::insights::charts::LineChart;
use crate::insights::organ::OrganRadar;
use crate::insights::visual_insights;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualInsightsRequest {
    pub patient_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoRecordsBody {
    message: &'static str,
    line_charts: Vec<LineChart>,
    radar_chart: Option<OrganRadar>,
}

pub async fn build(
    State(ctx): State<ApiContext>,
    body: Result<Json<VisualInsightsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    let patient_id = required(req.patient_id.as_deref(), "patientId is required")?.to_string();

    let response = ctx
        .with_db(move |conn| {
            let records = list_health_records(conn, &patient_id)?;
            if records.is_empty() {
                tracing::info!(patient_id = %patient_id, "no health records for visual insights");
                let body = NoRecordsBody {
                    message: "No health records found",
                    line_charts: Vec::new(),
                    radar_chart: None,
                };
                return Ok((StatusCode::NOT_FOUND, Json(body)).into_response());
            }
            Ok(Json(visual_insights(&records)).into_response())
        })
        .await?;
    Ok(response)
}
