//! Uploaded health records.
//!
//! - `GET|POST /api/patients/:patient_id/records`
//! - `GET|DELETE /api/patients/:patient_id/records/:record_id`
//!
//! The client extracts text from the file before upload; the service only
//! stores metadata and that text.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::api::error::ApiError;
use crate::api::types::{ensure_patient, required, ApiContext, DeletedResponse};
use crate::db::repository::{
    delete_health_record, get_health_record, insert_health_record, list_health_records,
};
use crate::models::HealthRecord;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadRecordRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub url: Option<String>,
    /// Hex SHA-256 computed by the client; derived here when absent.
    pub hash: Option<String>,
    /// Raw file content, used only to derive the hash.
    pub content: Option<String>,
    pub extracted_text: Option<String>,
    pub verified: bool,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<HealthRecord>,
}

/// Hex SHA-256 of the content, falling back to the extracted text, then the name.
fn content_hash(req: &UploadRecordRequest, name: &str) -> String {
    let source = req
        .content
        .as_deref()
        .or(req.extracted_text.as_deref())
        .unwrap_or(name);
    let digest = Sha256::digest(source.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub async fn upload(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    body: Result<Json<UploadRecordRequest>, JsonRejection>,
) -> Result<Json<HealthRecord>, ApiError> {
    let Json(req) = body?;
    let name = required(req.name.as_deref(), "Record name is required")?.to_string();

    let hash = match req.hash.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        Some(h) => h.to_ascii_lowercase(),
        None => content_hash(&req, &name),
    };
    let record = HealthRecord {
        id: uuid::Uuid::new_v4().to_string(),
        patient_id,
        name,
        mime_type: req
            .mime_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        size: req
            .size
            .or_else(|| req.content.as_ref().map(|c| c.len() as u64))
            .unwrap_or(0),
        url: req.url,
        hash,
        verified: req.verified,
        extracted_text: req.extracted_text.filter(|t| !t.trim().is_empty()),
        uploaded_at: Utc::now(),
    };

    let record = ctx
        .with_db(move |conn| {
            ensure_patient(conn, &record.patient_id)?;
            insert_health_record(conn, &record)?;
            tracing::info!(
                patient_id = %record.patient_id,
                record_id = %record.id,
                has_text = record.extracted_text.is_some(),
                "health record stored"
            );
            Ok(record)
        })
        .await?;
    Ok(Json(record))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let records = ctx
        .with_db(move |conn| Ok(list_health_records(conn, &patient_id)?))
        .await?;
    Ok(Json(RecordsResponse { records }))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Path((patient_id, record_id)): Path<(String, String)>,
) -> Result<Json<HealthRecord>, ApiError> {
    let record = ctx
        .with_db(move |conn| {
            get_health_record(conn, &patient_id, &record_id)?
                .ok_or_else(|| ApiError::NotFound("Health record not found".into()))
        })
        .await?;
    Ok(Json(record))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Path((patient_id, record_id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    ctx.with_db(move |conn| Ok(delete_health_record(conn, &patient_id, &record_id)?))
        .await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}
