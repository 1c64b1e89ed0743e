//! Patient profiles.
//!
//! - `POST /api/patients`: create or replace a profile
//! - `GET /api/patients?healthId=`: look a patient up by health id
//! - `GET /api/patients?q=`: doctor search by health id, then email, then full name
//! - `GET /api/patients/:patient_id`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{required, ApiContext};
use crate::db::repository::{get_patient, get_patient_by_health_id, search_patient, upsert_patient};
use crate::models::Patient;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRequest {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// Generated when absent.
    pub health_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
}

/// `MX-` followed by eight upper-case hex digits.
fn generate_health_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("MX-{}", id[..8].to_ascii_uppercase())
}

/// `POST /api/patients`
pub async fn upsert(
    State(ctx): State<ApiContext>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Json(req) = body?;
    let id = required(req.id.as_deref(), "Patient id is required")?.to_string();
    let full_name = required(req.full_name.as_deref(), "Full name is required")?.to_string();
    let email = required(req.email.as_deref(), "Email is required")?.to_string();

    let patient = ctx
        .with_db(move |conn| {
            let existing = get_patient(conn, &id)?;
            let health_id = req
                .health_id
                .filter(|h| !h.trim().is_empty())
                .or_else(|| existing.as_ref().map(|p| p.health_id.clone()))
                .unwrap_or_else(generate_health_id);

            let patient = Patient {
                id,
                full_name,
                email,
                health_id,
                date_of_birth: req.date_of_birth,
                gender: req.gender,
                blood_group: req.blood_group,
                phone: req.phone,
                created_at: existing.map(|p| p.created_at).unwrap_or_else(Utc::now),
            };
            upsert_patient(conn, &patient)?;
            tracing::info!(patient_id = %patient.id, "patient profile saved");
            Ok(patient)
        })
        .await?;
    Ok(Json(patient))
}

/// `GET /api/patients/:patient_id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient = ctx
        .with_db(move |conn| {
            get_patient(conn, &patient_id)?.ok_or_else(|| ApiError::NotFound("Patient not found".into()))
        })
        .await?;
    Ok(Json(patient))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupQuery {
    pub health_id: Option<String>,
    /// Free-text search term.
    pub q: Option<String>,
}

/// `GET /api/patients?healthId=` or `GET /api/patients?q=`
pub async fn lookup(
    State(ctx): State<ApiContext>,
    query: Result<Query<LookupQuery>, QueryRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Query(query) = query?;
    let health_id = query.health_id.as_deref().map(str::trim).filter(|h| !h.is_empty());
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let patient = match (health_id, search) {
        (Some(health_id), _) => {
            let health_id = health_id.to_string();
            ctx.with_db(move |conn| Ok(get_patient_by_health_id(conn, &health_id)?))
                .await?
        }
        (None, Some(term)) => {
            let term = term.to_string();
            ctx.with_db(move |conn| Ok(search_patient(conn, &term)?)).await?
        }
        (None, None) => {
            return Err(ApiError::BadRequest("healthId or q is required".into()));
        }
    };
    patient
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))
}
