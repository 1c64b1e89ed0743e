//! Consent requests from doctors to patients.
//!
//! - `GET|POST /api/patients/:patient_id/consents`
//! - `POST /api/patients/:patient_id/consents/:consent_id/respond`
//! - `POST /api/patients/:patient_id/consents/:consent_id/analyze`
//!
//! Approval opens an access window of `timelineMinutes` from the moment of
//! approval. Denial deletes the request.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::advisory::consent::{analyze_consent, ConsentAnalysisInput, DoctorProfile, PatientProfile};
use crate::api::error::{ApiError, ANALYSIS_CONTEXT};
use crate::api::types::{required, ApiContext};
use crate::db::repository::{
    approve_consent_request, delete_consent_request, get_consent_request, get_doctor, get_patient,
    insert_consent_request, list_consent_requests, set_consent_verdict,
};
use crate::models::enums::ConsentStatus;
use crate::models::{ConsentRequest, ConsentVerdict};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateConsentRequest {
    pub doctor_id: Option<String>,
    pub purpose: Option<String>,
    pub timeline_minutes: Option<Minutes>,
}

/// Minutes sent either as a JSON number or as text from a form field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Minutes {
    Number(u32),
    Text(String),
}

impl Minutes {
    pub fn value(&self) -> Option<u32> {
        match self {
            Minutes::Number(n) => Some(*n),
            Minutes::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    #[serde(alias = "status")]
    pub decision: ConsentStatus,
}

#[derive(Serialize)]
pub struct ConsentsResponse {
    pub consents: Vec<ConsentRequest>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum RespondResponse {
    Approved(ConsentRequest),
    Denied {
        id: String,
        status: ConsentStatus,
        deleted: usize,
    },
}

fn not_found(what: &str) -> ApiError {
    ApiError::NotFound(format!("{what} not found"))
}

/// `POST /api/patients/:patient_id/consents`: a doctor asks for access.
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    body: Result<Json<CreateConsentRequest>, JsonRejection>,
) -> Result<Json<ConsentRequest>, ApiError> {
    let Json(req) = body?;
    let doctor_id = required(req.doctor_id.as_deref(), "doctorId is required")?.to_string();
    let purpose = required(req.purpose.as_deref(), "Purpose is required")?.to_string();
    let timeline_minutes = req
        .timeline_minutes
        .as_ref()
        .and_then(Minutes::value)
        .filter(|m| *m > 0)
        .ok_or_else(|| ApiError::BadRequest("timelineMinutes must be a positive number".into()))?;

    let consent = ctx
        .with_db(move |conn| {
            let patient = get_patient(conn, &patient_id)?.ok_or_else(|| not_found("Patient"))?;
            let doctor = get_doctor(conn, &doctor_id)?.ok_or_else(|| not_found("Doctor"))?;

            let consent = ConsentRequest {
                id: uuid::Uuid::new_v4().to_string(),
                patient_id: patient.id,
                doctor_id: doctor.id,
                doctor_name: doctor.full_name,
                clinic: doctor.associated_clinic,
                health_id: patient.health_id,
                patient_name: patient.full_name,
                purpose,
                timeline_minutes,
                status: ConsentStatus::Pending,
                ai_verdict: None,
                created_at: Utc::now(),
                responded_at: None,
            };
            insert_consent_request(conn, &consent)?;
            tracing::info!(
                consent_id = %consent.id,
                doctor_id = %consent.doctor_id,
                timeline_minutes,
                "consent requested"
            );
            Ok(consent)
        })
        .await?;
    Ok(Json(consent))
}

/// `GET /api/patients/:patient_id/consents`
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<ConsentsResponse>, ApiError> {
    let consents = ctx
        .with_db(move |conn| Ok(list_consent_requests(conn, &patient_id)?))
        .await?;
    Ok(Json(ConsentsResponse { consents }))
}

/// `POST /api/patients/:patient_id/consents/:consent_id/respond`
pub async fn respond(
    State(ctx): State<ApiContext>,
    Path((patient_id, consent_id)): Path<(String, String)>,
    body: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<RespondResponse>, ApiError> {
    let Json(req) = body?;

    let response = ctx
        .with_db(move |conn| match req.decision {
            ConsentStatus::Approved => {
                approve_consent_request(conn, &patient_id, &consent_id, Utc::now())?;
                tracing::info!(consent_id = %consent_id, "consent approved");
                get_consent_request(conn, &patient_id, &consent_id)?
                    .map(RespondResponse::Approved)
                    .ok_or_else(|| not_found("ConsentRequest"))
            }
            ConsentStatus::Denied => {
                delete_consent_request(conn, &patient_id, &consent_id)?;
                tracing::info!(consent_id = %consent_id, "consent denied and removed");
                Ok(RespondResponse::Denied {
                    id: consent_id,
                    status: ConsentStatus::Denied,
                    deleted: 1,
                })
            }
            ConsentStatus::Pending => Err(ApiError::BadRequest(
                "Decision must be approved or denied".into(),
            )),
        })
        .await?;
    Ok(Json(response))
}

/// `POST /api/patients/:patient_id/consents/:consent_id/analyze`
///
/// Runs the model check on a stored request and keeps the verdict on it.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Path((patient_id, consent_id)): Path<(String, String)>,
) -> Result<Json<ConsentVerdict>, ApiError> {
    let verdict = ctx
        .blocking(move |core| {
            let conn = core.open_db()?;
            let consent = get_consent_request(&conn, &patient_id, &consent_id)?
                .ok_or_else(|| not_found("ConsentRequest"))?;
            let doctor = get_doctor(&conn, &consent.doctor_id)?.ok_or_else(|| not_found("Doctor"))?;
            let patient = get_patient(&conn, &patient_id)?.ok_or_else(|| not_found("Patient"))?;

            let input = ConsentAnalysisInput {
                doctor: DoctorProfile {
                    full_name: doctor.full_name,
                    license_number: doctor.license_number,
                    associated_clinic: doctor.associated_clinic,
                    specialization: doctor.specialization,
                },
                patient: PatientProfile {
                    full_name: patient.full_name,
                    email: patient.email,
                },
                request_details: consent.purpose,
            };
            let verdict = analyze_consent(core.llm(), core.access_rules(), &input)
                .map_err(|e| ApiError::advisory(e, ANALYSIS_CONTEXT))?;
            set_consent_verdict(&conn, &patient_id, &consent_id, &verdict)?;
            Ok(verdict)
        })
        .await?;
    Ok(Json(verdict))
}
