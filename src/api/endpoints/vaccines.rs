//! Vaccination history.
//!
//! - `GET|POST /api/patients/:patient_id/vaccines`
//! - `DELETE /api/patients/:patient_id/vaccines/:vaccine_id`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ensure_patient, required, ApiContext, DeletedResponse};
use crate::db::repository::{delete_vaccine, insert_vaccine, list_vaccines};
use crate::models::VaccineRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVaccineRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub vaccine_type: String,
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub next_dose: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub certificate_url: Option<String>,
    #[serde(default = "taken_default")]
    pub taken: bool,
}

fn taken_default() -> bool {
    true
}

#[derive(Serialize)]
pub struct VaccinesResponse {
    pub vaccines: Vec<VaccineRecord>,
}

pub async fn add(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    body: Result<Json<AddVaccineRequest>, JsonRejection>,
) -> Result<Json<VaccineRecord>, ApiError> {
    let Json(req) = body?;
    let name = required(req.name.as_deref(), "Vaccine name is required")?.to_string();

    let now = Utc::now();
    let vaccine = VaccineRecord {
        id: uuid::Uuid::new_v4().to_string(),
        patient_id,
        name,
        vaccine_type: req.vaccine_type.trim().to_string(),
        date: req.date.unwrap_or_else(|| now.date_naive()),
        next_dose: req.next_dose,
        notes: req.notes.filter(|n| !n.trim().is_empty()),
        certificate_url: req.certificate_url,
        taken: req.taken,
        created_at: now,
    };

    let vaccine = ctx
        .with_db(move |conn| {
            ensure_patient(conn, &vaccine.patient_id)?;
            insert_vaccine(conn, &vaccine)?;
            Ok(vaccine)
        })
        .await?;
    Ok(Json(vaccine))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<VaccinesResponse>, ApiError> {
    let vaccines = ctx
        .with_db(move |conn| Ok(list_vaccines(conn, &patient_id)?))
        .await?;
    Ok(Json(VaccinesResponse { vaccines }))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Path((patient_id, vaccine_id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    ctx.with_db(move |conn| Ok(delete_vaccine(conn, &patient_id, &vaccine_id)?))
        .await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::advisory::MockLlmClient;
    use crate::api::router::test_support::{send, test_app};
    use crate::db::repository::fixtures::seed_patient;

    #[tokio::test]
    async fn add_list_delete() {
        let (app, core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        seed_patient(&core.open_db().unwrap(), "p1");

        let (status, older) = send(
            &app,
            "POST",
            "/api/patients/p1/vaccines",
            Some(json!({"name": "BCG", "type": "Birth", "date": "1995-02-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(older["taken"], true);

        send(
            &app,
            "POST",
            "/api/patients/p1/vaccines",
            Some(json!({"name": "Typhoid", "type": "Booster", "date": "2023-08-15", "nextDose": "2026-08-15"})),
        )
        .await;

        let (_, listed) = send(&app, "GET", "/api/patients/p1/vaccines", None).await;
        let vaccines = listed["vaccines"].as_array().unwrap();
        assert_eq!(vaccines.len(), 2);
        assert_eq!(vaccines[0]["name"], "Typhoid");
        assert_eq!(vaccines[0]["nextDose"], "2026-08-15");

        let uri = format!("/api/patients/p1/vaccines/{}", older["id"].as_str().unwrap());
        let (status, json) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"deleted": 1}));
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn name_is_required() {
        let (app, core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        seed_patient(&core.open_db().unwrap(), "p1");

        let (status, json) =
            send(&app, "POST", "/api/patients/p1/vaccines", Some(json!({"type": "Dose 1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Vaccine name is required");

        let (status, _) = send(
            &app,
            "POST",
            "/api/patients/p1/vaccines",
            Some(json!({"name": "MMR", "date": "not-a-date"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
