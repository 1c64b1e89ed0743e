//! Doctor profiles and consent-gated access to patient data.
//!
//! - `POST /api/doctors`, `GET /api/doctors/:doctor_id`
//! - `GET /api/doctors/:doctor_id/patients/:patient_id/records`
//! - `GET|POST /api/doctors/:doctor_id/patients/:patient_id/goals`
//! - `PATCH|DELETE /api/doctors/:doctor_id/patients/:patient_id/goals/:goal_id`
//!
//! Every patient-data route checks for a live approved consent first and
//! answers 403 without one.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;

use super::goals::{add_goal, toggle_goal, AddGoalRequest, GoalsResponse, SetDoneRequest};
use super::records::RecordsResponse;
use crate::api::error::ApiError;
use crate::api::types::{required, ApiContext, DeletedResponse};
use crate::authorization::check_doctor_access;
use crate::db::repository::{delete_goal, get_doctor, list_goals, list_health_records, upsert_doctor};
use crate::models::{Doctor, HealthGoal};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorRequest {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub license_number: Option<String>,
    pub specialization: Option<String>,
    pub associated_clinic: Option<String>,
}

/// 403 unless the doctor holds a live approved consent for the patient.
fn require_access(conn: &Connection, doctor_id: &str, patient_id: &str) -> Result<(), ApiError> {
    let decision = check_doctor_access(conn, doctor_id, patient_id, Utc::now())?;
    if decision.allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(decision.reason.describe().to_string()))
    }
}

/// `POST /api/doctors`
pub async fn upsert(
    State(ctx): State<ApiContext>,
    body: Result<Json<DoctorRequest>, JsonRejection>,
) -> Result<Json<Doctor>, ApiError> {
    let Json(req) = body?;
    let id = required(req.id.as_deref(), "Doctor id is required")?.to_string();
    let full_name = required(req.full_name.as_deref(), "Full name is required")?.to_string();
    let email = required(req.email.as_deref(), "Email is required")?.to_string();
    let license_number =
        required(req.license_number.as_deref(), "License number is required")?.to_string();
    let specialization =
        required(req.specialization.as_deref(), "Specialization is required")?.to_string();

    let doctor = ctx
        .with_db(move |conn| {
            let created_at = get_doctor(conn, &id)?
                .map(|d| d.created_at)
                .unwrap_or_else(Utc::now);
            let doctor = Doctor {
                id,
                full_name,
                email,
                license_number,
                specialization,
                associated_clinic: req.associated_clinic.filter(|c| !c.trim().is_empty()),
                created_at,
            };
            upsert_doctor(conn, &doctor)?;
            tracing::info!(doctor_id = %doctor.id, "doctor profile saved");
            Ok(doctor)
        })
        .await?;
    Ok(Json(doctor))
}

/// `GET /api/doctors/:doctor_id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    let doctor = ctx
        .with_db(move |conn| {
            get_doctor(conn, &doctor_id)?.ok_or_else(|| ApiError::NotFound("Doctor not found".into()))
        })
        .await?;
    Ok(Json(doctor))
}

pub async fn patient_records(
    State(ctx): State<ApiContext>,
    Path((doctor_id, patient_id)): Path<(String, String)>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let records = ctx
        .with_db(move |conn| {
            require_access(conn, &doctor_id, &patient_id)?;
            Ok(list_health_records(conn, &patient_id)?)
        })
        .await?;
    Ok(Json(RecordsResponse { records }))
}

pub async fn patient_goals(
    State(ctx): State<ApiContext>,
    Path((doctor_id, patient_id)): Path<(String, String)>,
) -> Result<Json<GoalsResponse>, ApiError> {
    let goals = ctx
        .with_db(move |conn| {
            require_access(conn, &doctor_id, &patient_id)?;
            Ok(list_goals(conn, &patient_id)?)
        })
        .await?;
    Ok(Json(GoalsResponse { goals }))
}

pub async fn add_patient_goal(
    State(ctx): State<ApiContext>,
    Path((doctor_id, patient_id)): Path<(String, String)>,
    body: Result<Json<AddGoalRequest>, JsonRejection>,
) -> Result<Json<HealthGoal>, ApiError> {
    let Json(req) = body?;
    let name = required(req.name.as_deref(), "Goal name is required")?.to_string();
    let goal = ctx
        .with_db(move |conn| {
            require_access(conn, &doctor_id, &patient_id)?;
            let goal = add_goal(conn, &patient_id, &name)?;
            tracing::info!(doctor_id = %doctor_id, goal_id = %goal.id, "doctor added goal");
            Ok(goal)
        })
        .await?;
    Ok(Json(goal))
}

pub async fn set_patient_goal_done(
    State(ctx): State<ApiContext>,
    Path((doctor_id, patient_id, goal_id)): Path<(String, String, String)>,
    body: Result<Json<SetDoneRequest>, JsonRejection>,
) -> Result<Json<HealthGoal>, ApiError> {
    let Json(req) = body?;
    let goal = ctx
        .with_db(move |conn| {
            require_access(conn, &doctor_id, &patient_id)?;
            toggle_goal(conn, &patient_id, &goal_id, req.done)
        })
        .await?;
    Ok(Json(goal))
}

pub async fn remove_patient_goal(
    State(ctx): State<ApiContext>,
    Path((doctor_id, patient_id, goal_id)): Path<(String, String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    ctx.with_db(move |conn| {
        require_access(conn, &doctor_id, &patient_id)?;
        Ok(delete_goal(conn, &patient_id, &goal_id)?)
    })
    .await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::advisory::MockLlmClient;
    use crate::api::router::test_support::{send, test_app};
    use crate::db::repository::fixtures::seed_patient;
    use crate::db::repository::{approve_consent_request, insert_consent_request};
    use crate::models::enums::ConsentStatus;
    use crate::models::ConsentRequest;

    fn consent(conn: &Connection, minutes: u32, approved_minutes_ago: Option<i64>) {
        let req = ConsentRequest {
            id: "c1".into(),
            patient_id: "p1".into(),
            doctor_id: "d1".into(),
            doctor_name: "Dr. d1".into(),
            clinic: None,
            health_id: "HID-p1".into(),
            patient_name: "Patient p1".into(),
            purpose: "Review".into(),
            timeline_minutes: minutes,
            status: ConsentStatus::Pending,
            ai_verdict: None,
            created_at: Utc::now() - Duration::hours(2),
            responded_at: None,
        };
        insert_consent_request(conn, &req).unwrap();
        if let Some(ago) = approved_minutes_ago {
            approve_consent_request(conn, "p1", "c1", Utc::now() - Duration::minutes(ago)).unwrap();
        }
    }

    #[tokio::test]
    async fn doctor_profile_round_trip() {
        let (app, _core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        let (status, doctor) = send(
            &app,
            "POST",
            "/api/doctors",
            Some(json!({
                "id": "d1",
                "fullName": "Dr. Mehta",
                "email": "mehta@clinic.example",
                "licenseNumber": "MED12345",
                "specialization": "Cardiologist",
                "associatedClinic": ""
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(doctor["associatedClinic"].is_null());

        let (status, fetched) = send(&app, "GET", "/api/doctors/d1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["licenseNumber"], "MED12345");

        let (status, json) =
            send(&app, "POST", "/api/doctors", Some(json!({"id": "d2", "fullName": "X", "email": "x@y"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "License number is required");
    }

    #[tokio::test]
    async fn goal_access_without_approval_is_forbidden() {
        let (app, core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        {
            let conn = core.open_db().unwrap();
            seed_patient(&conn, "p1");
            consent(&conn, 60, None);
        }

        let (status, json) = send(&app, "GET", "/api/doctors/d1/patients/p1/goals", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Consent request is still pending");

        let (status, _) = send(
            &app,
            "POST",
            "/api/doctors/d1/patients/p1/goals",
            Some(json!({"name": "Walk"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "GET", "/api/doctors/d1/patients/p1/records", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn approved_doctor_manages_goals_within_window() {
        let (app, core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        {
            let conn = core.open_db().unwrap();
            seed_patient(&conn, "p1");
            consent(&conn, 60, Some(5));
        }

        let (status, goal) = send(
            &app,
            "POST",
            "/api/doctors/d1/patients/p1/goals",
            Some(json!({"name": "Check BP daily"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/doctors/d1/patients/p1/goals/{}", goal["id"].as_str().unwrap());
        let (status, toggled) = send(&app, "PATCH", &uri, Some(json!({"done": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["done"], true);

        let (_, listed) = send(&app, "GET", "/api/doctors/d1/patients/p1/goals", None).await;
        assert_eq!(listed["goals"].as_array().unwrap().len(), 1);

        let (status, records) = send(&app, "GET", "/api/doctors/d1/patients/p1/records", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(records["records"].as_array().unwrap().is_empty());

        let (status, json) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"deleted": 1}));

        // Another doctor has no consent of their own.
        let (status, _) = send(&app, "GET", "/api/doctors/d2/patients/p1/goals", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn expired_window_is_forbidden() {
        let (app, core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        {
            let conn = core.open_db().unwrap();
            seed_patient(&conn, "p1");
            consent(&conn, 10, Some(30));
        }

        let (status, json) = send(&app, "GET", "/api/doctors/d1/patients/p1/goals", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Consent window has expired");
    }
}
