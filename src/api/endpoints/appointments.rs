//! Appointment endpoints.
//!
//! Two endpoints:
//! - `POST /api/appointments`: book an appointment (starts `upcoming`)
//! - `GET /api/appointments?doctorId=`: a doctor's appointments in date order

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ensure_patient, required, ApiContext};
use crate::db::repository::{get_doctor, insert_appointment, list_appointments_for_doctor};
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookRequest {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub doctor_id: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `POST /api/appointments`
pub async fn book(
    State(ctx): State<ApiContext>,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let Json(req) = body?;
    let patient_id = required(req.patient_id.as_deref(), "patientId is required")?.to_string();
    let doctor_id = required(req.doctor_id.as_deref(), "doctorId is required")?.to_string();
    let time = required(req.time.as_deref(), "Time is required")?.to_string();
    let date = req
        .date
        .ok_or_else(|| ApiError::BadRequest("Date is required".into()))?;

    let appointment = Appointment {
        id: uuid::Uuid::new_v4().to_string(),
        patient_id,
        doctor_id,
        date,
        time,
        reason: req.reason.trim().to_string(),
        status: AppointmentStatus::Upcoming,
        created_at: Utc::now(),
    };

    let appointment = ctx
        .with_db(move |conn| {
            ensure_patient(conn, &appointment.patient_id)?;
            if get_doctor(conn, &appointment.doctor_id)?.is_none() {
                return Err(ApiError::NotFound("Doctor not found".into()));
            }
            insert_appointment(conn, &appointment)?;
            tracing::info!(
                appointment_id = %appointment.id,
                doctor_id = %appointment.doctor_id,
                date = %appointment.date,
                "appointment booked"
            );
            Ok(appointment)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /api/appointments?doctorId=`
pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let Query(query) = query?;
    let doctor_id = required(query.doctor_id.as_deref(), "doctorId is required")?.to_string();

    let appointments = ctx
        .with_db(move |conn| Ok(list_appointments_for_doctor(conn, &doctor_id)?))
        .await?;
    Ok(Json(AppointmentsResponse { appointments }))
}
