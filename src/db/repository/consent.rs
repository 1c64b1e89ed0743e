use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{column_error, map_write_error};
use crate::db::DatabaseError;
use crate::models::enums::ConsentStatus;
use crate::models::{ConsentRequest, ConsentVerdict};

const CONSENT_COLUMNS: &str = "id, patient_id, doctor_id, doctor_name, clinic, health_id,
     patient_name, purpose, timeline_minutes, status, ai_status, ai_confidence, ai_red_flags,
     ai_reason, created_at, responded_at";

pub fn insert_consent_request(
    conn: &Connection,
    req: &ConsentRequest,
) -> Result<(), DatabaseError> {
    let verdict = req.ai_verdict.as_ref();
    let red_flags = verdict
        .map(|v| serde_json::to_string(&v.red_flags))
        .transpose()
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    conn.execute(
        &format!(
            "INSERT INTO consent_requests ({CONSENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        params![
            req.id,
            req.patient_id,
            req.doctor_id,
            req.doctor_name,
            req.clinic,
            req.health_id,
            req.patient_name,
            req.purpose,
            req.timeline_minutes,
            req.status.as_str(),
            verdict.map(|v| v.status.as_str()),
            verdict.map(|v| v.confidence),
            red_flags,
            verdict.map(|v| v.reason.as_str()),
            req.created_at,
            req.responded_at,
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

/// Consent requests addressed to a patient, newest first.
pub fn list_consent_requests(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<ConsentRequest>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONSENT_COLUMNS} FROM consent_requests
         WHERE patient_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id], row_to_consent)?;

    let mut requests = Vec::new();
    for row in rows {
        requests.push(row?);
    }
    Ok(requests)
}

/// Requests a given doctor has made against a given patient.
pub fn list_consents_for_doctor(
    conn: &Connection,
    doctor_id: &str,
    patient_id: &str,
) -> Result<Vec<ConsentRequest>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONSENT_COLUMNS} FROM consent_requests
         WHERE doctor_id = ?1 AND patient_id = ?2 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![doctor_id, patient_id], row_to_consent)?;

    let mut requests = Vec::new();
    for row in rows {
        requests.push(row?);
    }
    Ok(requests)
}

pub fn get_consent_request(
    conn: &Connection,
    patient_id: &str,
    consent_id: &str,
) -> Result<Option<ConsentRequest>, DatabaseError> {
    let req = conn
        .query_row(
            &format!(
                "SELECT {CONSENT_COLUMNS} FROM consent_requests
                 WHERE patient_id = ?1 AND id = ?2"
            ),
            params![patient_id, consent_id],
            row_to_consent,
        )
        .optional()?;
    Ok(req)
}

/// Mark a pending request approved and stamp the response time.
pub fn approve_consent_request(
    conn: &Connection,
    patient_id: &str,
    consent_id: &str,
    responded_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE consent_requests SET status = 'approved', responded_at = ?3
         WHERE patient_id = ?1 AND id = ?2 AND status = 'pending'",
        params![patient_id, consent_id, responded_at],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("ConsentRequest", consent_id));
    }
    Ok(())
}

/// Denied requests are removed outright.
pub fn delete_consent_request(
    conn: &Connection,
    patient_id: &str,
    consent_id: &str,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM consent_requests WHERE patient_id = ?1 AND id = ?2",
        params![patient_id, consent_id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("ConsentRequest", consent_id));
    }
    Ok(())
}

pub fn set_consent_verdict(
    conn: &Connection,
    patient_id: &str,
    consent_id: &str,
    verdict: &ConsentVerdict,
) -> Result<(), DatabaseError> {
    let red_flags = serde_json::to_string(&verdict.red_flags)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let affected = conn.execute(
        "UPDATE consent_requests
         SET ai_status = ?3, ai_confidence = ?4, ai_red_flags = ?5, ai_reason = ?6
         WHERE patient_id = ?1 AND id = ?2",
        params![
            patient_id,
            consent_id,
            verdict.status,
            verdict.confidence,
            red_flags,
            verdict.reason,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("ConsentRequest", consent_id));
    }
    Ok(())
}

fn row_to_consent(row: &rusqlite::Row<'_>) -> Result<ConsentRequest, rusqlite::Error> {
    let status: String = row.get(9)?;
    let ai_status: Option<String> = row.get(10)?;
    let ai_confidence: Option<f64> = row.get(11)?;
    let ai_red_flags: Option<String> = row.get(12)?;
    let ai_reason: Option<String> = row.get(13)?;

    let ai_verdict = match (ai_status, ai_confidence) {
        (Some(status), Some(confidence)) => Some(ConsentVerdict {
            status,
            confidence,
            red_flags: ai_red_flags
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
            reason: ai_reason.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(ConsentRequest {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        doctor_name: row.get(3)?,
        clinic: row.get(4)?,
        health_id: row.get(5)?,
        patient_name: row.get(6)?,
        purpose: row.get(7)?,
        timeline_minutes: row.get(8)?,
        status: ConsentStatus::from_str(&status).map_err(|e| column_error(9, e))?,
        ai_verdict,
        created_at: row.get(14)?,
        responded_at: row.get(15)?,
    })
}
