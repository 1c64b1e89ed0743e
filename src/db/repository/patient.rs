use rusqlite::{params, Connection, OptionalExtension};

use super::map_write_error;
use crate::db::DatabaseError;
use crate::models::Patient;

/// Insert a patient, or replace the profile fields of an existing one.
/// `created_at` of an existing row is preserved.
pub fn upsert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, full_name, email, health_id, date_of_birth, gender,
         blood_group, phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
           full_name = excluded.full_name,
           email = excluded.email,
           health_id = excluded.health_id,
           date_of_birth = excluded.date_of_birth,
           gender = excluded.gender,
           blood_group = excluded.blood_group,
           phone = excluded.phone",
        params![
            patient.id,
            patient.full_name,
            patient.email,
            patient.health_id,
            patient.date_of_birth,
            patient.gender,
            patient.blood_group,
            patient.phone,
            patient.created_at,
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &str) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, full_name, email, health_id, date_of_birth, gender, blood_group,
             phone, created_at
             FROM patients WHERE id = ?1",
            params![id],
            row_to_patient,
        )
        .optional()?;
    Ok(patient)
}

/// Look a patient up by the public health id doctors search with.
pub fn get_patient_by_health_id(
    conn: &Connection,
    health_id: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, full_name, email, health_id, date_of_birth, gender, blood_group,
             phone, created_at
             FROM patients WHERE health_id = ?1",
            params![health_id],
            row_to_patient,
        )
        .optional()?;
    Ok(patient)
}

/// Doctor-side search: health id first, then email, then exact full name.
/// Email is compared case-insensitively. Several patients may share a name;
/// the earliest created one is returned.
pub fn search_patient(conn: &Connection, query: &str) -> Result<Option<Patient>, DatabaseError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }
    if let Some(patient) = get_patient_by_health_id(conn, query)? {
        return Ok(Some(patient));
    }

    let by_email = conn
        .query_row(
            "SELECT id, full_name, email, health_id, date_of_birth, gender, blood_group,
             phone, created_at
             FROM patients WHERE email = ?1 COLLATE NOCASE
             ORDER BY created_at ASC LIMIT 1",
            params![query],
            row_to_patient,
        )
        .optional()?;
    if by_email.is_some() {
        return Ok(by_email);
    }

    let by_name = conn
        .query_row(
            "SELECT id, full_name, email, health_id, date_of_birth, gender, blood_group,
             phone, created_at
             FROM patients WHERE full_name = ?1
             ORDER BY created_at ASC LIMIT 1",
            params![query],
            row_to_patient,
        )
        .optional()?;
    Ok(by_name)
}

pub fn patient_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM patients WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

fn row_to_patient(row: &rusqlite::Row<'_>) -> Result<Patient, rusqlite::Error> {
    Ok(Patient {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        health_id: row.get(3)?,
        date_of_birth: row.get(4)?,
        gender: row.get(5)?,
        blood_group: row.get(6)?,
        phone: row.get(7)?,
        created_at: row.get(8)?,
    })
}
