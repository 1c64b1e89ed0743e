use rusqlite::{params, Connection, OptionalExtension};

use super::map_write_error;
use crate::db::DatabaseError;
use crate::models::Doctor;

/// Insert a doctor, or replace the profile fields of an existing one.
pub fn upsert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, full_name, email, license_number, specialization,
         associated_clinic, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
           full_name = excluded.full_name,
           email = excluded.email,
           license_number = excluded.license_number,
           specialization = excluded.specialization,
           associated_clinic = excluded.associated_clinic",
        params![
            doctor.id,
            doctor.full_name,
            doctor.email,
            doctor.license_number,
            doctor.specialization,
            doctor.associated_clinic,
            doctor.created_at,
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &str) -> Result<Option<Doctor>, DatabaseError> {
    let doctor = conn
        .query_row(
            "SELECT id, full_name, email, license_number, specialization, associated_clinic,
             created_at
             FROM doctors WHERE id = ?1",
            params![id],
            |row| {
                Ok(Doctor {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                    email: row.get(2)?,
                    license_number: row.get(3)?,
                    specialization: row.get(4)?,
                    associated_clinic: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(doctor)
}
