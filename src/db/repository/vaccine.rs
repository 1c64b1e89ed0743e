use rusqlite::{params, Connection};

use super::map_write_error;
use crate::db::DatabaseError;
use crate::models::VaccineRecord;

pub fn insert_vaccine(conn: &Connection, vaccine: &VaccineRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vaccines (id, patient_id, name, vaccine_type, date, next_dose, notes,
         certificate_url, taken, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            vaccine.id,
            vaccine.patient_id,
            vaccine.name,
            vaccine.vaccine_type,
            vaccine.date,
            vaccine.next_dose,
            vaccine.notes,
            vaccine.certificate_url,
            vaccine.taken as i32,
            vaccine.created_at,
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

/// Vaccination history, most recent dose first.
pub fn list_vaccines(conn: &Connection, patient_id: &str) -> Result<Vec<VaccineRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, name, vaccine_type, date, next_dose, notes, certificate_url,
         taken, created_at
         FROM vaccines WHERE patient_id = ?1 ORDER BY date DESC, created_at DESC",
    )?;
    let rows = stmt.query_map(params![patient_id], |row| {
        let taken: i32 = row.get(8)?;
        Ok(VaccineRecord {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            name: row.get(2)?,
            vaccine_type: row.get(3)?,
            date: row.get(4)?,
            next_dose: row.get(5)?,
            notes: row.get(6)?,
            certificate_url: row.get(7)?,
            taken: taken != 0,
            created_at: row.get(9)?,
        })
    })?;

    let mut vaccines = Vec::new();
    for row in rows {
        vaccines.push(row?);
    }
    Ok(vaccines)
}

pub fn delete_vaccine(conn: &Connection, patient_id: &str, vaccine_id: &str) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM vaccines WHERE patient_id = ?1 AND id = ?2",
        params![patient_id, vaccine_id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("VaccineRecord", vaccine_id));
    }
    Ok(())
}
