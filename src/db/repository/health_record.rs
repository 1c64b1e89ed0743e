use rusqlite::{params, Connection, OptionalExtension};

use super::map_write_error;
use crate::db::DatabaseError;
use crate::models::HealthRecord;

pub fn insert_health_record(conn: &Connection, record: &HealthRecord) -> Result<(), DatabaseError> {
    let size = i64::try_from(record.size).map_err(|_| {
        DatabaseError::ConstraintViolation(format!("Record size {} is out of range", record.size))
    })?;
    conn.execute(
        "INSERT INTO health_records (id, patient_id, name, mime_type, size, url, hash,
         verified, extracted_text, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            record.id,
            record.patient_id,
            record.name,
            record.mime_type,
            size,
            record.url,
            record.hash,
            record.verified as i32,
            record.extracted_text,
            record.uploaded_at,
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

/// All records of a patient, oldest upload first.
pub fn list_health_records(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<HealthRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, name, mime_type, size, url, hash, verified, extracted_text,
         uploaded_at
         FROM health_records WHERE patient_id = ?1 ORDER BY uploaded_at ASC",
    )?;

    let rows = stmt.query_map(params![patient_id], row_to_health_record)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

pub fn get_health_record(
    conn: &Connection,
    patient_id: &str,
    record_id: &str,
) -> Result<Option<HealthRecord>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT id, patient_id, name, mime_type, size, url, hash, verified, extracted_text,
             uploaded_at
             FROM health_records WHERE patient_id = ?1 AND id = ?2",
            params![patient_id, record_id],
            row_to_health_record,
        )
        .optional()?;
    Ok(record)
}

pub fn delete_health_record(
    conn: &Connection,
    patient_id: &str,
    record_id: &str,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM health_records WHERE patient_id = ?1 AND id = ?2",
        params![patient_id, record_id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("HealthRecord", record_id));
    }
    Ok(())
}

fn row_to_health_record(row: &rusqlite::Row<'_>) -> Result<HealthRecord, rusqlite::Error> {
    let size: i64 = row.get(4)?;
    let verified: i32 = row.get(7)?;
    Ok(HealthRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        mime_type: row.get(3)?,
        size: u64::try_from(size).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(4, size))?,
        url: row.get(5)?,
        hash: row.get(6)?,
        verified: verified != 0,
        extracted_text: row.get(8)?,
        uploaded_at: row.get(9)?,
    })
}
