use std::str::FromStr;

use rusqlite::{params, Connection};

use super::{column_error, map_write_error};
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, date, time, reason, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appt.id,
            appt.patient_id,
            appt.doctor_id,
            appt.date,
            appt.time,
            appt.reason,
            appt.status.as_str(),
            appt.created_at,
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

/// A doctor's appointments in calendar order.
pub fn list_appointments_for_doctor(
    conn: &Connection,
    doctor_id: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_id, date, time, reason, status, created_at
         FROM appointments WHERE doctor_id = ?1 ORDER BY date ASC, time ASC",
    )?;
    let rows = stmt.query_map(params![doctor_id], |row| {
        let status: String = row.get(6)?;
        Ok(Appointment {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            doctor_id: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
            reason: row.get(5)?,
            status: AppointmentStatus::from_str(&status).map_err(|e| column_error(6, e))?,
            created_at: row.get(7)?,
        })
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?);
    }
    Ok(appointments)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn make_appointment(id: &str, doctor_id: &str, day: u32) -> Appointment {
        Appointment {
            id: id.into(),
            patient_id: "p1".into(),
            doctor_id: doctor_id.into(),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            time: "10:30".into(),
            reason: "Thyroid follow-up".into(),
            status: AppointmentStatus::Upcoming,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn doctor_listing_is_date_ordered() {
        let conn = open_memory_database().unwrap();
        insert_appointment(&conn, &make_appointment("a1", "d1", 20)).unwrap();
        insert_appointment(&conn, &make_appointment("a2", "d1", 3)).unwrap();
        insert_appointment(&conn, &make_appointment("a3", "d2", 1)).unwrap();

        let listed = list_appointments_for_doctor(&conn, "d1").unwrap();
        let ids: Vec<_> = listed.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);
        assert_eq!(listed[0].status, AppointmentStatus::Upcoming);
    }
}
