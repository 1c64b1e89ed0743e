use rusqlite::{params, Connection, OptionalExtension};

use super::map_write_error;
use crate::db::DatabaseError;
use crate::models::HealthGoal;

pub fn insert_goal(conn: &Connection, goal: &HealthGoal) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO health_goals (id, patient_id, name, done, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            goal.id,
            goal.patient_id,
            goal.name,
            goal.done as i32,
            goal.created_at,
        ],
    )
    .map_err(map_write_error)?;
    Ok(())
}

pub fn list_goals(conn: &Connection, patient_id: &str) -> Result<Vec<HealthGoal>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, name, done, created_at
         FROM health_goals WHERE patient_id = ?1 ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![patient_id], row_to_goal)?;

    let mut goals = Vec::new();
    for row in rows {
        goals.push(row?);
    }
    Ok(goals)
}

pub fn get_goal(
    conn: &Connection,
    patient_id: &str,
    goal_id: &str,
) -> Result<Option<HealthGoal>, DatabaseError> {
    let goal = conn
        .query_row(
            "SELECT id, patient_id, name, done, created_at
             FROM health_goals WHERE patient_id = ?1 AND id = ?2",
            params![patient_id, goal_id],
            row_to_goal,
        )
        .optional()?;
    Ok(goal)
}

pub fn set_goal_done(
    conn: &Connection,
    patient_id: &str,
    goal_id: &str,
    done: bool,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE health_goals SET done = ?3 WHERE patient_id = ?1 AND id = ?2",
        params![patient_id, goal_id, done as i32],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("HealthGoal", goal_id));
    }
    Ok(())
}

pub fn delete_goal(conn: &Connection, patient_id: &str, goal_id: &str) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM health_goals WHERE patient_id = ?1 AND id = ?2",
        params![patient_id, goal_id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("HealthGoal", goal_id));
    }
    Ok(())
}

/// Remove every goal of a patient. Returns how many were deleted.
pub fn delete_all_goals(conn: &Connection, patient_id: &str) -> Result<usize, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM health_goals WHERE patient_id = ?1",
        params![patient_id],
    )?;
    Ok(affected)
}

fn row_to_goal(row: &rusqlite::Row<'_>) -> Result<HealthGoal, rusqlite::Error> {
    let done: i32 = row.get(3)?;
    Ok(HealthGoal {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        done: done != 0,
        created_at: row.get(4)?,
    })
}
