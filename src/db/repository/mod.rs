//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per collection of the document model: patients and
//! doctors at the top level, and the per-patient nested collections
//! (health records, consent requests, goals, vaccines) plus appointments.
//! All public functions are re-exported here.

mod appointment;
mod consent;
mod doctor;
mod goal;
mod health_record;
mod patient;
mod vaccine;

use rusqlite::ErrorCode;

use super::DatabaseError;

pub use appointment::*;
pub use consent::*;
pub use doctor::*;
pub use goal::*;
pub use health_record::*;
pub use patient::*;
pub use vaccine::*;

/// Turn SQLite constraint failures into `ConstraintViolation` so callers
/// can tell bad input apart from storage faults.
pub(crate) fn map_write_error(err: rusqlite::Error) -> DatabaseError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            DatabaseError::ConstraintViolation(
                msg.clone().unwrap_or_else(|| "constraint failed".to_string()),
            )
        }
        _ => DatabaseError::Sqlite(err),
    }
}

/// Convert an enum parse failure inside a row mapper into a rusqlite error.
pub(crate) fn column_error(idx: usize, err: DatabaseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}
