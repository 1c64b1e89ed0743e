//! Shared types for the API layer.

use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::core_state::{CoreError, CoreState};
use crate::db::repository::patient_exists;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Run SQLite or LLM work on the blocking pool.
    pub async fn blocking<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&CoreState) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let core = Arc::clone(&self.core);
        tokio::task::spawn_blocking(move || work(&core))
            .await
            .map_err(|e| ApiError::from(CoreError::TaskFailed(e.to_string())))?
    }

    /// Like [`blocking`](Self::blocking), with a fresh connection opened for the task.
    pub async fn with_db<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        self.blocking(move |core| {
            let conn = core.open_db()?;
            work(&conn)
        })
        .await
    }
}

// ═══════════════════════════════════════════════════════════
// Response bodies shared across routes
// ═══════════════════════════════════════════════════════════

/// Body of every delete route: how many rows went away.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

// ═══════════════════════════════════════════════════════════
// Request validation helpers
// ═══════════════════════════════════════════════════════════

/// Trimmed value of a required text field, or 400 with `message`.
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

/// 404 unless the patient exists.
pub fn ensure_patient(conn: &Connection, patient_id: &str) -> Result<(), ApiError> {
    if patient_exists(conn, patient_id)? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Patient not found".into()))
    }
}
