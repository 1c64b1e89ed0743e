//! Shared application state.
//!
//! `CoreState` is built once at startup and handed to the HTTP layer in an
//! `Arc`. Everything in it is immutable: the database location, the LLM
//! client handle and the specialization access table. Each request opens
//! its own SQLite connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use crate::advisory::{AccessRules, AdvisoryError, LlmClient, TogetherClient};
use crate::api::server::ServerError;
use crate::config::{ConfigError, ServerConfig};
use crate::db::{self, DatabaseError};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    db_path: PathBuf,
    llm: Arc<dyn LlmClient>,
    access_rules: AccessRules,
}

impl CoreState {
    pub fn new(db_path: PathBuf, llm: Arc<dyn LlmClient>, access_rules: AccessRules) -> Self {
        Self {
            db_path,
            llm,
            access_rules,
        }
    }

    /// Build state from configuration: migrate the database, load the
    /// access rules and construct the LLM client.
    ///
    /// Must run outside the tokio runtime (the LLM client is blocking).
    pub fn from_config(config: &ServerConfig) -> Result<Self, CoreError> {
        // Migrates on open; the connection itself is not kept.
        db::open_database(&config.database_path)?;
        tracing::info!(path = %config.database_path.display(), "database ready");

        let access_rules = AccessRules::load(config.access_rules_path.as_deref())?;
        if config.llm_api_key.is_empty() {
            tracing::warn!("TOGETHER_API_KEY is not set; advisory endpoints will fail upstream");
        }
        let llm = TogetherClient::new(
            &config.llm_api_url,
            &config.llm_api_key,
            &config.llm_model,
            config.llm_timeout_secs,
        )?;
        tracing::info!(model = %config.llm_model, url = %config.llm_api_url, "LLM client configured");

        Ok(Self::new(config.database_path.clone(), Arc::new(llm), access_rules))
    }

    /// Open a database connection. Called once per request, on a blocking thread.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        db::open_connection(&self.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn llm(&self) -> &dyn LlmClient {
        self.llm.as_ref()
    }

    pub fn access_rules(&self) -> &AccessRules {
        &self.access_rules
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Advisory(#[from] AdvisoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("Blocking task failed: {0}")]
    TaskFailed(String),
}

// ═══════════════════════════════════════════════════════════
// Test helpers
// ═══════════════════════════════════════════════════════════

/// State backed by a migrated database in a fresh temp directory.
/// Keep the returned `TempDir` alive for the duration of the test.
#[cfg(test)]
pub(crate) fn test_state(llm: Arc<dyn LlmClient>) -> (Arc<CoreState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medxact-test.db");
    db::open_database(&path).unwrap();
    let rules = AccessRules::bundled().unwrap();
    (Arc::new(CoreState::new(path, llm, rules)), dir)
}
