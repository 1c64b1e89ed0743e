use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded report. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: String,
    pub patient_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    pub url: Option<String>,
    /// Hex SHA-256 of the uploaded content.
    pub hash: String,
    pub verified: bool,
    /// Text pulled out of the file by the client, if any.
    pub extracted_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}
