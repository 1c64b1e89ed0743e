use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub license_number: String,
    pub specialization: String,
    pub associated_clinic: Option<String>,
    pub created_at: DateTime<Utc>,
}
