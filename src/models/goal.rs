use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthGoal {
    pub id: String,
    pub patient_id: String,
    pub name: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}
