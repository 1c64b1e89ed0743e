use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccineRecord {
    pub id: String,
    pub patient_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub vaccine_type: String,
    /// Date administered.
    pub date: NaiveDate,
    pub next_dose: Option<NaiveDate>,
    pub notes: Option<String>,
    pub certificate_url: Option<String>,
    pub taken: bool,
    pub created_at: DateTime<Utc>,
}
