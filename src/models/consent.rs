use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::enums::ConsentStatus;

/// A doctor's request to read a patient's records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub clinic: Option<String>,
    pub health_id: String,
    pub patient_name: String,
    pub purpose: String,
    /// Requested access window, counted from approval.
    pub timeline_minutes: u32,
    pub status: ConsentStatus,
    pub ai_verdict: Option<ConsentVerdict>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl ConsentRequest {
    /// End of the access window, if the request has been approved.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match (self.status, self.responded_at) {
            (ConsentStatus::Approved, Some(at)) => {
                Some(at + Duration::minutes(i64::from(self.timeline_minutes)))
            }
            _ => None,
        }
    }

    /// True while an approved request is inside its access window.
    pub fn grants_access_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|end| now < end)
    }
}

/// Model verdict on whether a consent request looks legitimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentVerdict {
    /// `genuine` or `suspicious`, as reported by the model.
    pub status: String,
    /// 0–100.
    pub confidence: f64,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: ConsentStatus, responded_at: Option<DateTime<Utc>>) -> ConsentRequest {
        ConsentRequest {
            id: "c1".into(),
            patient_id: "p1".into(),
            doctor_id: "d1".into(),
            doctor_name: "Dr. Rao".into(),
            clinic: None,
            health_id: "HID-1".into(),
            patient_name: "Asha".into(),
            purpose: "Follow-up".into(),
            timeline_minutes: 30,
            status,
            ai_verdict: None,
            created_at: Utc::now(),
            responded_at,
        }
    }

    #[test]
    fn pending_request_has_no_window() {
        let req = request(ConsentStatus::Pending, None);
        assert!(req.expires_at().is_none());
        assert!(!req.grants_access_at(Utc::now()));
    }

    #[test]
    fn approved_request_grants_until_window_ends() {
        let approved = Utc::now() - Duration::minutes(10);
        let req = request(ConsentStatus::Approved, Some(approved));
        assert_eq!(req.expires_at(), Some(approved + Duration::minutes(30)));
        assert!(req.grants_access_at(Utc::now()));
        assert!(!req.grants_access_at(approved + Duration::minutes(31)));
    }

    #[test]
    fn verdict_defaults_optional_fields() {
        let v: ConsentVerdict =
            serde_json::from_str(r#"{"status":"genuine","confidence":90}"#).unwrap();
        assert!(v.red_flags.is_empty());
        assert!(v.reason.is_empty());
    }
}
