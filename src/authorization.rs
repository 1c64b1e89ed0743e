//! Doctor access to patient data.
//!
//! A doctor may read a patient's records and manage their goals only while
//! one of the doctor's consent requests to that patient is approved and
//! still inside its requested window:
//! 1. Approved request, `now < responded_at + timeline_minutes` → ALLOW
//! 2. Approved request whose window has passed → DENY (expired)
//! 3. Only pending requests → DENY (pending)
//! 4. No request at all → DENY
//!
//! Default-deny. Denied requests are deleted on response, so they never
//! show up here.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::repository::list_consents_for_doctor;
use crate::db::DatabaseError;
use crate::models::enums::ConsentStatus;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Why access was granted or denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessReason {
    /// An approved consent request is inside its window.
    ApprovedConsent {
        consent_id: String,
        expires_at: DateTime<Utc>,
    },
    /// Approved once, but the window has closed.
    ConsentExpired,
    /// The patient has not answered yet.
    ConsentPending,
    /// The doctor never asked.
    NoConsent,
}

impl AccessReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ApprovedConsent { .. } => "Access granted by patient consent",
            Self::ConsentExpired => "Consent window has expired",
            Self::ConsentPending => "Consent request is still pending",
            Self::NoConsent => "No consent from this patient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(consent_id: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            allowed: true,
            reason: AccessReason::ApprovedConsent {
                consent_id,
                expires_at,
            },
        }
    }

    fn deny(reason: AccessReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Authorization check
// ═══════════════════════════════════════════════════════════

/// Check whether `doctor_id` may act on `patient_id`'s data at `now`.
///
/// When several approved requests exist, the one with the latest expiry wins.
pub fn check_doctor_access(
    conn: &Connection,
    doctor_id: &str,
    patient_id: &str,
    now: DateTime<Utc>,
) -> Result<AccessDecision, DatabaseError> {
    let requests = list_consents_for_doctor(conn, doctor_id, patient_id)?;

    let live = requests
        .iter()
        .filter(|r| r.grants_access_at(now))
        .filter_map(|r| Some((r, r.expires_at()?)))
        .max_by_key(|(_, expires_at)| *expires_at);
    if let Some((request, expires_at)) = live {
        return Ok(AccessDecision::allow(request.id.clone(), expires_at));
    }

    let decision = if requests.iter().any(|r| r.status == ConsentStatus::Approved) {
        AccessDecision::deny(AccessReason::ConsentExpired)
    } else if requests.iter().any(|r| r.status == ConsentStatus::Pending) {
        AccessDecision::deny(AccessReason::ConsentPending)
    } else {
        AccessDecision::deny(AccessReason::NoConsent)
    };
    tracing::debug!(
        doctor_id,
        patient_id,
        reason = decision.reason.describe(),
        "doctor access denied"
    );
    Ok(decision)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::repository::fixtures::seed_patient;
    use crate::db::repository::{approve_consent_request, insert_consent_request};
    use crate::db::sqlite::open_memory_database;
    use crate::models::ConsentRequest;

    fn request(id: &str, doctor_id: &str, minutes: u32) -> ConsentRequest {
        ConsentRequest {
            id: id.into(),
            patient_id: "p1".into(),
            doctor_id: doctor_id.into(),
            doctor_name: "Dr. Iyer".into(),
            clinic: None,
            health_id: "HID-p1".into(),
            patient_name: "Patient p1".into(),
            purpose: "Review".into(),
            timeline_minutes: minutes,
            status: ConsentStatus::Pending,
            ai_verdict: None,
            created_at: Utc::now() - Duration::hours(3),
            responded_at: None,
        }
    }

    fn setup() -> Connection {
        let conn = open_memory_database().unwrap();
        seed_patient(&conn, "p1");
        conn
    }

    #[test]
    fn no_request_is_denied() {
        let conn = setup();
        let decision = check_doctor_access(&conn, "d1", "p1", Utc::now()).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason, AccessReason::NoConsent);
    }

    #[test]
    fn pending_request_is_denied() {
        let conn = setup();
        insert_consent_request(&conn, &request("c1", "d1", 60)).unwrap();
        let decision = check_doctor_access(&conn, "d1", "p1", Utc::now()).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason, AccessReason::ConsentPending);
    }

    #[test]
    fn approved_request_allows_within_window() {
        let conn = setup();
        insert_consent_request(&conn, &request("c1", "d1", 60)).unwrap();
        let approved_at = Utc::now() - Duration::minutes(30);
        approve_consent_request(&conn, "p1", "c1", approved_at).unwrap();

        let decision = check_doctor_access(&conn, "d1", "p1", Utc::now()).unwrap();
        assert!(decision.allowed);
        assert_eq!(
            decision.reason,
            AccessReason::ApprovedConsent {
                consent_id: "c1".into(),
                expires_at: approved_at + Duration::minutes(60),
            }
        );
    }

    #[test]
    fn window_closes_after_timeline() {
        let conn = setup();
        insert_consent_request(&conn, &request("c1", "d1", 15)).unwrap();
        let approved_at = Utc::now() - Duration::minutes(30);
        approve_consent_request(&conn, "p1", "c1", approved_at).unwrap();

        let decision = check_doctor_access(&conn, "d1", "p1", Utc::now()).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason, AccessReason::ConsentExpired);
    }

    #[test]
    fn consent_is_per_doctor() {
        let conn = setup();
        insert_consent_request(&conn, &request("c1", "d1", 60)).unwrap();
        approve_consent_request(&conn, "p1", "c1", Utc::now()).unwrap();

        assert!(check_doctor_access(&conn, "d1", "p1", Utc::now()).unwrap().allowed);
        assert!(!check_doctor_access(&conn, "d2", "p1", Utc::now()).unwrap().allowed);
    }

    #[test]
    fn latest_expiry_wins() {
        let conn = setup();
        insert_consent_request(&conn, &request("short", "d1", 10)).unwrap();
        insert_consent_request(&conn, &request("long", "d1", 120)).unwrap();
        let now = Utc::now();
        approve_consent_request(&conn, "p1", "short", now).unwrap();
        approve_consent_request(&conn, "p1", "long", now).unwrap();

        let decision = check_doctor_access(&conn, "d1", "p1", now).unwrap();
        match decision.reason {
            AccessReason::ApprovedConsent { consent_id, .. } => assert_eq!(consent_id, "long"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
