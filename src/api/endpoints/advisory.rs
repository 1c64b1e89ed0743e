//! LLM-backed advisory endpoints.
//!
//! - `POST /analyze/consent-analysis` (alias `/analyze`): vet a doctor's access request
//! - `POST /api/insights`: summary of one or more reports
//! - `POST /api/preventive-advice`: preventive guidance from the same input
//! - `POST /api/vaccine-advisor`: question answering over a vaccine history
//!
//! One call per request, never retried.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::advisory::consent::{analyze_consent, ConsentAnalysisInput};
use crate::advisory::prompt::{insights_request, preventive_request, vaccine_request, VaccineEntry};
use crate::api::error::{ApiError, ANALYSIS_CONTEXT};
use crate::api::types::{required, ApiContext};
use crate::db::repository::list_vaccines;
use crate::models::ConsentVerdict;

/// `POST /analyze/consent-analysis`
pub async fn consent_analysis(
    State(ctx): State<ApiContext>,
    body: Result<Json<ConsentAnalysisInput>, JsonRejection>,
) -> Result<Json<ConsentVerdict>, ApiError> {
    let Json(input) = body?;
    let verdict = ctx
        .blocking(move |core| {
            analyze_consent(core.llm(), core.access_rules(), &input)
                .map_err(|e| ApiError::advisory(e, ANALYSIS_CONTEXT))
        })
        .await?;
    Ok(Json(verdict))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportTextRequest {
    pub text: Option<String>,
    pub report_history: Vec<String>,
}

#[derive(Serialize)]
pub struct InsightsResponse {
    pub summary: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreventiveAdviceResponse {
    pub preventive_advice: String,
}

/// `POST /api/insights`
pub async fn insights(
    State(ctx): State<ApiContext>,
    body: Result<Json<ReportTextRequest>, JsonRejection>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let Json(req) = body?;
    let text = required(req.text.as_deref(), "Text is required")?.to_string();
    let request = insights_request(&text, &req.report_history);

    let summary = ctx
        .blocking(move |core| Ok(core.llm().complete(&request)?))
        .await?;
    Ok(Json(InsightsResponse { summary }))
}

/// `POST /api/preventive-advice`
pub async fn preventive_advice(
    State(ctx): State<ApiContext>,
    body: Result<Json<ReportTextRequest>, JsonRejection>,
) -> Result<Json<PreventiveAdviceResponse>, ApiError> {
    let Json(req) = body?;
    let text = required(req.text.as_deref(), "Text is required")?.to_string();
    let request = preventive_request(&text, &req.report_history);

    let preventive_advice = ctx
        .blocking(move |core| Ok(core.llm().complete(&request)?))
        .await?;
    Ok(Json(PreventiveAdviceResponse { preventive_advice }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaccineAdvisorRequest {
    pub question: Option<String>,
    pub vaccines: Vec<VaccineEntry>,
    /// When set and `vaccines` is empty, the stored history is used.
    pub patient_id: Option<String>,
}

#[derive(Serialize)]
pub struct VaccineAdvisorResponse {
    pub answer: String,
}

/// `POST /api/vaccine-advisor`
pub async fn vaccine_advisor(
    State(ctx): State<ApiContext>,
    body: Result<Json<VaccineAdvisorRequest>, JsonRejection>,
) -> Result<Json<VaccineAdvisorResponse>, ApiError> {
    let Json(req) = body?;
    let question = required(req.question.as_deref(), "Question is required")?.to_string();

    let answer = ctx
        .blocking(move |core| {
            let vaccines = match (&req.patient_id, req.vaccines.is_empty()) {
                (Some(patient_id), true) => {
                    let conn = core.open_db()?;
                    list_vaccines(&conn, patient_id)?
                        .iter()
                        .map(VaccineEntry::from)
                        .collect()
                }
                _ => req.vaccines,
            };
            Ok(core.llm().complete(&vaccine_request(&question, &vaccines))?)
        })
        .await?;
    Ok(Json(VaccineAdvisorResponse { answer }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::advisory::MockLlmClient;
    use crate::api::router::test_support::{send, test_app};
    use crate::db::repository::fixtures::seed_patient;
    use crate::db::repository::insert_vaccine;
    use crate::models::VaccineRecord;

    fn consent_body() -> serde_json::Value {
        json!({
            "doctor": {
                "fullName": "Dr. Mehta",
                "licenseNumber": "MED12345",
                "specialization": "Cardiologist"
            },
            "patient": {"fullName": "Asha Rao", "email": "asha@example.com"},
            "requestDetails": "Pre-surgery cardiac review"
        })
    }

    #[tokio::test]
    async fn consent_analysis_returns_verdict() {
        let mock = Arc::new(MockLlmClient::new(
            "```json\n{\"status\":\"genuine\",\"confidence\":91,\"red_flags\":[],\"reason\":\"valid license\"}\n```",
        ));
        let (app, _core, _dir) = test_app(mock.clone());

        let (status, json) = send(&app, "POST", "/analyze/consent-analysis", Some(consent_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "genuine");
        assert_eq!(json["confidence"], 91.0);
        assert_eq!(json["red_flags"], json!([]));

        let (status, _) = send(&app, "POST", "/analyze", Some(consent_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mock.last_request().unwrap().max_tokens, 500);
    }

    #[tokio::test]
    async fn consent_verdict_without_numeric_confidence_is_invalid_format() {
        let mock = Arc::new(MockLlmClient::new(r#"{"status":"genuine","confidence":"very"}"#));
        let (app, _core, _dir) = test_app(mock);

        let (status, json) = send(&app, "POST", "/analyze", Some(consent_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({"error": "Invalid AI response format"}));
    }

    #[tokio::test]
    async fn consent_upstream_failure_reports_analysis_failed() {
        let mock = Arc::new(MockLlmClient::failing(503, r#"{"error":"overloaded"}"#));
        let (app, _core, _dir) = test_app(mock);

        let (status, json) = send(&app, "POST", "/analyze", Some(consent_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Analysis failed");
        assert_eq!(json["details"]["error"], "overloaded");
    }

    #[tokio::test]
    async fn consent_analysis_rejects_missing_fields() {
        let (app, _core, _dir) = test_app(Arc::new(MockLlmClient::new("{}")));
        let (status, json) = send(&app, "POST", "/analyze", Some(json!({"doctor": {}}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn insights_requires_text() {
        let (app, _core, _dir) = test_app(Arc::new(MockLlmClient::new("summary")));

        let (status, json) = send(&app, "POST", "/api/insights", Some(json!({"text": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "Text is required"}));

        let (status, _) = send(&app, "POST", "/api/preventive-advice", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn insights_includes_history() {
        let mock = Arc::new(MockLlmClient::new("Your HbA1c is borderline."));
        let (app, _core, _dir) = test_app(mock.clone());

        let (status, json) = send(
            &app,
            "POST",
            "/api/insights",
            Some(json!({"text": "HbA1c 6.1", "reportHistory": ["HbA1c 5.8"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"summary": "Your HbA1c is borderline."}));

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.max_tokens, 700);
        assert_eq!(
            sent.messages[1].content,
            "Previous Reports:\nHbA1c 5.8\n\nLatest Report:\nHbA1c 6.1"
        );
    }

    #[tokio::test]
    async fn preventive_advice_key_and_upstream_error() {
        let (app, _core, _dir) = test_app(Arc::new(MockLlmClient::new("Walk daily.")));
        let (status, json) =
            send(&app, "POST", "/api/preventive-advice", Some(json!({"text": "LDL 160"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["preventiveAdvice"], "Walk daily.");

        let (app, _core, _dir) = test_app(Arc::new(MockLlmClient::failing(401, "bad key")));
        let (status, json) =
            send(&app, "POST", "/api/preventive-advice", Some(json!({"text": "LDL 160"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Together API Error");
        assert_eq!(json["details"], "bad key");
    }

    #[tokio::test]
    async fn vaccine_advisor_uses_sent_or_stored_history() {
        let mock = Arc::new(MockLlmClient::new("Take your booster."));
        let (app, core, _dir) = test_app(mock.clone());

        let (status, json) = send(&app, "POST", "/api/vaccine-advisor", Some(json!({"question": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Question is required");

        let (status, json) = send(
            &app,
            "POST",
            "/api/vaccine-advisor",
            Some(json!({
                "question": "Do I need a booster?",
                "vaccines": [{"name": "Tetanus", "type": "TT", "date": "2019-05-01"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["answer"], "Take your booster.");
        assert!(mock.last_request().unwrap().messages[1].content.contains("1. Tetanus | TT"));

        {
            let conn = core.open_db().unwrap();
            seed_patient(&conn, "p1");
            insert_vaccine(
                &conn,
                &VaccineRecord {
                    id: "v1".into(),
                    patient_id: "p1".into(),
                    name: "Hepatitis B".into(),
                    vaccine_type: "Dose 2".into(),
                    date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    next_dose: None,
                    notes: None,
                    certificate_url: None,
                    taken: true,
                    created_at: chrono::Utc::now(),
                },
            )
            .unwrap();
        }
        let (status, _) = send(
            &app,
            "POST",
            "/api/vaccine-advisor",
            Some(json!({"question": "What next?", "patientId": "p1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let sent = mock.last_request().unwrap();
        assert!(sent.messages[1].content.contains("1. Hepatitis B | Dose 2 | Taken: 2024-03-01"));
        assert_eq!(sent.max_tokens, 600);
    }
}
