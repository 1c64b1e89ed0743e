use serde::Deserialize;

use super::access_rules::AccessRules;
use super::client::{ChatMessage, ChatRequest, LlmClient};
use super::AdvisoryError;
use crate::models::ConsentVerdict;

const CONSENT_TEMPERATURE: f32 = 0.3;
const CONSENT_MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub full_name: String,
    pub license_number: String,
    #[serde(default)]
    pub associated_clinic: Option<String>,
    pub specialization: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

/// Everything the model sees about one access request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentAnalysisInput {
    pub doctor: DoctorProfile,
    pub patient: PatientProfile,
    pub request_details: String,
}

pub fn build_consent_prompt(input: &ConsentAnalysisInput, rules: &AccessRules) -> String {
    let doctor = &input.doctor;
    let clinic = doctor
        .associated_clinic
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("Not provided (assume neutral)");

    format!(
        r#"You are a medical compliance analysis system. Analyze this request and respond in perfect JSON format.

Respond strictly in the following JSON structure:
{{
  "status": "genuine" or "suspicious",
  "confidence": a number between 0 and 100,
  "red_flags": array of strings,
  "reason": short explanation of the decision
}}

--- ANALYSIS RULES ---
1. License Format: 3 letters + 5 numbers (e.g. ABC12345)
{rules}
2. Note: If the clinic is missing or unrecognized, do not penalize the request. Use other factors such as license and specialization.

--- REQUEST DETAILS ---
Doctor:
- Name: {name}
- License: {license}
- Clinic: {clinic}
- Specialization: {specialization}

Patient:
- Name: {patient_name}
- Email: {patient_email}

Purpose: "{purpose}"
"#,
        rules = rules.format_for_prompt(),
        name = doctor.full_name,
        license = doctor.license_number,
        specialization = doctor.specialization,
        patient_name = input.patient.full_name,
        patient_email = input.patient.email,
        purpose = input.request_details,
    )
}

pub fn consent_request(input: &ConsentAnalysisInput, rules: &AccessRules) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::user(build_consent_prompt(input, rules))],
        temperature: CONSENT_TEMPERATURE,
        max_tokens: CONSENT_MAX_TOKENS,
    }
}

/// Cut the JSON object out of a reply that may be wrapped in prose or a code fence.
fn json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse the model's verdict. It must carry a non-empty `status` and a numeric `confidence`.
pub fn parse_verdict(raw: &str) -> Result<ConsentVerdict, AdvisoryError> {
    let invalid = |reason: &str| AdvisoryError::InvalidFormat(reason.to_string());

    let body = json_object(raw).ok_or_else(|| invalid("no JSON object in reply"))?;
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| invalid(&e.to_string()))?;

    let has_status = value
        .get("status")
        .and_then(|s| s.as_str())
        .is_some_and(|s| !s.trim().is_empty());
    if !has_status {
        return Err(invalid("missing status"));
    }
    if !value.get("confidence").is_some_and(|c| c.is_number()) {
        return Err(invalid("confidence is not a number"));
    }

    serde_json::from_value(value).map_err(|e| invalid(&e.to_string()))
}

/// Ask the model to vet one consent request.
pub fn analyze_consent(
    client: &dyn LlmClient,
    rules: &AccessRules,
    input: &ConsentAnalysisInput,
) -> Result<ConsentVerdict, AdvisoryError> {
    let raw = client.complete(&consent_request(input, rules))?;
    let verdict = parse_verdict(&raw).inspect_err(|e| {
        tracing::warn!(error = %e, "unusable consent verdict from model");
    })?;
    tracing::info!(
        model = client.model(),
        status = %verdict.status,
        confidence = verdict.confidence,
        "consent analysed"
    );
    Ok(verdict)
}
