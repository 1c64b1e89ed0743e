use serde::Deserialize;

use super::client::{ChatMessage, ChatRequest};
use crate::models::VaccineRecord;

const INSIGHTS_SYSTEM: &str = "\
You are a health advisor for Indian users. Read the given health report(s), and provide:

1. A clear summary of key findings (like deficiencies, test issues).
2. Medical concerns or trends across all reports.
3. Personalized suggestions including:
   - Modern medical guidance
   - Ayurvedic remedies
   - Home-made nuskhe
   - Lifestyle & diet changes
4. Progress tracking if previous reports are available.
5. Warnings if anything is risky or worsening.

Be clear, accurate, and culturally relevant to Indian context. Prefer natural treatments when safe.";

const PREVENTIVE_SYSTEM: &str = "\
You are a health advisor for Indian users who focuses strictly on preventive healthcare.

Your job is:
- Read the given health report(s).
- Based ONLY on the health context, provide preventive measures and actionable recommendations.

Structure your reply in these sections (with headings):

1. **Preventive Measures**
   - Give 4-5 crisp preventive steps relevant to the user's health concerns.
   - Keep each point short, clear, and practical for Indian users.

2. **Ayurvedic Remedies / Cures**
   - Suggest 3 safe Ayurvedic herbs or remedies helpful for the findings.
   - Mention any precautions if needed.
   - Use short one-liners, no long paragraphs.

3. **Home Remedies**
   - Recommend 3 simple home-based solutions suitable for Indian households.
   - Keep each suggestion in one line.

4. **Lifestyle and Diet Plan**
   - Give 3-4 quick lifestyle tips (exercise, sleep, stress).
   - Briefly list:
     - foods to eat
     - foods to avoid
     - simple meal planning tips
   - Keep each point short and direct.

5. **Daily Health Goals**
   - Summarize everything into 5 short daily health goals users can easily follow.

Additional guidelines:
- Use simple, easy-to-understand language.
- Prefer one-liners over paragraphs.
- Focus on safe, practical, culturally relevant advice.
- Prefer natural methods where safe, but don't ignore medical realities.
- Do NOT repeat the health report text back; focus only on preventive guidance.";

const VACCINE_SYSTEM: &str = "\
You are a Vaccine Advisor for Indian users. Given a user's vaccine history and a question, provide:

1. Helpful, clear, accurate advice about vaccines.
2. Culturally relevant tips (Indian context).
3. If possible, suggest:
   - Next vaccine doses (e.g., boosters, missed)
   - Post-care instructions
   - Ayurveda or home remedies (only if safe)
4. Warn if anything is overdue or high-risk.

Keep the tone friendly, reassuring, and informative.";

const ADVICE_TEMPERATURE: f32 = 0.6;
const INSIGHTS_MAX_TOKENS: u32 = 700;
const PREVENTIVE_MAX_TOKENS: u32 = 800;
const VACCINE_MAX_TOKENS: u32 = 600;

/// Latest report text, preceded by earlier reports when there are any.
pub fn history_block(text: &str, history: &[String]) -> String {
    if history.is_empty() {
        text.to_string()
    } else {
        format!(
            "Previous Reports:\n{}\n\nLatest Report:\n{text}",
            history.join("\n\n")
        )
    }
}

pub fn insights_request(text: &str, history: &[String]) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(INSIGHTS_SYSTEM),
            ChatMessage::user(history_block(text, history)),
        ],
        temperature: ADVICE_TEMPERATURE,
        max_tokens: INSIGHTS_MAX_TOKENS,
    }
}

pub fn preventive_request(text: &str, history: &[String]) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(PREVENTIVE_SYSTEM),
            ChatMessage::user(history_block(text, history)),
        ],
        temperature: ADVICE_TEMPERATURE,
        max_tokens: PREVENTIVE_MAX_TOKENS,
    }
}

/// A vaccine as sent by the client for the advisor prompt.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaccineEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub vaccine_type: String,
    pub date: String,
    pub next_dose: Option<String>,
    pub notes: Option<String>,
}

impl From<&VaccineRecord> for VaccineEntry {
    fn from(v: &VaccineRecord) -> Self {
        Self {
            name: v.name.clone(),
            vaccine_type: v.vaccine_type.clone(),
            date: v.date.to_string(),
            next_dose: v.next_dose.map(|d| d.to_string()),
            notes: v.notes.clone(),
        }
    }
}

fn vaccine_history(vaccines: &[VaccineEntry]) -> String {
    if vaccines.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = vaccines
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let next = v.next_dose.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");
            let notes = v.notes.as_deref().filter(|s| !s.is_empty()).unwrap_or("None");
            format!(
                "{}. {} | {} | Taken: {} | Next dose: {next} | Notes: {notes}",
                i + 1,
                v.name,
                v.vaccine_type,
                v.date
            )
        })
        .collect();
    format!("Here is the user's vaccine history:\n{}\n\n", lines.join("\n"))
}

pub fn vaccine_request(question: &str, vaccines: &[VaccineEntry]) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(VACCINE_SYSTEM),
            ChatMessage::user(format!("{}Question: {question}", vaccine_history(vaccines))),
        ],
        temperature: ADVICE_TEMPERATURE,
        max_tokens: VACCINE_MAX_TOKENS,
    }
}
