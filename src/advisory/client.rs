use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AdvisoryError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat-completion backend (allows mocking). Calls block.
pub trait LlmClient: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, AdvisoryError>;

    fn model(&self) -> &str;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint (Together by default).
pub struct TogetherClient {
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl TogetherClient {
    /// Must be called outside an async context: the blocking client owns a runtime.
    pub fn new(
        api_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, AdvisoryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AdvisoryError::HttpClient(e.to_string()))?;

        Ok(Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl LlmClient for TogetherClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, AdvisoryError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AdvisoryError::Connection(self.api_url.clone())
                } else if e.is_timeout() {
                    AdvisoryError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AdvisoryError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "LLM API returned an error");
            return Err(AdvisoryError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AdvisoryError::MalformedResponse("no message content".into()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

enum MockReply {
    Text(String),
    Upstream { status: u16, body: String },
}

/// Mock LLM client for testing: returns a configured reply and records the last request.
pub struct MockLlmClient {
    reply: MockReply,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            reply: MockReply::Text(response.to_string()),
            last_request: Mutex::new(None),
        }
    }

    /// A client whose every call fails with the given upstream status.
    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            reply: MockReply::Upstream {
                status,
                body: body.to_string(),
            },
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, AdvisoryError> {
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Upstream { status, body } => Err(AdvisoryError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
