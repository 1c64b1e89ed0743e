//! LLM-backed advisory features: consent vetting, report summaries,
//! preventive advice and vaccine Q&A.

pub mod access_rules;
pub mod client;
pub mod consent;
pub mod prompt;

pub use access_rules::AccessRules;
pub use client::{ChatMessage, ChatRequest, LlmClient, MockLlmClient, TogetherClient};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("LLM API unreachable at {0}")]
    Connection(String),

    #[error("LLM API returned error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Empty or malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("Invalid AI response format: {0}")]
    InvalidFormat(String),

    #[error("Failed to load access rules from {source_name}: {reason}")]
    AccessRules { source_name: String, reason: String },
}
