//! Summarization service client.
//!
//! The summarizer is an external collaborator reached over HTTP
//! (OpenAI-compatible chat completions). Its failure modes never fail an
//! analysis: the caller wraps every invocation in [`bounded`], which turns
//! errors and timeouts into an absent summary.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Documents are truncated to this many characters before being sent out.
const MAX_SUMMARY_INPUT_CHARS: usize = 15_000;

const SUMMARY_MAX_TOKENS: u32 = 512;

const SYSTEM_PROMPT: &str = "You are a careful assistant that explains contracts to ordinary \
     consumers. You summarize in very simple, non-legal language. You are not giving legal \
     advice, only a plain explanation of what the document says.";

#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("summarization request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("summarization service returned a malformed response")]
    MalformedResponse,
}

/// Run a summarization future under a timeout, degrading to `None` on any
/// failure. The report is assembled either way.
pub async fn bounded<F>(timeout_ms: u64, fut: F) -> Option<String>
where
    F: Future<Output = Result<String, SummarizationError>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
        Ok(Ok(summary)) => Some(summary),
        Ok(Err(err)) => {
            warn!(error = %err, "summarization failed; proceeding without summary");
            None
        }
        Err(_) => {
            warn!(timeout_ms, "summarization timed out; proceeding without summary");
            None
        }
    }
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct HttpSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl HttpSummarizer {
    pub fn new(endpoint: String, model: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
            api_key,
        }
    }

    pub async fn summarize(&self, raw_text: &str) -> Result<String, SummarizationError> {
        let truncated: String = raw_text.chars().take(MAX_SUMMARY_INPUT_CHARS).collect();
        let prompt = format!(
            "Summarize the following contract in a few short sentences of very simple language, \
             focusing on anything a customer should check before signing.\n\n{truncated}"
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.1,
            max_tokens: SUMMARY_MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(SummarizationError::MalformedResponse)?;

        let summary = content.trim();
        if summary.is_empty() {
            return Err(SummarizationError::MalformedResponse);
        }
        debug!(chars = summary.len(), "summary received");
        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timeout_degrades_to_absent_summary() {
        let summary = bounded(25, std::future::pending()).await;
        assert_eq!(summary, None);
    }

    #[tokio::test]
    async fn error_degrades_to_absent_summary() {
        let summary = bounded(1_000, async {
            Err(SummarizationError::MalformedResponse)
        })
        .await;
        assert_eq!(summary, None);
    }

    #[tokio::test]
    async fn success_passes_through() {
        let summary = bounded(1_000, async { Ok("all clear".to_string()) }).await;
        assert_eq!(summary.as_deref(), Some("all clear"));
    }
}
