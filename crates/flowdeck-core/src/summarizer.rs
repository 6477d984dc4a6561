//! Text-generation collaborator.
//!
//! The pattern analyzer hands raw session lists to a summarizer and gets
//! back a JSON aggregate. The HTTP implementation talks to an
//! OpenAI-style chat-completions endpoint; replies are returned as raw
//! strings and validated by the caller.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::error::{CoreError, Result};

/// Hard timeout on a summarizer request. A timeout is handled the same
/// way as a malformed reply: the analyzer degrades to an empty
/// aggregate.
pub const SUMMARIZER_TIMEOUT_SECS: u64 = 10;

pub trait Summarizer: Send + Sync {
    /// Send a system + user prompt pair, returning the raw model reply.
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Summarizer for deployments with no completion endpoint configured.
/// Always fails, which the analyzer degrades gracefully.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSummarizer;

impl Summarizer for NullSummarizer {
    fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Err(CoreError::Summarizer("no summarizer configured".to_string()))
    }
}

/// HTTP chat-completions client.
pub struct HttpSummarizer {
    endpoint: Url,
    api_key: String,
    model: String,
    client: Client,
}

impl HttpSummarizer {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| CoreError::InvalidArgument {
            field: "endpoint",
            message: e.to_string(),
        })?;
        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
            client: Client::new(),
        })
    }
}

impl Summarizer for HttpSummarizer {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "response_format": {"type": "json_object"},
        });

        let resp = tokio::runtime::Handle::current()
            .block_on(
                self.client
                    .post(self.endpoint.clone())
                    .bearer_auth(&self.api_key)
                    .timeout(Duration::from_secs(SUMMARIZER_TIMEOUT_SECS))
                    .json(&body)
                    .send(),
            )
            .map_err(|e| CoreError::Summarizer(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(CoreError::Summarizer(format!("HTTP {}", resp.status())));
        }

        let payload: serde_json::Value = tokio::runtime::Handle::current()
            .block_on(resp.json())
            .map_err(|e| CoreError::Summarizer(format!("invalid response body: {e}")))?;

        payload
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or_else(|| CoreError::Summarizer("response missing message content".to_string()))
    }
}
