//! Completion API client (OpenAI-compatible `/chat/completions`)
//!
//! The planner treats the model as a black box that returns JSON matching a
//! schema. No retries, no streaming.

use async_trait::async_trait;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion API error: {0}")]
    Api(String),
    #[error("malformed completion: {0}")]
    Malformed(String),
    #[error("completion API key is not configured")]
    NotConfigured,
}

/// Structured-output completion
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub schema_name: &'a str,
    /// JSON schema the reply must satisfy
    pub schema: &'a Value,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the parsed JSON object produced by the model
    async fn complete_json(&self, request: CompletionRequest<'_>) -> Result<Value, CompletionError>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

fn request_body(model: &str, request: &CompletionRequest<'_>) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": request.schema_name,
                "strict": true,
                "schema": request.schema,
            }
        }
    })
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete_json(&self, request: CompletionRequest<'_>) -> Result<Value, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::NotConfigured)?;

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request_body(&self.model, &request))
            .send()
            .await?;

        let status = resp.status();
        let body: Value = resp.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(CompletionError::Api(message));
        }

        let message = &body["choices"][0]["message"];
        if let Some(refusal) = message["refusal"].as_str() {
            return Err(CompletionError::Api(format!("model refused: {refusal}")));
        }
        let content = message["content"]
            .as_str()
            .ok_or_else(|| CompletionError::Malformed("no message content".into()))?;

        serde_json::from_str(content).map_err(|e| CompletionError::Malformed(e.to_string()))
    }
}
