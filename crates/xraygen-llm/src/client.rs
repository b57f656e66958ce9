use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use std::time::Duration;

/// Abstraction over text-generation APIs. Enables testing with mocks.
pub trait LlmBackend {
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Backend for a self-hosted model server speaking `/api/generate`.
///
/// That endpoint has no separate system message, so only the user prompt
/// is sent.
pub struct OllamaBackend {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.into(),
            timeout_secs,
        }
    }
}

impl LlmBackend for OllamaBackend {
    fn complete(&self, _system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "prompt": user,
            "stream": false,
            "format": "json"
        });

        let json = post_json(&self.endpoint, None, &body, self.timeout_secs)?;
        json["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no response field in model server reply"))
    }
}

/// Backend that speaks the OpenAI chat completions protocol.
pub struct OpenAiCompatibleBackend {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs,
        }
    }
}

impl LlmBackend for OpenAiCompatibleBackend {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        });

        let json = post_json(&self.endpoint, Some(&self.api_key), &body, self.timeout_secs)?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("no content in LLM response"))?
            .to_string();
        Ok(content)
    }
}

fn post_json(
    endpoint: &str,
    bearer: Option<&str>,
    body: &Value,
    timeout_secs: u64,
) -> Result<Value> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    let mut request = client
        .post(endpoint)
        .header("Content-Type", "application/json")
        .json(body);
    if let Some(key) = bearer {
        request = request.header("Authorization", format!("Bearer {key}"));
    }

    let resp = request
        .send()
        .with_context(|| format!("LLM API request to {endpoint} failed"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        bail!("LLM API returned {status}: {text}");
    }

    resp.json().context("parse LLM response")
}

/// Mock backend for testing.
pub struct MockLlmBackend {
    pub response: String,
}

impl MockLlmBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl LlmBackend for MockLlmBackend {
    fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Mock backend that always fails.
pub struct FailingLlmBackend;

impl LlmBackend for FailingLlmBackend {
    fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        bail!("LLM backend failed (mock)")
    }
}
