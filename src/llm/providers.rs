// HTTP-backed text generation providers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::LlmProvider;
use crate::analysis::prompt::SYSTEM_INSTRUCTION;
use crate::error::LlmError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const OLLAMA_LOCAL_URL: &str = "http://localhost:11434";
const OLLAMA_MODEL: &str = "qwen2:0.5b";
const OLLAMA_TIMEOUT: Duration = Duration::from_secs(30);

const OPENAI_MAX_TOKENS: u32 = 1500;
const OPENAI_TEMPERATURE: f64 = 0.7;

/// Turn a non-2xx response into `LlmError::Status`, otherwise parse JSON.
async fn read_json(provider: &'static str, response: reqwest::Response) -> Result<Value, LlmError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

fn non_empty(provider: &'static str, text: Option<&str>) -> Result<String, LlmError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        _ => Err(LlmError::EmptyResponse(provider)),
    }
}

// Gemini Provider
pub struct GeminiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let json = read_json(self.name(), response).await?;

        non_empty(
            self.name(),
            json.pointer("/candidates/0/content/parts/0/text")
                .and_then(Value::as_str),
        )
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

// OpenAI Provider
pub struct OpenAiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": OPENAI_MAX_TOKENS,
            "temperature": OPENAI_TEMPERATURE,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let json = read_json(self.name(), response).await?;

        non_empty(self.name(), json["choices"][0]["message"]["content"].as_str())
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }
}

// Ollama Provider (Local)
pub struct OllamaProvider {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// The fixed local fallback at `localhost:11434`.
    pub fn local() -> Self {
        Self::new(OLLAMA_LOCAL_URL)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(OLLAMA_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Could not build Ollama client with timeout: {e}");
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: base_url.into(),
            model: OLLAMA_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;
        let json = read_json(self.name(), response).await?;

        non_empty(self.name(), json["response"].as_str())
    }

    async fn is_available(&self) -> bool {
        match self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Ollama reachability check failed: {e}");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "Ollama"
    }
}
