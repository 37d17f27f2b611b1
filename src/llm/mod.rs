// Text generation: one primary remote provider, one local fallback.

mod providers;

pub use providers::{GeminiProvider, OllamaProvider, OpenAiProvider};

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::metrics;

/// Returned instead of calling anything when no credential is configured.
pub const NOT_CONFIGURED_MESSAGE: &str = "AI analysis is unavailable: no API key is configured.";

/// Returned when the primary provider reports an exhausted quota and the
/// local fallback could not answer either.
pub const QUOTA_EXCEEDED_MESSAGE: &str = "\
The daily AI analysis quota has been used up.

Basic review:
- Use the placement, kills, damage and survival time shown for this match to spot what to improve.
- A detailed AI analysis will be available again tomorrow.

Tip: save your quota for the matches that matter most.";

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Reachability check, used before falling back to a provider.
    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str;
}

/// Entry point for prompt completion. Never fails: every error path ends
/// in a human-readable message.
pub struct LlmClient {
    primary: Option<Arc<dyn LlmProvider>>,
    fallback: Option<Arc<dyn LlmProvider>>,
}

impl LlmClient {
    pub fn new(
        primary: Option<Arc<dyn LlmProvider>>,
        fallback: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        LlmClient { primary, fallback }
    }

    /// Gemini when its key is set, else OpenAI, else unconfigured. The local
    /// Ollama fallback is always attached.
    pub fn from_config(config: &LlmConfig) -> Self {
        let primary: Option<Arc<dyn LlmProvider>> = if let Some(key) = &config.gemini_api_key {
            tracing::info!("Using Gemini ({}) for analysis", config.gemini_model);
            Some(Arc::new(GeminiProvider::new(key.clone(), config.gemini_model.clone())))
        } else if let Some(key) = &config.openai_api_key {
            tracing::info!("Using OpenAI ({}) for analysis", config.openai_model);
            Some(Arc::new(OpenAiProvider::new(key.clone(), config.openai_model.clone())))
        } else {
            tracing::warn!("GEMINI_API_KEY and OPENAI_API_KEY not set, AI analysis disabled");
            None
        };

        LlmClient {
            primary,
            fallback: Some(Arc::new(OllamaProvider::local())),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.primary.is_some()
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.primary.as_ref().map(|p| p.name())
    }

    pub async fn generate(&self, prompt: &str) -> String {
        let Some(primary) = &self.primary else {
            return NOT_CONFIGURED_MESSAGE.to_string();
        };

        let primary_err = match call(primary.as_ref(), prompt).await {
            Ok(text) => return text,
            Err(e) => e,
        };
        tracing::warn!("{} failed: {primary_err}", primary.name());

        if let Some(fallback) = &self.fallback {
            if fallback.is_available().await {
                tracing::info!("Falling back to {}", fallback.name());
                match call(fallback.as_ref(), prompt).await {
                    Ok(text) => return text,
                    Err(e) => tracing::warn!("{} failed: {e}", fallback.name()),
                }
            }
        }

        if is_quota_error(&primary_err) {
            QUOTA_EXCEEDED_MESSAGE.to_string()
        } else {
            format!("AI analysis request failed: {primary_err}")
        }
    }
}

async fn call(provider: &dyn LlmProvider, prompt: &str) -> Result<String, LlmError> {
    let start = Instant::now();
    let result = provider.complete(prompt).await;
    let outcome = if result.is_ok() { "ok" } else { "error" };
    metrics::LLM_REQUESTS_TOTAL
        .with_label_values(&[provider.name(), outcome])
        .inc();
    metrics::LLM_REQUEST_DURATION_SECONDS
        .with_label_values(&[provider.name()])
        .observe(start.elapsed().as_secs_f64());
    tracing::debug!(
        "{} answered {} prompt chars in {:.2}s",
        provider.name(),
        prompt.len(),
        start.elapsed().as_secs_f64()
    );
    result.map(|text| text.trim().to_string())
}

/// Rate-limit and quota rejections carry a 429 status or mention the quota.
fn is_quota_error(err: &LlmError) -> bool {
    let msg = err.to_string();
    msg.contains("429") || msg.to_lowercase().contains("quota")
}
