use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};
use std::time::Duration;

use super::analysis_errors::{AnalysisError, Result};

/// Options for one inference call. The orchestrator always requests
/// deterministic, structured output.
#[derive(Debug, Clone)]
pub struct InferenceOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub structured_json: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 1500,
            structured_json: true,
        }
    }
}

/// The inference collaborator: a black-box structured completion call.
#[async_trait]
pub trait InferenceProviderTrait: Send + Sync {
    async fn infer(&self, prompt: &str, options: &InferenceOptions) -> Result<Value>;
}

/// The embedding collaborator: text to a fixed-length vector.
#[async_trait]
pub trait EmbeddingProviderTrait: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

// ============================================================================
// OpenAI-compatible HTTP provider
// ============================================================================

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub embedding_model: String,
    pub request_timeout: Duration,
}

impl OpenAiCompatibleConfig {
    pub fn new(base_url: &str, api_key: &str, model: &str, embedding_model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            embedding_model: embedding_model.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Chat-completions-shaped client usable against any OpenAI-compatible
/// backend (hosted or local).
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    config: OpenAiCompatibleConfig,
    system_prompt: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatibleConfig, system_prompt: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            system_prompt: system_prompt.to_string(),
        })
    }
}

#[async_trait]
impl InferenceProviderTrait for OpenAiCompatibleProvider {
    async fn infer(&self, prompt: &str, options: &InferenceOptions) -> Result<Value> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let mut body = json!({
            "model": self.config.model,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": prompt },
            ],
        });
        if options.structured_json {
            body["response_format"] = json!({ "type": "json_object" });
        }

        debug!("Inference call to {} ({})", url, self.config.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalysisError::InferenceError(format!(
                "backend returned {}: {}",
                status, detail
            )));
        }

        let payload: Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AnalysisError::InferenceError("response missing message content".to_string())
            })?;

        serde_json::from_str(content).map_err(|e| {
            AnalysisError::InferenceError(format!("content is not valid JSON: {}", e))
        })
    }
}

#[async_trait]
impl EmbeddingProviderTrait for OpenAiCompatibleProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.config.base_url);
        let body = json!({
            "model": self.config.embedding_model,
            "input": text,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalysisError::EmbeddingError(format!(
                "backend returned {}: {}",
                status, detail
            )));
        }

        let payload: Value = response.json().await?;
        let vector = payload["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| {
                AnalysisError::EmbeddingError("response missing embedding vector".to_string())
            })?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        Ok(vector)
    }
}
