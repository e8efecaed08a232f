use super::{build_client, ensure_success};
use crate::domain::ports::TextGenerator;
use crate::utils::error::{GreenMeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "Cohere";

pub const DEFAULT_ENDPOINT: &str = "https://api.cohere.ai/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const DEFAULT_TEMPERATURE: f64 = 0.75;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

/// Hosted text generation through Cohere's `/generate` endpoint.
pub struct CohereGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: Option<String>,
    max_tokens: u32,
    temperature: f64,
}

impl CohereGenerator {
    pub fn new(endpoint: &str, api_key: &str, timeout_seconds: u64) -> Self {
        Self {
            client: build_client(timeout_seconds),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f64) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl TextGenerator for CohereGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/generate", self.endpoint);
        let body = GenerateRequest {
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            model: self.model.as_deref(),
        };

        tracing::debug!("Requesting generation from {} ({} prompt chars)", url, prompt.len());
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let text = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GreenMeError::malformed(SERVICE, e.to_string()))?;

        parsed
            .generations
            .into_iter()
            .next()
            .map(|g| g.text.trim().to_string())
            .ok_or_else(|| GreenMeError::malformed(SERVICE, "response contained no generations"))
    }
}
