//! Generative-text backend used to write the digest.
//!
//! The module uses a small trait seam so the composer does not care which
//! model answers:
//! - [`AskAsync`]: Core trait defining async prompt -> text interaction
//! - [`GeminiClient`]: Google Generative Language `generateContent` client
//!
//! There is exactly one attempt per run. A failure is returned to the caller,
//! which falls back to a deterministic digest.

use crate::error::DigestError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a model and return its text.
pub trait AskAsync {
    /// Send `prompt` to the model and receive its answer.
    async fn ask(&self, prompt: &str) -> Result<String, DigestError>;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, api_base: String) -> Result<Self, DigestError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, joined.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

impl AskAsync for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String, DigestError> {
        let t0 = Instant::now();
        let url = self.endpoint();
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis(),
                %status,
                "Gemini call failed"
            );
            return Err(DigestError::Status {
                url,
                status,
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed.into_text().ok_or(DigestError::EmptyResponse)?;
        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            bytes = text.len(),
            preview = %truncate_for_log(&text, 120),
            "Gemini answered"
        );
        Ok(text)
    }
}
