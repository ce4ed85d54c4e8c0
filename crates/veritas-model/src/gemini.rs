//! Google Gemini client.
//!
//! Speaks the `generateContent` REST endpoint and returns the text of the
//! first candidate. No retries: a failed call is reported to the caller, who
//! may simply try again.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Model, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
  /// `None` or empty means every call fails with [`Error::MissingApiKey`].
  pub api_key:           Option<String>,
  pub model:             String,
  pub base_url:          String,
  pub timeout:           Duration,
  pub temperature:       Option<f32>,
  pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
  fn default() -> Self {
    Self {
      api_key:           None,
      model:             DEFAULT_MODEL.to_string(),
      base_url:          DEFAULT_BASE_URL.to_string(),
      timeout:           Duration::from_secs(60),
      temperature:       Some(0.2),
      max_output_tokens: Some(1024),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
  contents:          Vec<Content<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
  parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature:       Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
  #[serde(default)]
  candidates:     Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
  #[serde(default)]
  content:       Option<CandidateContent>,
  #[serde(default)]
  finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)]
  prompt_token_count:     Option<u32>,
  #[serde(default)]
  candidates_token_count: Option<u32>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the Gemini `generateContent` API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct GeminiClient {
  client: Client,
  config: GeminiConfig,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn api_key(&self) -> Option<&str> {
    self.config.api_key.as_deref().filter(|k| !k.trim().is_empty())
  }

  fn endpoint(&self) -> String {
    format!(
      "{}/models/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.model
    )
  }
}

impl Model for GeminiClient {
  fn name(&self) -> &str { &self.config.model }

  fn is_configured(&self) -> bool { self.api_key().is_some() }

  async fn generate(&self, prompt: &str) -> Result<String> {
    let api_key = self.api_key().ok_or(Error::MissingApiKey)?;

    let body = GenerateRequest {
      contents:          vec![Content { parts: vec![Part { text: prompt }] }],
      generation_config: Some(GenerationConfig {
        temperature:       self.config.temperature,
        max_output_tokens: self.config.max_output_tokens,
      }),
    };

    let url = self.endpoint();
    tracing::debug!(%url, "sending generateContent request");

    let resp = self
      .client
      .post(&url)
      .header("x-goog-api-key", api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(%status, "model API returned an error");
      return Err(Error::Api { status: status.as_u16(), body });
    }

    let parsed: GenerateResponse = resp.json().await?;

    if let Some(usage) = &parsed.usage_metadata {
      tracing::info!(
        prompt_tokens = ?usage.prompt_token_count,
        reply_tokens = ?usage.candidates_token_count,
        "model usage"
      );
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
      return Err(Error::EmptyReply);
    };
    if let Some(reason) = &candidate.finish_reason {
      tracing::debug!(finish_reason = %reason, "candidate finished");
    }

    let text: String = candidate
      .content
      .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
      .unwrap_or_default();

    if text.trim().is_empty() {
      return Err(Error::EmptyReply);
    }
    Ok(text)
  }
}
