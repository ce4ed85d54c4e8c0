//! Async HTTP client wrapping the Veritas JSON API.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use veritas_core::{
  export::ExportFormat,
  history::HistoryPage,
  record::{AnalysisRecord, Source, Verdict},
  session::{Session, Settings},
  stats::DashboardStats,
  text::TextStats,
};

/// Connection settings for the Veritas API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// `GET /api/health`
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
  pub model:              String,
  pub api_key_configured: bool,
}

/// Text extracted by the server, shown before analysis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Preview {
  pub text:   String,
  pub source: Source,
  #[serde(default)]
  pub title:  Option<String>,
  pub stats:  TextStats,
}

/// A non-success response, with the server's error label and (for model
/// failures) the raw reply.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{error} (HTTP {status})")]
pub struct ApiFailure {
  pub status: u16,
  pub error:  String,
  pub raw:    Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
  #[serde(default)]
  raw:   Option<String>,
}

#[derive(Serialize)]
struct AnalyzeBody<'a> {
  text:   &'a str,
  source: &'a Source,
}

#[derive(Deserialize)]
struct Cleared {
  removed: usize,
}

/// Async HTTP client for the Veritas JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    // Analyses wait on the model; leave room beyond its own timeout.
    let client = Client::builder()
      .timeout(Duration::from_secs(120))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req`; non-2xx responses become an [`ApiFailure`].
  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;

    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let (error, raw) = match serde_json::from_str::<ErrorBody>(&text) {
      Ok(body) => (body.error, body.raw),
      Err(_) if text.is_empty() => (status.to_string(), None),
      Err(_) => (text, None),
    };
    tracing::debug!(%status, %error, "{what} rejected");
    Err(ApiFailure { status: status.as_u16(), error, raw }.into())
  }

  // ── Server ────────────────────────────────────────────────────────────────

  /// `GET /api/health`
  pub async fn health(&self) -> Result<Health> {
    let resp = self.send(self.client.get(self.url("/health")), "GET /health").await?;
    resp.json().await.context("deserialising health")
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// `POST /api/sessions`
  pub async fn create_session(&self, settings: Settings) -> Result<Session> {
    let req = self.client.post(self.url("/sessions")).json(&settings);
    let resp = self.send(req, "POST /sessions").await?;
    resp.json().await.context("deserialising session")
  }

  /// `PUT /api/sessions/:id/settings`
  pub async fn update_settings(&self, id: Uuid, settings: Settings) -> Result<Session> {
    let req = self
      .client
      .put(self.url(&format!("/sessions/{id}/settings")))
      .json(&settings);
    let resp = self.send(req, "PUT /sessions/:id/settings").await?;
    resp.json().await.context("deserialising session")
  }

  /// `DELETE /api/sessions/:id`
  pub async fn end_session(&self, id: Uuid) -> Result<()> {
    let req = self.client.delete(self.url(&format!("/sessions/{id}")));
    self.send(req, "DELETE /sessions/:id").await?;
    Ok(())
  }

  // ── Input ─────────────────────────────────────────────────────────────────

  /// `POST /api/extract` for a web page.
  pub async fn extract_url(&self, url: &str) -> Result<Preview> {
    let req = self
      .client
      .post(self.url("/extract"))
      .json(&json!({ "kind": "url", "url": url }));
    let resp = self.send(req, "POST /extract").await?;
    resp.json().await.context("deserialising preview")
  }

  /// `POST /api/extract/pdf?filename=<name>`
  pub async fn extract_pdf(&self, bytes: Vec<u8>, filename: &str) -> Result<Preview> {
    let req = self
      .client
      .post(self.url("/extract/pdf"))
      .query(&[("filename", filename)])
      .header(header::CONTENT_TYPE, "application/pdf")
      .body(bytes);
    let resp = self.send(req, "POST /extract/pdf").await?;
    resp.json().await.context("deserialising preview")
  }

  // ── Analyses ──────────────────────────────────────────────────────────────

  /// `POST /api/sessions/:id/analyses`
  pub async fn analyze(&self, id: Uuid, text: &str, source: &Source) -> Result<AnalysisRecord> {
    let req = self
      .client
      .post(self.url(&format!("/sessions/{id}/analyses")))
      .json(&AnalyzeBody { text, source });
    let resp = self.send(req, "POST /sessions/:id/analyses").await?;
    resp.json().await.context("deserialising analysis")
  }

  /// `GET /api/sessions/:id/analyses[?verdict=<v>&search=<term>]`
  pub async fn list(
    &self,
    id: Uuid,
    verdict: Option<Verdict>,
    search: &str,
  ) -> Result<HistoryPage> {
    let mut params: Vec<(&str, String)> = Vec::new();
    if let Some(v) = verdict {
      params.push(("verdict", v.to_string()));
    }
    if !search.trim().is_empty() {
      params.push(("search", search.to_string()));
    }
    let req = self
      .client
      .get(self.url(&format!("/sessions/{id}/analyses")))
      .query(&params);
    let resp = self.send(req, "GET /sessions/:id/analyses").await?;
    resp.json().await.context("deserialising history")
  }

  /// `DELETE /api/sessions/:id/analyses/:record_id`
  pub async fn delete_record(&self, id: Uuid, record_id: Uuid) -> Result<()> {
    let req = self
      .client
      .delete(self.url(&format!("/sessions/{id}/analyses/{record_id}")));
    self.send(req, "DELETE /sessions/:id/analyses/:record_id").await?;
    Ok(())
  }

  /// `DELETE /api/sessions/:id/analyses`: returns how many were removed.
  pub async fn clear(&self, id: Uuid) -> Result<usize> {
    let req = self
      .client
      .delete(self.url(&format!("/sessions/{id}/analyses")));
    let resp = self.send(req, "DELETE /sessions/:id/analyses").await?;
    let cleared: Cleared = resp.json().await.context("deserialising clear result")?;
    Ok(cleared.removed)
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  /// `GET /api/sessions/:id/stats`
  pub async fn stats(&self, id: Uuid) -> Result<DashboardStats> {
    let req = self.client.get(self.url(&format!("/sessions/{id}/stats")));
    let resp = self.send(req, "GET /sessions/:id/stats").await?;
    resp.json().await.context("deserialising stats")
  }

  /// `GET /api/sessions/:id/export?format=<f>`: returns `(file name, body)`.
  pub async fn export(&self, id: Uuid, format: ExportFormat) -> Result<(String, String)> {
    let req = self
      .client
      .get(self.url(&format!("/sessions/{id}/export")))
      .query(&[("format", format.to_string())]);
    let resp = self.send(req, "GET /sessions/:id/export").await?;

    let file_name = resp
      .headers()
      .get(header::CONTENT_DISPOSITION)
      .and_then(|v| v.to_str().ok())
      .and_then(attachment_name)
      .unwrap_or_else(|| format.file_name(Utc::now()));
    let body = resp.text().await.context("reading export body")?;
    Ok((file_name, body))
  }
}

/// The `filename="…"` part of a `Content-Disposition` header. Only a bare
/// file name is accepted.
fn attachment_name(disposition: &str) -> Option<String> {
  let name = disposition
    .split(';')
    .map(str::trim)
    .find_map(|part| part.strip_prefix("filename="))?
    .trim_matches('"');
  let bare = !name.is_empty() && !name.contains(['/', '\\']) && name != "..";
  bare.then(|| name.to_string())
}
