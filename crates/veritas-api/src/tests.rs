//! Router-level tests against [`MemoryStore`] and a scripted model.

use std::{
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use veritas_core::{export::from_json, store::SessionStore as _};
use veritas_ingest::Ingestor;
use veritas_model::Model;
use veritas_store_memory::MemoryStore;

use crate::{
  ApiState, AuthConfig, api_router,
  auth::tests::{auth_config, basic},
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

const FAKE: &str = r#"{"verdict":"Fake","reason":"No such study exists","credibility_score":8}"#;
const REAL: &str = r#"Here you go: {"verdict":"Real","reason":"Confirmed by the ministry","credibility_score":91}"#;

/// Replies with each scripted string in turn, cycling; `None` acts like a
/// model without an API key.
struct Scripted {
  replies: Option<Vec<&'static str>>,
  calls:   AtomicUsize,
  delay:   Duration,
}

impl Scripted {
  fn new(replies: &[&'static str]) -> Self {
    Self {
      replies: Some(replies.to_vec()),
      calls:   AtomicUsize::new(0),
      delay:   Duration::ZERO,
    }
  }

  fn unconfigured() -> Self {
    Self { replies: None, calls: AtomicUsize::new(0), delay: Duration::ZERO }
  }

  /// Waits `delay` before every reply.
  fn slow(replies: &[&'static str], delay: Duration) -> Self {
    Self { delay, ..Self::new(replies) }
  }

  fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl Model for Scripted {
  fn name(&self) -> &str { "scripted-model" }

  fn is_configured(&self) -> bool { self.replies.is_some() }

  async fn generate(&self, _prompt: &str) -> veritas_model::Result<String> {
    let replies = self
      .replies
      .as_ref()
      .ok_or(veritas_model::Error::MissingApiKey)?;
    let n = self.calls.fetch_add(1, Ordering::SeqCst);
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    Ok(replies[n % replies.len()].to_string())
  }
}

struct Harness {
  store: MemoryStore,
  state: ApiState<MemoryStore, Scripted>,
  auth:  Option<AuthConfig>,
}

impl Harness {
  fn new(model: Scripted) -> Self {
    let store = MemoryStore::new();
    let state = ApiState {
      store:    Arc::new(store.clone()),
      model:    Arc::new(model),
      ingestor: Ingestor::new(Duration::from_secs(5)).unwrap(),
    };
    Self { store, state, auth: None }
  }

  async fn send(&self, req: Request<Body>) -> Response {
    api_router(self.state.clone(), self.auth.clone())
      .oneshot(req)
      .await
      .unwrap()
  }

  async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string())),
      None => builder.body(Body::empty()),
    }
    .unwrap();

    let resp = self.send(req).await;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::String(
        String::from_utf8_lossy(&bytes).into_owned(),
      ))
    };
    (status, value)
  }

  async fn open_session(&self) -> String {
    let (status, session) = self.call("POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    session["session_id"].as_str().unwrap().to_string()
  }

  async fn analyze(&self, sid: &str, text: &str) -> (StatusCode, Value) {
    self
      .call("POST", &format!("/sessions/{sid}/analyses"), Some(json!({ "text": text })))
      .await
  }
}

// ─── Health and sessions ─────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_model() {
  let h = Harness::new(Scripted::unconfigured());
  let (status, body) = h.call("GET", "/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["model"], "scripted-model");
  assert_eq!(body["api_key_configured"], false);
}

#[tokio::test]
async fn session_lifecycle() {
  let h = Harness::new(Scripted::new(&[FAKE]));
  let (status, session) = h
    .call("POST", "/sessions", Some(json!({ "language": "Hindi" })))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(session["settings"]["language"], "Hindi");
  let sid = session["session_id"].as_str().unwrap();

  let (status, updated) = h
    .call(
      "PUT",
      &format!("/sessions/{sid}/settings"),
      Some(json!({ "language": "French", "theme": "dark" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["settings"]["theme"], "dark");

  let (status, _) = h.call("DELETE", &format!("/sessions/{sid}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(h.store.session_count().await, 0);

  let (status, body) = h.call("GET", &format!("/sessions/{sid}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("session not found"));
}

// ─── Analyses ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn analysis_appends_one_record() {
  let h = Harness::new(Scripted::new(&[FAKE]));
  let sid = h.open_session().await;

  let (status, record) = h.analyze(&sid, "Chocolate cures the flu, study says").await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(record["verdict"], "Fake");
  assert_eq!(record["score"], 8);
  assert_eq!(record["model"], "scripted-model");
  assert_eq!(record["source"]["kind"], "text");

  let (_, page) = h.call("GET", &format!("/sessions/{sid}/analyses"), None).await;
  assert_eq!(page["total"], 1);
  assert_eq!(page["records"][0]["record_id"], record["record_id"]);
}

#[tokio::test]
async fn analysis_uses_session_language() {
  let h = Harness::new(Scripted::new(&[REAL]));
  let (_, session) = h
    .call("POST", "/sessions", Some(json!({ "language": "Telugu" })))
    .await;
  let sid = session["session_id"].as_str().unwrap();

  let (_, record) = h.analyze(sid, "Budget passed").await;
  assert_eq!(record["language"], "Telugu");
}

#[tokio::test]
async fn failed_analyses_append_nothing() {
  let h = Harness::new(Scripted::new(&["I cannot assess this text."]));
  let sid = h.open_session().await;

  let (status, body) = h.analyze(&sid, "Some news").await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["error"].as_str().unwrap().starts_with("invalid response format"));
  assert_eq!(body["raw"], "I cannot assess this text.");

  let (status, _) = h.analyze(&sid, "   ").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(h.state.model.calls(), 1);

  let history = h.store.history(sid.parse().unwrap()).await.unwrap();
  assert!(history.is_empty());
}

#[tokio::test]
async fn missing_api_key_is_unavailable() {
  let h = Harness::new(Scripted::unconfigured());
  let sid = h.open_session().await;

  let (status, body) = h.analyze(&sid, "Some news").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["error"], "API key not configured");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
  let h = Harness::new(Scripted::new(&[FAKE]));
  let sid = uuid::Uuid::new_v4();

  let (status, _) = h.analyze(&sid.to_string(), "text").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = h.call("GET", &format!("/sessions/{sid}/stats"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_ended_during_analysis_is_not_found() {
  let h = Harness::new(Scripted::slow(&[FAKE], Duration::from_millis(300)));
  let sid = h.open_session().await;
  let id: uuid::Uuid = sid.parse().unwrap();

  let ((status, body), ended) = tokio::join!(h.analyze(&sid, "Some news"), async {
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.store.end_session(id).await.unwrap()
  });

  assert!(ended);
  assert_eq!(h.state.model.calls(), 1);
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("session not found"));
  assert_eq!(h.store.session_count().await, 0);
}

#[tokio::test]
async fn filters_and_search_preserve_order() {
  let h = Harness::new(Scripted::new(&[FAKE, REAL, FAKE]));
  let sid = h.open_session().await;
  h.analyze(&sid, "Moon landing was staged").await;
  h.analyze(&sid, "Central bank holds rates").await;
  h.analyze(&sid, "Staged photo of the MOON goes viral").await;

  let (_, fakes) = h
    .call("GET", &format!("/sessions/{sid}/analyses?verdict=fake"), None)
    .await;
  assert_eq!(fakes["total"], 3);
  let texts: Vec<&str> = fakes["records"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["full_text"].as_str().unwrap())
    .collect();
  assert_eq!(texts, ["Moon landing was staged", "Staged photo of the MOON goes viral"]);

  let (_, found) = h
    .call("GET", &format!("/sessions/{sid}/analyses?verdict=all&search=moon"), None)
    .await;
  assert_eq!(found["records"].as_array().unwrap().len(), 2);

  let (status, _) = h
    .call("GET", &format!("/sessions/{sid}/analyses?verdict=satire"), None)
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_and_clear() {
  let h = Harness::new(Scripted::new(&[FAKE, REAL]));
  let sid = h.open_session().await;
  let (_, first) = h.analyze(&sid, "first").await;
  h.analyze(&sid, "second").await;
  let rid = first["record_id"].as_str().unwrap();

  let uri = format!("/sessions/{sid}/analyses/{rid}");
  let (status, record) = h.call("GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(record["full_text"], "first");

  let (status, _) = h.call("DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = h.call("DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, cleared) = h
    .call("DELETE", &format!("/sessions/{sid}/analyses"), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(cleared["removed"], 1);
}

// ─── Stats and export ────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_summarise_history() {
  let h = Harness::new(Scripted::new(&[FAKE, REAL]));
  let sid = h.open_session().await;

  let (_, empty) = h.call("GET", &format!("/sessions/{sid}/stats"), None).await;
  assert_eq!(empty["total"], 0);
  assert!(empty["average_score"].is_null());

  h.analyze(&sid, "a").await;
  h.analyze(&sid, "b").await;
  let (status, stats) = h.call("GET", &format!("/sessions/{sid}/stats"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["fake"], 1);
  assert_eq!(stats["real"], 1);
  assert_eq!(stats["average_score"], 49.5);
  assert_eq!(stats["recent"][0]["verdict"], "Real");
}

#[tokio::test]
async fn export_downloads() {
  let h = Harness::new(Scripted::new(&[FAKE]));
  let sid = h.open_session().await;
  h.analyze(&sid, "Line one, with a comma\nline two").await;

  let req = Request::get(format!("/sessions/{sid}/export?format=csv"))
    .body(Body::empty())
    .unwrap();
  let resp = h.send(req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
  let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
  assert!(disposition.starts_with("attachment; filename=\"fake_news_analysis_"));
  assert!(disposition.ends_with(".csv\""));
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let csv = String::from_utf8(bytes.to_vec()).unwrap();
  assert!(csv.starts_with("record_id,timestamp,verdict,score"));
  assert!(csv.contains("\"Line one, with a comma\nline two\""));

  let req = Request::get(format!("/sessions/{sid}/export"))
    .body(Body::empty())
    .unwrap();
  let resp = h.send(req).await;
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let records = from_json(std::str::from_utf8(&bytes).unwrap()).unwrap();
  let history = h.store.history(sid.parse().unwrap()).await.unwrap();
  assert_eq!(records, history.records());

  let (status, _) = h
    .call("GET", &format!("/sessions/{sid}/export?format=xml"), None)
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Extraction ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn extract_previews_text() {
  let h = Harness::new(Scripted::new(&[FAKE]));
  let (status, body) = h
    .call("POST", "/extract", Some(json!({ "kind": "text", "text": "two words" })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["stats"]["words"], 2);
  assert_eq!(body["source"]["kind"], "text");

  let (status, _) = h
    .call("POST", "/extract", Some(json!({ "kind": "url", "url": "ftp://x.example" })))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extract_pdf_rejects_garbage() {
  let h = Harness::new(Scripted::new(&[FAKE]));
  let req = Request::post("/extract/pdf?filename=a.pdf")
    .header(header::CONTENT_TYPE, "application/pdf")
    .body(Body::from("not a pdf"))
    .unwrap();
  assert_eq!(h.send(req).await.status(), StatusCode::BAD_REQUEST);

  let req = Request::post("/extract/pdf").body(Body::empty()).unwrap();
  assert_eq!(h.send(req).await.status(), StatusCode::BAD_REQUEST);
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn auth_is_enforced_when_configured() {
  let mut h = Harness::new(Scripted::new(&[FAKE]));
  h.auth = Some(auth_config("secret"));

  let resp = h.send(Request::get("/health").body(Body::empty()).unwrap()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

  let req = Request::get("/health")
    .header(header::AUTHORIZATION, basic("user", "secret"))
    .body(Body::empty())
    .unwrap();
  assert_eq!(h.send(req).await.status(), StatusCode::OK);
}
