//! Tests for `MemoryStore`.

use std::time::Duration;

use uuid::Uuid;
use veritas_core::{
  history::HistoryQuery,
  record::{Assessment, Language, NewAnalysis, Source, Verdict},
  session::{Settings, Theme},
  store::SessionStore,
};

use crate::{Error, MemoryStore};

fn analysis(text: &str, verdict: Verdict, score: u8) -> NewAnalysis {
  NewAnalysis {
    full_text:  text.to_string(),
    source:     Source::Text,
    assessment: Assessment {
      verdict,
      reason: "because".into(),
      credibility_score: score,
    },
    language:   Language::English,
    model:      "gemini-1.5-flash".into(),
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_session() {
  let s = MemoryStore::new();
  let session = s.create_session(Settings::default()).await.unwrap();

  let fetched = s.get_session(session.session_id).await.unwrap().unwrap();
  assert_eq!(fetched.session_id, session.session_id);
  assert_eq!(fetched.settings, Settings::default());
  assert_eq!(s.session_count().await, 1);
}

#[tokio::test]
async fn get_missing_session_returns_none() {
  let s = MemoryStore::new();
  assert!(s.get_session(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_settings_replaces_them() {
  let s = MemoryStore::new();
  let session = s.create_session(Settings::default()).await.unwrap();
  let new = Settings { language: Language::Telugu, theme: Theme::Dark };

  let updated = s.update_settings(session.session_id, new).await.unwrap();
  assert_eq!(updated.settings, new);
  let fetched = s.get_session(session.session_id).await.unwrap().unwrap();
  assert_eq!(fetched.settings.language, Language::Telugu);
}

#[tokio::test]
async fn end_session_drops_history() {
  let s = MemoryStore::new();
  let session = s.create_session(Settings::default()).await.unwrap();
  s.append(session.session_id, analysis("a", Verdict::Fake, 1))
    .await
    .unwrap();

  assert!(s.end_session(session.session_id).await.unwrap());
  assert!(!s.end_session(session.session_id).await.unwrap());
  assert!(matches!(
    s.history(session.session_id).await,
    Err(Error::SessionNotFound(_))
  ));
}

// ─── History ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_assigns_id_and_keeps_call_order() {
  let s = MemoryStore::new();
  let id = s.create_session(Settings::default()).await.unwrap().session_id;

  let first = s.append(id, analysis("first", Verdict::Real, 80)).await.unwrap();
  let second = s.append(id, analysis("second", Verdict::Fake, 10)).await.unwrap();
  assert_ne!(first.record_id, second.record_id);
  assert!(first.timestamp <= second.timestamp);

  let all = s.list(id, &HistoryQuery::default()).await.unwrap().records;
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].full_text, "first");
  assert_eq!(all[1].full_text, "second");
}

#[tokio::test]
async fn list_applies_query() {
  let s = MemoryStore::new();
  let id = s.create_session(Settings::default()).await.unwrap().session_id;
  s.append(id, analysis("aliens land", Verdict::Fake, 2)).await.unwrap();
  s.append(id, analysis("rates rise", Verdict::Real, 85)).await.unwrap();
  s.append(id, analysis("aliens vote", Verdict::Fake, 4)).await.unwrap();

  let query = HistoryQuery { verdict: Some(Verdict::Fake), search: Some("VOTE".into()) };
  let page = s.list(id, &query).await.unwrap();
  assert_eq!(page.total, 3);
  assert_eq!(page.records.len(), 1);
  assert_eq!(page.records[0].full_text, "aliens vote");
}

#[tokio::test]
async fn sessions_are_isolated() {
  let s = MemoryStore::new();
  let a = s.create_session(Settings::default()).await.unwrap().session_id;
  let b = s.create_session(Settings::default()).await.unwrap().session_id;

  s.append(a, analysis("only in a", Verdict::Real, 70)).await.unwrap();

  assert_eq!(s.history(a).await.unwrap().len(), 1);
  assert!(s.history(b).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_and_clear() {
  let s = MemoryStore::new();
  let id = s.create_session(Settings::default()).await.unwrap().session_id;
  let r1 = s.append(id, analysis("one", Verdict::Real, 70)).await.unwrap();
  s.append(id, analysis("two", Verdict::Real, 71)).await.unwrap();
  s.append(id, analysis("three", Verdict::Real, 72)).await.unwrap();

  assert!(s.delete_record(id, r1.record_id).await.unwrap());
  assert!(!s.delete_record(id, r1.record_id).await.unwrap());
  assert!(s.get_record(id, r1.record_id).await.unwrap().is_none());

  assert_eq!(s.clear(id).await.unwrap(), 2);
  assert!(s.history(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn append_to_missing_session_fails() {
  let s = MemoryStore::new();
  let missing = Uuid::new_v4();
  let err = s
    .append(missing, analysis("x", Verdict::Fake, 0))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SessionNotFound(id) if id == missing));
}

// ─── Idle sessions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn reap_idle_drops_only_stale_sessions() {
  let s = MemoryStore::new();
  let stale = s.create_session(Settings::default()).await.unwrap().session_id;
  tokio::time::sleep(Duration::from_millis(200)).await;
  let fresh = s.create_session(Settings::default()).await.unwrap().session_id;

  assert_eq!(s.reap_idle(Duration::from_millis(100)).await, 1);
  assert!(s.get_session(stale).await.unwrap().is_none());
  assert!(s.get_session(fresh).await.unwrap().is_some());
}

#[tokio::test]
async fn any_store_call_keeps_a_session_alive() {
  let s = MemoryStore::new();
  let used = s.create_session(Settings::default()).await.unwrap().session_id;
  let unused = s.create_session(Settings::default()).await.unwrap().session_id;
  tokio::time::sleep(Duration::from_millis(200)).await;

  s.list(used, &HistoryQuery::default()).await.unwrap();

  assert_eq!(s.reap_idle(Duration::from_millis(100)).await, 1);
  assert_eq!(s.session_count().await, 1);
  assert!(matches!(
    s.history(unused).await,
    Err(Error::SessionNotFound(id)) if id == unused
  ));
  assert!(s.history(used).await.is_ok());
}
