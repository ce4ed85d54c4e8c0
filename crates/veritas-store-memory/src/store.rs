//! [`MemoryStore`]: the in-process implementation of [`SessionStore`].

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
  },
  time::Duration,
};

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use veritas_core::{
  history::{History, HistoryPage, HistoryQuery},
  record::{AnalysisRecord, NewAnalysis},
  session::{Session, Settings},
  store::SessionStore,
};

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// One session, the history it owns, and when it was last used.
#[derive(Debug)]
struct Slot {
  session:   Session,
  history:   History,
  /// Unix milliseconds of the most recent store call naming this session.
  last_seen: AtomicI64,
}

impl Slot {
  fn new(session: Session) -> Self {
    Self {
      session,
      history: History::new(),
      last_seen: AtomicI64::new(now_millis()),
    }
  }

  /// Atomic so that read-locked calls can refresh it too.
  fn touch(&self) { self.last_seen.store(now_millis(), Ordering::Relaxed); }

  fn last_seen(&self) -> i64 { self.last_seen.load(Ordering::Relaxed) }
}

fn now_millis() -> i64 { Utc::now().timestamp_millis() }

fn slot(sessions: &HashMap<Uuid, Slot>, session_id: Uuid) -> Result<&Slot> {
  let slot = sessions
    .get(&session_id)
    .ok_or(Error::SessionNotFound(session_id))?;
  slot.touch();
  Ok(slot)
}

fn slot_mut(sessions: &mut HashMap<Uuid, Slot>, session_id: Uuid) -> Result<&mut Slot> {
  let slot = sessions
    .get_mut(&session_id)
    .ok_or(Error::SessionNotFound(session_id))?;
  slot.touch();
  Ok(slot)
}

/// A session store held entirely in memory.
///
/// Cloning is cheap; clones share the same sessions.
#[derive(Clone, Default)]
pub struct MemoryStore {
  sessions: Arc<RwLock<HashMap<Uuid, Slot>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Number of open sessions.
  pub async fn session_count(&self) -> usize { self.sessions.read().await.len() }

  /// Drop every session that no store call has named for longer than
  /// `max_idle`. Returns how many were dropped.
  pub async fn reap_idle(&self, max_idle: Duration) -> usize {
    let max_idle = i64::try_from(max_idle.as_millis()).unwrap_or(i64::MAX);
    let cutoff = now_millis().saturating_sub(max_idle);

    let mut sessions = self.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|session_id, slot| {
      let keep = slot.last_seen() >= cutoff;
      if !keep {
        tracing::debug!(
          %session_id,
          records = slot.history.len(),
          "idle session reaped"
        );
      }
      keep
    });
    before - sessions.len()
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for MemoryStore {
  type Error = Error;

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, settings: Settings) -> Result<Session> {
    let session = Session::new(settings);
    self
      .sessions
      .write()
      .await
      .insert(session.session_id, Slot::new(session.clone()));
    tracing::debug!(session_id = %session.session_id, "session created");
    Ok(session)
  }

  async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>> {
    let sessions = self.sessions.read().await;
    Ok(slot(&sessions, session_id).ok().map(|slot| slot.session.clone()))
  }

  async fn update_settings(
    &self,
    session_id: Uuid,
    settings: Settings,
  ) -> Result<Session> {
    let mut sessions = self.sessions.write().await;
    let slot = slot_mut(&mut sessions, session_id)?;
    slot.session.settings = settings;
    Ok(slot.session.clone())
  }

  async fn end_session(&self, session_id: Uuid) -> Result<bool> {
    let removed = self.sessions.write().await.remove(&session_id);
    if let Some(slot) = &removed {
      tracing::debug!(
        %session_id,
        records = slot.history.len(),
        "session ended"
      );
    }
    Ok(removed.is_some())
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn append(
    &self,
    session_id: Uuid,
    input: NewAnalysis,
  ) -> Result<AnalysisRecord> {
    let mut sessions = self.sessions.write().await;
    let slot = slot_mut(&mut sessions, session_id)?;
    let record = input.into_record(Utc::now());
    slot.history.push(record.clone());
    Ok(record)
  }

  async fn list(&self, session_id: Uuid, query: &HistoryQuery) -> Result<HistoryPage> {
    let sessions = self.sessions.read().await;
    let slot = slot(&sessions, session_id)?;
    Ok(HistoryPage {
      total:   slot.history.len(),
      records: slot.history.query(query).into_iter().cloned().collect(),
    })
  }

  async fn get_record(
    &self,
    session_id: Uuid,
    record_id: Uuid,
  ) -> Result<Option<AnalysisRecord>> {
    let sessions = self.sessions.read().await;
    Ok(slot(&sessions, session_id)?.history.get(record_id).cloned())
  }

  async fn delete_record(&self, session_id: Uuid, record_id: Uuid) -> Result<bool> {
    let mut sessions = self.sessions.write().await;
    let slot = slot_mut(&mut sessions, session_id)?;
    Ok(slot.history.remove(record_id).is_some())
  }

  async fn clear(&self, session_id: Uuid) -> Result<usize> {
    let mut sessions = self.sessions.write().await;
    Ok(slot_mut(&mut sessions, session_id)?.history.clear())
  }

  async fn history(&self, session_id: Uuid) -> Result<History> {
    let sessions = self.sessions.read().await;
    Ok(slot(&sessions, session_id)?.history.clone())
  }
}
