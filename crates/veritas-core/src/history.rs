//! The in-memory history list and its query operations.
//!
//! Records are kept in append order. Every read that filters returns a subset
//! in that same order; only [`History::recent`] reverses it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{AnalysisRecord, Verdict};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`History::query`]. Both filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
  /// Keep only records with this verdict.
  pub verdict: Option<Verdict>,
  /// Case-insensitive substring matched against the full text.
  pub search:  Option<String>,
}

impl HistoryQuery {
  /// Whether `record` satisfies every filter in this query.
  pub fn matches(&self, record: &AnalysisRecord) -> bool {
    if let Some(verdict) = self.verdict
      && record.verdict != verdict
    {
      return false;
    }
    match self.search.as_deref().map(str::trim) {
      Some(term) if !term.is_empty() => record
        .full_text
        .to_lowercase()
        .contains(&term.to_lowercase()),
      _ => true,
    }
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// An ordered list of analysis records owned by one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
  records: Vec<AnalysisRecord>,
}

impl History {
  pub fn new() -> Self { Self::default() }

  /// Append one record at the end.
  pub fn push(&mut self, record: AnalysisRecord) { self.records.push(record); }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &AnalysisRecord> {
    self.records.iter()
  }

  pub fn records(&self) -> &[AnalysisRecord] { &self.records }

  pub fn get(&self, record_id: Uuid) -> Option<&AnalysisRecord> {
    self.records.iter().find(|r| r.record_id == record_id)
  }

  /// Records matching `query`, in append order.
  pub fn query(&self, query: &HistoryQuery) -> Vec<&AnalysisRecord> {
    self.records.iter().filter(|r| query.matches(r)).collect()
  }

  /// Remove a single record by id.
  pub fn remove(&mut self, record_id: Uuid) -> Option<AnalysisRecord> {
    let idx = self.records.iter().position(|r| r.record_id == record_id)?;
    Some(self.records.remove(idx))
  }

  /// Remove every record; returns how many were dropped.
  pub fn clear(&mut self) -> usize {
    let n = self.records.len();
    self.records.clear();
    n
  }

  /// The last `n` records, newest first.
  pub fn recent(&self, n: usize) -> Vec<&AnalysisRecord> {
    self.records.iter().rev().take(n).collect()
  }
}

/// A filtered view of a history, with the size of the unfiltered list
/// ("showing `records.len()` of `total`").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
  pub total:   usize,
  pub records: Vec<AnalysisRecord>,
}

impl From<Vec<AnalysisRecord>> for History {
  fn from(records: Vec<AnalysisRecord>) -> Self { Self { records } }
}

impl IntoIterator for History {
  type IntoIter = std::vec::IntoIter<AnalysisRecord>;
  type Item = AnalysisRecord;

  fn into_iter(self) -> Self::IntoIter { self.records.into_iter() }
}
