//! Analysis records: the single entity Veritas keeps.
//!
//! A record is created once per successful analysis and never updated. It is
//! removed only by explicit user action (single delete or bulk clear) and
//! lives no longer than the session that owns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};
use uuid::Uuid;

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// The model's judgment on a news text.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Verdict {
  Fake,
  Real,
  Uncertain,
}

impl Verdict {
  /// Icon-prefixed label used by the views.
  pub fn label(self) -> &'static str {
    match self {
      Self::Fake => "❌ Fake",
      Self::Real => "✅ Real",
      Self::Uncertain => "⚠️ Uncertain",
    }
  }
}

// ─── Language ────────────────────────────────────────────────────────────────

/// Output language requested from the model.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Language {
  #[default]
  English,
  Hindi,
  Telugu,
  Spanish,
  French,
}

impl Language {
  /// The language after this one, wrapping around.
  pub fn next(self) -> Self {
    let all: Vec<Self> = Self::iter().collect();
    let idx = all.iter().position(|l| *l == self).unwrap_or(0);
    all[(idx + 1) % all.len()]
  }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// Where the analysed text came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
  /// Pasted directly by the user.
  #[default]
  Text,
  /// Extracted from an uploaded PDF.
  Pdf { filename: Option<String> },
  /// Fetched from a web page.
  Url { url: String },
}

impl Source {
  /// Compact single-field rendering for tabular exports.
  pub fn label(&self) -> String {
    match self {
      Self::Text => "text".to_string(),
      Self::Pdf { filename: Some(name) } => format!("pdf:{name}"),
      Self::Pdf { filename: None } => "pdf".to_string(),
      Self::Url { url } => format!("url:{url}"),
    }
  }
}

// ─── Assessment ──────────────────────────────────────────────────────────────

/// A validated model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
  pub verdict:           Verdict,
  pub reason:            String,
  /// Always within `0..=100`.
  pub credibility_score: u8,
}

// ─── AnalysisRecord ──────────────────────────────────────────────────────────

/// One entry in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
  pub record_id: Uuid,
  /// First 300 characters of `full_text`, with `...` appended when cut.
  pub excerpt:   String,
  pub full_text: String,
  pub verdict:   Verdict,
  pub reason:    String,
  pub score:     u8,
  /// Store-assigned; never changes after creation.
  pub timestamp: DateTime<Utc>,
  pub language:  Language,
  pub model:     String,
  #[serde(default)]
  pub source:    Source,
}

// ─── NewAnalysis ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::SessionStore::append`].
/// `record_id`, `excerpt` and `timestamp` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
  pub full_text:  String,
  pub source:     Source,
  pub assessment: Assessment,
  pub language:   Language,
  pub model:      String,
}

impl NewAnalysis {
  /// Materialise the record, stamping it with `timestamp` and a fresh id.
  pub fn into_record(self, timestamp: DateTime<Utc>) -> AnalysisRecord {
    AnalysisRecord {
      record_id: Uuid::new_v4(),
      excerpt: crate::text::excerpt(&self.full_text, crate::text::EXCERPT_CHARS),
      full_text: self.full_text,
      verdict: self.assessment.verdict,
      reason: self.assessment.reason,
      score: self.assessment.credibility_score,
      timestamp,
      language: self.language,
      model: self.model,
      source: self.source,
    }
  }
}
