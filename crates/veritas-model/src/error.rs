//! Error types for `veritas-model`.

use thiserror::Error;

/// Why a model reply could not be turned into an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
  #[error("no JSON object found in reply")]
  NoJson,

  #[error("reply JSON is not an object: {0}")]
  NotAnObject(String),

  #[error("missing field {0:?}")]
  MissingField(&'static str),

  #[error("unrecognised verdict {0:?}")]
  UnknownVerdict(String),

  #[error("field \"reason\" is not a string")]
  InvalidReason,

  #[error("credibility_score is not a number: {0}")]
  InvalidScore(String),

  #[error("credibility_score {0} is outside 0-100")]
  ScoreOutOfRange(i64),
}

/// A failed analysis. Every variant is recoverable: the caller may simply try
/// again.
#[derive(Debug, Error)]
pub enum Error {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("request to model failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("model API returned HTTP {status}: {body}")]
  Api { status: u16, body: String },

  #[error("model returned an empty reply")]
  EmptyReply,

  #[error("invalid response format: {reason}")]
  InvalidReply { reason: ReplyError, raw: String },
}

impl Error {
  /// The unparsed model reply, when there was one.
  pub fn raw_reply(&self) -> Option<&str> {
    match self {
      Self::InvalidReply { raw, .. } => Some(raw),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
