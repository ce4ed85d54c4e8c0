//! Error types for `veritas-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("analysis record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("unknown export format: {0:?}")]
  UnknownExportFormat(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("csv output was not valid UTF-8")]
  CsvEncoding,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
