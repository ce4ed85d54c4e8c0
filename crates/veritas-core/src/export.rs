//! CSV and JSON dumps of a session's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result, record::AnalysisRecord};

/// Timestamp layout used in tabular exports.
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CSV_HEADER: [&str; 10] = [
  "record_id",
  "timestamp",
  "verdict",
  "score",
  "language",
  "model",
  "source",
  "excerpt",
  "reason",
  "full_text",
];

/// Supported download formats.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
  #[default]
  Json,
  Csv,
}

impl ExportFormat {
  pub fn mime_type(self) -> &'static str {
    match self {
      Self::Json => "application/json",
      Self::Csv => "text/csv",
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      Self::Json => "json",
      Self::Csv => "csv",
    }
  }

  /// Download name stamped with `now`, e.g.
  /// `fake_news_analysis_20250301_120000.csv`.
  pub fn file_name(self, now: DateTime<Utc>) -> String {
    format!(
      "fake_news_analysis_{}.{}",
      now.format("%Y%m%d_%H%M%S"),
      self.extension()
    )
  }

  /// Render `records` in this format.
  pub fn render(self, records: &[AnalysisRecord]) -> Result<String> {
    match self {
      Self::Json => to_json(records),
      Self::Csv => to_csv(records),
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse()
      .map_err(|_| Error::UnknownExportFormat(s.to_string()))
  }
}

/// Pretty-printed JSON array with two-space indentation.
pub fn to_json(records: &[AnalysisRecord]) -> Result<String> {
  Ok(serde_json::to_string_pretty(records)?)
}

/// Inverse of [`to_json`].
pub fn from_json(raw: &str) -> Result<Vec<AnalysisRecord>> {
  Ok(serde_json::from_str(raw)?)
}

/// One header row plus one row per record.
pub fn to_csv(records: &[AnalysisRecord]) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(CSV_HEADER)?;

  for r in records {
    writer.write_record([
      r.record_id.to_string(),
      r.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string(),
      r.verdict.to_string(),
      r.score.to_string(),
      r.language.to_string(),
      r.model.clone(),
      r.source.label(),
      r.excerpt.clone(),
      r.reason.clone(),
      r.full_text.clone(),
    ])?;
  }

  let bytes = writer
    .into_inner()
    .map_err(|e| Error::Csv(e.into_error().into()))?;
  String::from_utf8(bytes).map_err(|_| Error::CsvEncoding)
}
