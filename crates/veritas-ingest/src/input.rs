//! Resolving a user's input into the text that will be analysed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use veritas_core::{
  record::Source,
  text::{TextStats, is_blank},
};

use crate::{ArticleFetcher, Error, Result, pdf};

/// A text-like input. PDFs arrive as raw bytes and go through
/// [`Extracted::from_pdf`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Input {
  Text { text: String },
  Url { url: String },
}

/// Text ready for analysis, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
  pub text:   String,
  pub source: Source,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:  Option<String>,
  pub stats:  TextStats,
}

impl Extracted {
  fn new(text: String, source: Source, title: Option<String>) -> Result<Self> {
    if is_blank(&text) {
      return Err(Error::EmptyText);
    }
    let stats = TextStats::of(&text);
    Ok(Self { text, source, title, stats })
  }

  /// Extract the text of an uploaded PDF. Blocking; see [`pdf`].
  pub fn from_pdf(bytes: &[u8], filename: Option<String>) -> Result<Self> {
    let text = pdf::extract_pages(bytes)?.text();
    Self::new(text, Source::Pdf { filename }, None)
  }
}

// ─── Ingestor ────────────────────────────────────────────────────────────────

/// Turns [`Input`]s into [`Extracted`] text.
#[derive(Debug, Clone)]
pub struct Ingestor {
  fetcher: ArticleFetcher,
}

impl Ingestor {
  pub fn new(fetch_timeout: Duration) -> Result<Self> {
    Ok(Self { fetcher: ArticleFetcher::new(fetch_timeout)? })
  }

  pub async fn resolve(&self, input: Input) -> Result<Extracted> {
    match input {
      Input::Text { text } => Extracted::new(text, Source::Text, None),
      Input::Url { url } => {
        let article = self.fetcher.fetch(&url).await?;
        Extracted::new(article.text, Source::Url { url: article.url }, article.title)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pdf::tests::build_pdf;

  fn ingestor() -> Ingestor { Ingestor::new(Duration::from_secs(5)).unwrap() }

  #[tokio::test]
  async fn pasted_text_passes_through() {
    let out = ingestor()
      .resolve(Input::Text { text: "Aliens land\nin Paris".into() })
      .await
      .unwrap();
    assert_eq!(out.source, Source::Text);
    assert_eq!(out.stats, TextStats { characters: 20, words: 4, lines: 2 });
    assert_eq!(out.title, None);
  }

  #[tokio::test]
  async fn blank_text_is_rejected() {
    let err = ingestor()
      .resolve(Input::Text { text: " \n\t ".into() })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::EmptyText));
  }

  #[tokio::test]
  async fn bad_url_is_rejected_before_fetching() {
    let err = ingestor()
      .resolve(Input::Url { url: "file:///etc/passwd".into() })
      .await
      .unwrap_err();
    assert!(err.is_bad_input());
  }

  #[test]
  fn pdf_source_keeps_filename() {
    let bytes = build_pdf(&[Some("Official statement")]);
    let out = Extracted::from_pdf(&bytes, Some("statement.pdf".into())).unwrap();
    assert!(out.text.contains("Official statement"));
    assert_eq!(out.source, Source::Pdf { filename: Some("statement.pdf".into()) });
  }

  #[test]
  fn input_wire_format() {
    let input: Input =
      serde_json::from_str(r#"{"kind":"url","url":"https://news.example/a"}"#).unwrap();
    assert_eq!(input, Input::Url { url: "https://news.example/a".into() });
  }
}
