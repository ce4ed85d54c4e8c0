//! Error types for `veritas-ingest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no text to analyze")]
  EmptyText,

  #[error("invalid URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("unsupported URL scheme {0:?}; only http and https are fetched")]
  UnsupportedScheme(String),

  #[error("fetching article failed: {0}")]
  Fetch(#[from] reqwest::Error),

  #[error("{url} returned HTTP {status}")]
  HttpStatus { status: u16, url: String },

  #[error("URL is not a web page (content type {0:?})")]
  NotHtml(String),

  #[error("page is larger than {limit} bytes")]
  PageTooLarge { limit: usize },

  #[error("could not extract article text from the page")]
  NoArticleText,

  #[error("error reading PDF: {0}")]
  Pdf(String),

  #[error("PDF is encrypted")]
  EncryptedPdf,

  #[error("PDF contains no extractable text")]
  NoPdfText,
}

impl Error {
  /// `true` when the input itself was unusable, as opposed to the remote
  /// side failing.
  pub fn is_bad_input(&self) -> bool {
    matches!(
      self,
      Self::EmptyText
        | Self::InvalidUrl(_)
        | Self::UnsupportedScheme(_)
        | Self::NotHtml(_)
        | Self::PageTooLarge { .. }
        | Self::Pdf(_)
        | Self::EncryptedPdf
        | Self::NoPdfText
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
