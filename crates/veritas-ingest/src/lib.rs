//! Input adapters for Veritas.
//!
//! Three mutually exclusive sources feed the analyzer: pasted text, a PDF's
//! extracted text, or the article body of a web page. Each adapter produces
//! an [`Extracted`] text with its [`Source`](veritas_core::record::Source)
//! and size statistics.

pub mod article;
pub mod error;
pub mod input;
pub mod pdf;

pub use article::{Article, ArticleFetcher};
pub use error::{Error, Result};
pub use input::{Extracted, Ingestor, Input};
