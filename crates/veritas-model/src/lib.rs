//! Model access for Veritas: the prompt template, the tolerant reply parser,
//! and the hosted-model client.
//!
//! The model itself is treated as an opaque function from prompt to free
//! text; everything Veritas knows about credibility comes from its reply.

pub mod error;
pub mod extract;
pub mod gemini;
pub mod model;
pub mod prompt;

pub use error::{Error, ReplyError, Result};
pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{Model, analyze};
