//! Small text helpers shared by the input adapters and the views.

use serde::{Deserialize, Serialize};

/// Length of the excerpt stored alongside every record.
pub const EXCERPT_CHARS: usize = 300;

/// The first `max_chars` characters of `text`, with `...` appended when the
/// text was longer. Never splits a code point.
pub fn excerpt(text: &str, max_chars: usize) -> String {
  match text.char_indices().nth(max_chars) {
    Some((cut, _)) => format!("{}...", &text[..cut]),
    None => text.to_string(),
  }
}

/// Size metrics shown next to a text before it is analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextStats {
  pub characters: usize,
  pub words:      usize,
  pub lines:      usize,
}

impl TextStats {
  pub fn of(text: &str) -> Self {
    Self {
      characters: text.chars().count(),
      words:      text.split_whitespace().count(),
      lines:      text.split('\n').count(),
    }
  }
}

/// `true` if `text` has nothing worth sending to the model.
pub fn is_blank(text: &str) -> bool { text.trim().is_empty() }
