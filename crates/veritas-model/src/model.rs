//! The `Model` trait and the analysis pipeline built on it.

use std::future::Future;

use veritas_core::record::{Assessment, Language};

use crate::{Error, Result, extract::parse_reply, prompt::build_prompt};

/// A hosted text model, seen as an opaque prompt-to-text function.
pub trait Model: Send + Sync {
  /// Name recorded on every analysis this model produces.
  fn name(&self) -> &str;

  /// Whether the model is usable at all (e.g. an API key is configured).
  fn is_configured(&self) -> bool { true }

  /// Send `prompt` and return the model's raw reply text.
  fn generate<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;
}

/// Ask `model` for a credibility judgment on `text`.
///
/// One outbound call, no retries. Any failure is returned as a labelled
/// [`Error`]; a reply that cannot be parsed carries the raw text.
pub async fn analyze<M: Model>(
  model: &M,
  text: &str,
  language: Language,
) -> Result<Assessment> {
  let prompt = build_prompt(text, language);
  tracing::debug!(
    model = model.name(),
    %language,
    chars = text.chars().count(),
    "requesting assessment"
  );

  let raw = model.generate(&prompt).await?;
  if raw.trim().is_empty() {
    return Err(Error::EmptyReply);
  }

  parse_reply(&raw).map_err(|reason| {
    tracing::warn!(%reason, "model reply could not be parsed");
    Error::InvalidReply { reason, raw }
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use veritas_core::record::Verdict;

  use super::*;
  use crate::ReplyError;

  /// Replies with a canned string and remembers the last prompt.
  struct Canned {
    reply:       String,
    last_prompt: Mutex<Option<String>>,
  }

  impl Canned {
    fn new(reply: &str) -> Self {
      Self { reply: reply.to_string(), last_prompt: Mutex::new(None) }
    }
  }

  impl Model for Canned {
    fn name(&self) -> &str { "canned" }

    async fn generate(&self, prompt: &str) -> Result<String> {
      *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
      Ok(self.reply.clone())
    }
  }

  struct Unconfigured;

  impl Model for Unconfigured {
    fn name(&self) -> &str { "none" }

    async fn generate(&self, _prompt: &str) -> Result<String> {
      Err(Error::MissingApiKey)
    }
  }

  #[tokio::test]
  async fn successful_analysis() {
    let model = Canned::new(
      r#"Sure! {"verdict":"Real","reason":"Matches official data","credibility_score":88}"#,
    );
    let a = analyze(&model, "GDP grew 2%", Language::Hindi).await.unwrap();
    assert_eq!(a.verdict, Verdict::Real);
    assert_eq!(a.credibility_score, 88);

    let prompt = model.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("GDP grew 2%"));
    assert!(prompt.contains("Hindi"));
  }

  #[tokio::test]
  async fn unparsable_reply_keeps_raw_text() {
    let model = Canned::new("I am not able to help with that.");
    let err = analyze(&model, "text", Language::English).await.unwrap_err();
    assert!(matches!(
      &err,
      Error::InvalidReply { reason: ReplyError::NoJson, .. }
    ));
    assert_eq!(err.raw_reply(), Some("I am not able to help with that."));
  }

  #[tokio::test]
  async fn blank_reply_is_empty_error() {
    let model = Canned::new("  \n");
    let err = analyze(&model, "text", Language::English).await.unwrap_err();
    assert!(matches!(err, Error::EmptyReply));
  }

  #[tokio::test]
  async fn model_errors_pass_through() {
    let err = analyze(&Unconfigured, "text", Language::English)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::MissingApiKey));
    assert_eq!(err.to_string(), "API key not configured");
  }
}
