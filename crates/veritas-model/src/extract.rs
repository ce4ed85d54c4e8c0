//! Pulling a structured assessment out of a free-text model reply.
//!
//! Models wrap their JSON in prose, markdown fences, or both. The parser looks
//! for the first `{…}` span first and only widens the search when that span is
//! not a usable object (nested braces, a `}` inside a string).

use std::{str::FromStr as _, sync::LazyLock};

use regex::Regex;
use serde_json::{Map, Value};
use veritas_core::record::{Assessment, Verdict};

use crate::ReplyError;

static FIRST_OBJECT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("static regex is valid"));

/// The first `{…}` span in `reply`, matched non-greedily across newlines.
/// `None` means the reply contains no JSON object at all.
pub fn extract_json(reply: &str) -> Option<&str> {
  FIRST_OBJECT.find(reply).map(|m| m.as_str())
}

/// The widest `{…}` span: first `{` to last `}`.
fn widest_object(reply: &str) -> Option<&str> {
  let start = reply.find('{')?;
  let end = reply.rfind('}')?;
  (start < end).then(|| &reply[start..=end])
}

fn parse_object(candidate: &str) -> Result<Map<String, Value>, ReplyError> {
  match serde_json::from_str::<Value>(candidate) {
    Ok(Value::Object(map)) => Ok(map),
    Ok(other) => Err(ReplyError::NotAnObject(other.to_string())),
    Err(e) => Err(ReplyError::NotAnObject(e.to_string())),
  }
}

/// Parse a model reply into a validated [`Assessment`].
pub fn parse_reply(reply: &str) -> Result<Assessment, ReplyError> {
  let first = extract_json(reply).ok_or(ReplyError::NoJson)?;
  let object = match parse_object(first) {
    Ok(map) => map,
    Err(first_err) => match widest_object(reply) {
      Some(wide) if wide != first => parse_object(wide)?,
      _ => return Err(first_err),
    },
  };

  let verdict = match object.get("verdict") {
    None => return Err(ReplyError::MissingField("verdict")),
    Some(Value::String(s)) => Verdict::from_str(s.trim())
      .map_err(|_| ReplyError::UnknownVerdict(s.clone()))?,
    Some(other) => return Err(ReplyError::UnknownVerdict(other.to_string())),
  };

  let reason = match object.get("reason") {
    None => return Err(ReplyError::MissingField("reason")),
    Some(Value::String(s)) => s.trim().to_string(),
    Some(_) => return Err(ReplyError::InvalidReason),
  };

  let score = object
    .get("credibility_score")
    .ok_or(ReplyError::MissingField("credibility_score"))
    .and_then(parse_score)?;

  Ok(Assessment { verdict, reason, credibility_score: score })
}

/// Accepts integers, floats (rounded) and numeric strings in `0..=100`.
fn parse_score(value: &Value) -> Result<u8, ReplyError> {
  let n = match value {
    Value::Number(n) => match n.as_i64() {
      Some(i) => i,
      None => n
        .as_f64()
        .map(|f| f.round() as i64)
        .ok_or_else(|| ReplyError::InvalidScore(n.to_string()))?,
    },
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .ok()
      .filter(|f| f.is_finite())
      .map(|f| f.round() as i64)
      .ok_or_else(|| ReplyError::InvalidScore(s.clone()))?,
    other => return Err(ReplyError::InvalidScore(other.to_string())),
  };

  u8::try_from(n)
    .ok()
    .filter(|s| *s <= 100)
    .ok_or(ReplyError::ScoreOutOfRange(n))
}
