//! Session: the per-client envelope that owns one history list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::Language;

/// Colour scheme requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

impl Theme {
  pub fn toggled(self) -> Self {
    match self {
      Self::Light => Self::Dark,
      Self::Dark => Self::Light,
    }
  }
}

/// User-adjustable settings carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub language: Language,
  #[serde(default)]
  pub theme:    Theme,
}

/// A transient session. Nothing about it outlives the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub session_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub settings:   Settings,
}

impl Session {
  pub fn new(settings: Settings) -> Self {
    Self {
      session_id: Uuid::new_v4(),
      created_at: Utc::now(),
      settings,
    }
  }
}
