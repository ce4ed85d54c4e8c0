//! Application state machine and event dispatcher.
//!
//! Key handling is split in two: [`App::on_key`] updates local state and
//! returns the [`Action`] that needs the server, and [`App::perform`] runs it.

use std::{path::Path, sync::Arc};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use veritas_core::{
  export::ExportFormat,
  record::{AnalysisRecord, Source, Verdict},
  session::{Session, Settings},
  stats::DashboardStats,
  text::{TextStats, is_blank},
};

use crate::client::{ApiClient, ApiFailure, Preview};

// ─── Screen ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Home,
  Detector,
  Dashboard,
  History,
  Export,
}

impl Screen {
  pub const ALL: [Screen; 5] = [
    Screen::Home,
    Screen::Detector,
    Screen::Dashboard,
    Screen::History,
    Screen::Export,
  ];

  pub fn title(self) -> &'static str {
    match self {
      Screen::Home => "Home",
      Screen::Detector => "Detector",
      Screen::Dashboard => "Dashboard",
      Screen::History => "History",
      Screen::Export => "Export",
    }
  }

  pub fn index(self) -> usize {
    Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
  }

  fn offset(self, by: isize) -> Self {
    let n = Self::ALL.len() as isize;
    Self::ALL[(self.index() as isize + by).rem_euclid(n) as usize]
  }
}

// ─── Input method ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMethod {
  #[default]
  Text,
  Pdf,
  Url,
}

impl InputMethod {
  pub const ALL: [InputMethod; 3] = [InputMethod::Text, InputMethod::Pdf, InputMethod::Url];

  pub fn label(self) -> &'static str {
    match self {
      InputMethod::Text => "Paste Text",
      InputMethod::Pdf => "Upload PDF",
      InputMethod::Url => "Enter URL",
    }
  }

  pub fn next(self) -> Self {
    match self {
      InputMethod::Text => InputMethod::Pdf,
      InputMethod::Pdf => InputMethod::Url,
      InputMethod::Url => InputMethod::Text,
    }
  }
}

/// Keyboard focus within a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  /// Typing into the detector's input buffer.
  Editing,
  /// Typing a history search term.
  Searching,
  /// Waiting for `y` to clear the whole history.
  ConfirmClear,
}

/// What the last analysis produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Success(AnalysisRecord),
  Failure { message: String, raw: Option<String> },
}

/// Work that needs the server, produced by [`App::on_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  None,
  Quit,
  /// Reload whatever the current screen shows.
  Refresh,
  SaveSettings,
  FetchPreview,
  Analyze,
  DeleteSelected,
  ClearHistory,
  Export(ExportFormat),
}

// ─── App ─────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,
  pub mode:   Mode,

  /// The server-side session; `None` until [`App::start`] succeeds.
  pub session:  Option<Session>,
  pub settings: Settings,

  /// Model name and key status reported by the server.
  pub model_name:  String,
  pub model_ready: bool,

  // Detector
  pub input_method: InputMethod,
  /// Pasted text, PDF path or URL, depending on `input_method`.
  pub input:        String,
  pub preview:      Option<Preview>,
  pub outcome:      Option<Outcome>,

  // History: newest first, already filtered by the server.
  pub history:        Vec<AnalysisRecord>,
  pub history_total:  usize,
  pub verdict_filter: Option<Verdict>,
  pub search:         String,
  pub list_cursor:    usize,

  // Dashboard
  pub stats: Option<DashboardStats>,

  // Export: the full history, newest first.
  pub export_records: Vec<AnalysisRecord>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::Home,
      mode: Mode::Normal,
      session: None,
      settings: Settings::default(),
      model_name: String::new(),
      model_ready: false,
      input_method: InputMethod::default(),
      input: String::new(),
      preview: None,
      outcome: None,
      history: Vec::new(),
      history_total: 0,
      verdict_filter: None,
      search: String::new(),
      list_cursor: 0,
      stats: None,
      export_records: Vec::new(),
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Check the server and open a session.
  pub async fn start(&mut self) -> anyhow::Result<()> {
    let health = self.client.health().await?;
    self.model_name = health.model;
    self.model_ready = health.api_key_configured;
    if !self.model_ready {
      self.status_msg = "Warning: the server has no API key configured".into();
    }

    let session = self.client.create_session(self.settings).await?;
    tracing::info!(session_id = %session.session_id, "session opened");
    self.settings = session.settings;
    self.session = Some(session);
    Ok(())
  }

  /// End the session; its history is discarded by the server.
  pub async fn shutdown(&mut self) {
    if let Some(session) = self.session.take()
      && let Err(e) = self.client.end_session(session.session_id).await
    {
      tracing::warn!(error = %e, "could not end session");
    }
  }

  /// End the session after a startup failure and hand the error back.
  pub async fn abandon(&mut self, err: anyhow::Error) -> anyhow::Error {
    self.shutdown().await;
    err
  }

  // ── Derived state ─────────────────────────────────────────────────────────

  /// Size statistics for what would be analysed right now.
  pub fn input_stats(&self) -> Option<TextStats> {
    match (&self.preview, self.input_method) {
      (Some(p), _) => Some(p.stats),
      (None, InputMethod::Text) if !self.input.is_empty() => Some(TextStats::of(&self.input)),
      _ => None,
    }
  }

  /// The record under the history cursor.
  pub fn selected_record(&self) -> Option<&AnalysisRecord> {
    self.history.get(self.list_cursor)
  }

  fn next_verdict_filter(current: Option<Verdict>) -> Option<Verdict> {
    match current {
      None => Some(Verdict::Fake),
      Some(Verdict::Fake) => Some(Verdict::Real),
      Some(Verdict::Real) => Some(Verdict::Uncertain),
      Some(Verdict::Uncertain) => None,
    }
  }

  fn input_changed(&mut self) {
    self.preview = None;
    self.outcome = None;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let action = self.on_key(key);
    if action == Action::Quit {
      return Ok(false);
    }
    self.perform(action).await;
    Ok(true)
  }

  /// Apply `key` to local state and report what, if anything, the server
  /// must do next.
  pub fn on_key(&mut self, key: KeyEvent) -> Action {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Action::Quit;
    }

    match self.mode {
      Mode::Editing => self.on_edit_key(key),
      Mode::Searching => self.on_search_key(key),
      Mode::ConfirmClear => {
        self.mode = Mode::Normal;
        if key.code == KeyCode::Char('y') {
          Action::ClearHistory
        } else {
          self.status_msg = "Clear cancelled".into();
          Action::None
        }
      }
      Mode::Normal => self.on_normal_key(key),
    }
  }

  fn on_normal_key(&mut self, key: KeyEvent) -> Action {
    // Global keys first.
    match key.code {
      KeyCode::Char('q') => return Action::Quit,
      KeyCode::Char(c @ '1'..='5') => {
        let idx = c as usize - '1' as usize;
        return self.switch_to(Screen::ALL[idx]);
      }
      KeyCode::Tab => return self.switch_to(self.screen.offset(1)),
      KeyCode::BackTab => return self.switch_to(self.screen.offset(-1)),
      KeyCode::Char('L') => {
        self.settings.language = self.settings.language.next();
        self.status_msg = format!("Language: {}", self.settings.language);
        return Action::SaveSettings;
      }
      KeyCode::Char('T') => {
        self.settings.theme = self.settings.theme.toggled();
        self.status_msg = format!("Theme: {:?}", self.settings.theme);
        return Action::SaveSettings;
      }
      KeyCode::Char('r') => return Action::Refresh,
      _ => {}
    }

    match self.screen {
      Screen::Home => Action::None,
      Screen::Dashboard => Action::None,
      Screen::Detector => self.on_detector_key(key),
      Screen::History => self.on_history_key(key),
      Screen::Export => self.on_export_key(key),
    }
  }

  fn switch_to(&mut self, screen: Screen) -> Action {
    self.screen = screen;
    self.status_msg.clear();
    Action::Refresh
  }

  fn on_detector_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Char('i') | KeyCode::Enter => {
        self.mode = Mode::Editing;
        Action::None
      }
      KeyCode::Char('m') => {
        self.input_method = self.input_method.next();
        self.input.clear();
        self.input_changed();
        Action::None
      }
      KeyCode::Char('x') => {
        self.input.clear();
        self.input_changed();
        Action::None
      }
      KeyCode::Char('f') => Action::FetchPreview,
      KeyCode::Char('a') => Action::Analyze,
      _ => Action::None,
    }
  }

  fn on_edit_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Esc => self.mode = Mode::Normal,
      KeyCode::Enter if self.input_method == InputMethod::Text => {
        self.input.push('\n');
        self.input_changed();
      }
      // Single-line inputs: Enter submits.
      KeyCode::Enter => {
        self.mode = Mode::Normal;
        return Action::FetchPreview;
      }
      KeyCode::Backspace => {
        self.input.pop();
        self.input_changed();
      }
      KeyCode::Char(c) => {
        self.input.push(c);
        self.input_changed();
      }
      _ => {}
    }
    Action::None
  }

  fn on_history_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.history.len() {
          self.list_cursor += 1;
        }
        Action::None
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
        Action::None
      }
      KeyCode::Char('v') => {
        self.verdict_filter = Self::next_verdict_filter(self.verdict_filter);
        self.list_cursor = 0;
        Action::Refresh
      }
      KeyCode::Char('/') => {
        self.mode = Mode::Searching;
        Action::None
      }
      KeyCode::Char('d') | KeyCode::Delete if self.selected_record().is_some() => {
        Action::DeleteSelected
      }
      _ => Action::None,
    }
  }

  fn on_search_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.search.clear();
        self.list_cursor = 0;
        Action::Refresh
      }
      KeyCode::Enter => {
        self.mode = Mode::Normal;
        self.list_cursor = 0;
        Action::Refresh
      }
      KeyCode::Backspace => {
        self.search.pop();
        Action::None
      }
      KeyCode::Char(c) => {
        self.search.push(c);
        Action::None
      }
      _ => Action::None,
    }
  }

  fn on_export_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Char('c') => Action::Export(ExportFormat::Csv),
      KeyCode::Char('j') => Action::Export(ExportFormat::Json),
      KeyCode::Char('X') => {
        self.mode = Mode::ConfirmClear;
        self.status_msg = "Clear ALL history? Press y to confirm, any other key to cancel".into();
        Action::None
      }
      _ => Action::None,
    }
  }

  // ── Server round-trips ────────────────────────────────────────────────────

  /// Run `action`, reporting any failure in the status bar.
  pub async fn perform(&mut self, action: Action) {
    let result = match action {
      Action::None | Action::Quit => Ok(()),
      Action::Refresh => self.refresh().await,
      Action::SaveSettings => self.save_settings().await,
      Action::FetchPreview => self.fetch_preview().await,
      Action::Analyze => self.analyze().await,
      Action::DeleteSelected => self.delete_selected().await,
      Action::ClearHistory => self.clear_history().await,
      Action::Export(format) => self.export(format).await,
    };
    if let Err(e) = result {
      tracing::warn!(?action, error = %e, "action failed");
      self.status_msg = format!("Error: {e}");
    }
  }

  fn session_id(&self) -> anyhow::Result<uuid::Uuid> {
    self
      .session
      .as_ref()
      .map(|s| s.session_id)
      .ok_or_else(|| anyhow::anyhow!("no active session"))
  }

  async fn refresh(&mut self) -> anyhow::Result<()> {
    let id = self.session_id()?;
    match self.screen {
      Screen::Home | Screen::Detector => {}
      Screen::Dashboard => self.stats = Some(self.client.stats(id).await?),
      Screen::History => {
        let page = self.client.list(id, self.verdict_filter, &self.search).await?;
        self.history_total = page.total;
        self.history = page.records.into_iter().rev().collect();
        self.list_cursor = self.list_cursor.min(self.history.len().saturating_sub(1));
      }
      Screen::Export => {
        let page = self.client.list(id, None, "").await?;
        self.export_records = page.records.into_iter().rev().collect();
      }
    }
    Ok(())
  }

  async fn save_settings(&mut self) -> anyhow::Result<()> {
    let id = self.session_id()?;
    let session = self.client.update_settings(id, self.settings).await?;
    self.settings = session.settings;
    self.session = Some(session);
    Ok(())
  }

  async fn fetch_preview(&mut self) -> anyhow::Result<()> {
    let input = self.input.trim().to_string();
    if input.is_empty() {
      self.status_msg = "Nothing to fetch".into();
      return Ok(());
    }
    let preview = match self.input_method {
      InputMethod::Text => {
        self.status_msg = "Pasted text needs no fetching".into();
        return Ok(());
      }
      InputMethod::Url => {
        self.status_msg = "Fetching article…".into();
        self.client.extract_url(&input).await?
      }
      InputMethod::Pdf => {
        let path = Path::new(&input);
        let bytes = tokio::fs::read(path)
          .await
          .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        let filename = path
          .file_name()
          .map(|n| n.to_string_lossy().into_owned())
          .unwrap_or_else(|| input.clone());
        self.client.extract_pdf(bytes, &filename).await?
      }
    };
    self.status_msg = format!(
      "Extracted {} characters, {} words",
      preview.stats.characters, preview.stats.words
    );
    self.preview = Some(preview);
    Ok(())
  }

  async fn analyze(&mut self) -> anyhow::Result<()> {
    let id = self.session_id()?;
    if self.preview.is_none() && self.input_method != InputMethod::Text {
      self.fetch_preview().await?;
    }
    let (text, source) = match &self.preview {
      Some(p) => (p.text.clone(), p.source.clone()),
      None => (self.input.clone(), Source::Text),
    };
    if is_blank(&text) {
      self.status_msg = "Please provide some text to analyze".into();
      return Ok(());
    }

    self.status_msg = "Analyzing…".into();
    match self.client.analyze(id, &text, &source).await {
      Ok(record) => {
        self.status_msg = format!("Analysis complete: {}", record.verdict.label());
        self.outcome = Some(Outcome::Success(record));
      }
      Err(e) => {
        let (message, raw) = match e.downcast_ref::<ApiFailure>() {
          Some(f) => (f.error.clone(), f.raw.clone()),
          None => (e.to_string(), None),
        };
        self.status_msg = format!("Analysis failed: {message}");
        self.outcome = Some(Outcome::Failure { message, raw });
      }
    }
    Ok(())
  }

  async fn delete_selected(&mut self) -> anyhow::Result<()> {
    let id = self.session_id()?;
    let Some(record_id) = self.selected_record().map(|r| r.record_id) else {
      return Ok(());
    };
    self.client.delete_record(id, record_id).await?;
    self.status_msg = "Record deleted".into();
    self.refresh().await
  }

  async fn clear_history(&mut self) -> anyhow::Result<()> {
    let id = self.session_id()?;
    let removed = self.client.clear(id).await?;
    self.history.clear();
    self.export_records.clear();
    self.list_cursor = 0;
    self.stats = None;
    self.status_msg = format!("History cleared ({removed} records)");
    Ok(())
  }

  async fn export(&mut self, format: ExportFormat) -> anyhow::Result<()> {
    let id = self.session_id()?;
    if self.export_records.is_empty() {
      self.status_msg = "No history to export".into();
      return Ok(());
    }
    let (file_name, body) = self.client.export(id, format).await?;
    tokio::fs::write(&file_name, body)
      .await
      .map_err(|e| anyhow::anyhow!("writing {file_name}: {e}"))?;
    tracing::info!(%file_name, %format, "history exported");
    self.status_msg = format!("Saved {file_name}");
    Ok(())
  }
}
