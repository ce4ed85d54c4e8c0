//! TUI rendering: header, the active view, and the status bar.

pub mod dashboard;
pub mod detector;
pub mod export;
pub mod history;
pub mod home;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Tabs},
};
use veritas_core::{record::Verdict, session::Theme};

use crate::app::{App, Mode, Screen};

// ─── Theme ───────────────────────────────────────────────────────────────────

/// Colours for one [`Theme`].
#[derive(Debug, Clone, Copy)]
pub struct Palette {
  pub bg:     Color,
  pub fg:     Color,
  pub dim:    Color,
  pub accent: Color,
  pub bar_bg: Color,
}

pub fn palette(theme: Theme) -> Palette {
  match theme {
    Theme::Light => Palette {
      bg:     Color::White,
      fg:     Color::Black,
      dim:    Color::Gray,
      accent: Color::Blue,
      bar_bg: Color::Gray,
    },
    Theme::Dark => Palette {
      bg:     Color::Black,
      fg:     Color::White,
      dim:    Color::DarkGray,
      accent: Color::Cyan,
      bar_bg: Color::DarkGray,
    },
  }
}

pub fn verdict_color(verdict: Verdict) -> Color {
  match verdict {
    Verdict::Fake => Color::Red,
    Verdict::Real => Color::Green,
    Verdict::Uncertain => Color::Yellow,
  }
}

/// A bordered block titled `title`, in the current palette.
pub fn pane(title: &str, p: Palette) -> Block<'static> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(p.dim))
    .title_style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD))
}

// ─── Root draw ───────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let p = palette(app.settings.theme);
  let area = f.area();
  f.render_widget(Block::default().style(Style::default().bg(p.bg).fg(p.fg)), area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app, p);
  draw_tabs(f, rows[1], app, p);
  match app.screen {
    Screen::Home => home::draw(f, rows[2], app, p),
    Screen::Detector => detector::draw(f, rows[2], app, p),
    Screen::Dashboard => dashboard::draw(f, rows[2], app, p),
    Screen::History => history::draw(f, rows[2], app, p),
    Screen::Export => export::draw(f, rows[2], app, p),
  }
  draw_status(f, rows[3], app, p);
}

// ─── Header ──────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " 📰 Veritas: fake news detector",
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!(
      "{}  {:?}  {}  {date} ",
      if app.model_name.is_empty() { "-" } else { app.model_name.as_str() },
      app.settings.theme,
      app.settings.language,
    ),
    Style::default().fg(Color::White),
  );

  let left_width = left.width() as u16;
  let right_width = right.width() as u16;
  let pad = area.width.saturating_sub(left_width).saturating_sub(right_width);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(p.accent)),
    area,
  );
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let titles = Screen::ALL
    .iter()
    .enumerate()
    .map(|(i, s)| format!("{} {}", i + 1, s.title()));
  let tabs = Tabs::new(titles)
    .select(app.screen.index())
    .style(Style::default().fg(p.dim))
    .highlight_style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD))
    .divider("│");
  f.render_widget(tabs, area);
}

// ─── Status bar ──────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let (mode_label, hints) = match (app.mode, app.screen) {
    (Mode::Editing, _) => ("EDIT", "Type  Esc done  Enter newline/submit"),
    (Mode::Searching, _) => ("SEARCH", "Type to search  Enter apply  Esc clear"),
    (Mode::ConfirmClear, _) => ("CONFIRM", "y clear everything  any other key cancel"),
    (Mode::Normal, Screen::Home) => ("NORMAL", "1-5/Tab views  L language  T theme  q quit"),
    (Mode::Normal, Screen::Detector) => (
      "NORMAL",
      "i edit  m method  f fetch  a analyze  x clear  q quit",
    ),
    (Mode::Normal, Screen::Dashboard) => ("NORMAL", "r refresh  1-5/Tab views  q quit"),
    (Mode::Normal, Screen::History) => (
      "NORMAL",
      "↑↓/jk select  v verdict  / search  d delete  q quit",
    ),
    (Mode::Normal, Screen::Export) => ("NORMAL", "c CSV  j JSON  X clear history  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(p.accent)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(p.fg));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(p.bar_bg)),
    area,
  );
}
