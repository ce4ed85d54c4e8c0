//! Home view: what the tool does and how to drive it.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::{Paragraph, Wrap},
};
use strum::IntoEnumIterator as _;
use veritas_core::record::Language;

use super::{Palette, pane};
use crate::app::{App, InputMethod};

pub fn draw(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  let heading = Style::default().fg(p.accent).add_modifier(Modifier::BOLD);

  let mut about = vec![
    Line::from(Span::styled("Detect misinformation with a hosted language model", heading)),
    Line::from(""),
    Line::from(
      "Paste a news text, point at a PDF, or give a URL. The text is sent to the \
       model, which answers with a verdict (Fake, Real or Uncertain), a credibility \
       score from 0 to 100 and a short reason in your chosen language.",
    ),
    Line::from(""),
    Line::from(
      "Every analysis is kept in this session's history, where it can be filtered, \
       searched, deleted or exported as CSV or JSON. Nothing is stored once you quit.",
    ),
    Line::from(""),
    Line::from(Span::styled("Input methods", heading)),
  ];
  about.extend(
    InputMethod::ALL
      .iter()
      .map(|m| Line::from(format!("  • {}", m.label()))),
  );
  about.push(Line::from(""));
  about.push(Line::from(Span::styled("Supported languages", heading)));
  about.extend(Language::iter().map(|l| {
    let marker = if l == app.settings.language { "▸" } else { " " };
    Line::from(format!(" {marker} {l}"))
  }));
  if !app.model_ready {
    about.push(Line::from(""));
    about.push(Line::from(Span::styled(
      "The server has no API key configured; analyses will fail.",
      Style::default().fg(ratatui::style::Color::Yellow),
    )));
  }

  f.render_widget(
    Paragraph::new(about).wrap(Wrap { trim: false }).block(pane("Home", p)),
    cols[0],
  );

  let keys = [
    ("1-5, Tab", "switch view"),
    ("L", "cycle output language"),
    ("T", "toggle light/dark theme"),
    ("r", "refresh the current view"),
    ("q, Ctrl-C", "quit and end the session"),
    ("", ""),
    ("Detector", ""),
    ("i / Esc", "start / stop editing"),
    ("m", "change input method"),
    ("f", "fetch URL or PDF preview"),
    ("a", "analyze"),
    ("", ""),
    ("History", ""),
    ("v", "cycle verdict filter"),
    ("/", "search text"),
    ("d", "delete selected record"),
    ("", ""),
    ("Export", ""),
    ("c / j", "save CSV / JSON"),
    ("X", "clear all history"),
  ];
  let lines: Vec<Line> = keys
    .iter()
    .map(|(k, what)| {
      if what.is_empty() {
        Line::from(Span::styled(*k, heading))
      } else {
        Line::from(vec![
          Span::styled(format!("{k:<12}"), Style::default().fg(p.accent)),
          Span::raw(*what),
        ])
      }
    })
    .collect();
  f.render_widget(Paragraph::new(lines).block(pane("Keys", p)), cols[1]);
}
