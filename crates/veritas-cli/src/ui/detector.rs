//! Detector view: input on the left, the latest result on the right.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span, Text},
  widgets::{Gauge, Paragraph, Tabs, Wrap},
};
use veritas_core::text::excerpt;

use super::{Palette, pane, verdict_color};
use crate::app::{App, InputMethod, Mode, Outcome};

/// Characters of extracted text shown in the preview box.
const PREVIEW_CHARS: usize = 1500;

pub fn draw(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(area);

  draw_input(f, cols[0], app, p);
  draw_result(f, cols[1], app, p);
}

// ─── Input ───────────────────────────────────────────────────────────────────

fn draw_input(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3), // method
      Constraint::Min(5),    // buffer / preview
      Constraint::Length(3), // stats
    ])
    .split(area);

  let methods = Tabs::new(InputMethod::ALL.iter().map(|m| m.label()))
    .select(
      InputMethod::ALL
        .iter()
        .position(|m| *m == app.input_method)
        .unwrap_or(0),
    )
    .style(Style::default().fg(p.dim))
    .highlight_style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD))
    .block(pane("Input method (m)", p));
  f.render_widget(methods, rows[0]);

  let editing = app.mode == Mode::Editing;
  let prompt = match app.input_method {
    InputMethod::Text => "Paste or type the news text",
    InputMethod::Pdf => "Path to a PDF file",
    InputMethod::Url => "News article URL",
  };
  let mut body = if app.input.is_empty() && !editing {
    vec![Line::from(Span::styled(
      format!("{prompt}. Press i to start typing."),
      Style::default().fg(p.dim),
    ))]
  } else {
    let mut lines: Vec<Line> = app.input.split('\n').map(|l| Line::from(l.to_string())).collect();
    if editing && let Some(last) = lines.last_mut() {
      last.push_span(Span::styled("█", Style::default().fg(p.accent)));
    }
    lines
  };

  if let Some(preview) = &app.preview {
    body.push(Line::from(""));
    let heading = match &preview.title {
      Some(title) => format!("── Preview: {title} ──"),
      None => "── Preview ──".to_string(),
    };
    body.push(Line::from(Span::styled(heading, Style::default().fg(p.accent))));
    body.extend(
      excerpt(&preview.text, PREVIEW_CHARS)
        .lines()
        .map(|l| Line::from(l.to_string())),
    );
  }

  let title = if editing { "Input (editing, Esc to finish)" } else { "Input (i)" };
  f.render_widget(
    Paragraph::new(body).wrap(Wrap { trim: false }).block(pane(title, p)),
    rows[1],
  );

  let stats = match app.input_stats() {
    Some(s) => format!(
      "Characters: {}   Words: {}   Lines: {}",
      s.characters, s.words, s.lines
    ),
    None => "No text yet".to_string(),
  };
  f.render_widget(Paragraph::new(stats).block(pane("Text statistics", p)), rows[2]);
}

// ─── Result ──────────────────────────────────────────────────────────────────

fn draw_result(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let block = pane("Analysis result", p);
  let inner = block.inner(area);
  f.render_widget(block, area);

  match &app.outcome {
    None => {
      let hint = format!(
        "Press a to analyze. The reason will be written in {}.",
        app.settings.language
      );
      f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(p.dim)).wrap(Wrap { trim: true }),
        inner,
      );
    }

    Some(Outcome::Success(record)) => {
      let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
          Constraint::Length(2), // verdict
          Constraint::Length(3), // score gauge
          Constraint::Min(0),    // reason
        ])
        .split(inner);

      let color = verdict_color(record.verdict);
      f.render_widget(
        Paragraph::new(Line::from(Span::styled(
          record.verdict.label(),
          Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))),
        rows[0],
      );

      let gauge = Gauge::default()
        .block(pane("Credibility score", p))
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(record.score))
        .label(format!("{}/100", record.score));
      f.render_widget(gauge, rows[1]);

      let mut reason = vec![Line::from(Span::styled("Reason", Style::default().fg(p.accent)))];
      reason.extend(Text::from(record.reason.clone()).lines);
      reason.push(Line::from(""));
      reason.push(Line::from(Span::styled(
        format!("{} · {} · {}", record.language, record.model, record.source.label()),
        Style::default().fg(p.dim),
      )));
      f.render_widget(Paragraph::new(reason).wrap(Wrap { trim: true }), rows[2]);
    }

    Some(Outcome::Failure { message, raw }) => {
      let mut lines = vec![Line::from(Span::styled(
        format!("Error: {message}"),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
      ))];
      if let Some(raw) = raw {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Raw model reply", Style::default().fg(p.dim))));
        lines.extend(raw.lines().map(|l| Line::from(l.to_string())));
      }
      f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
  }
}
