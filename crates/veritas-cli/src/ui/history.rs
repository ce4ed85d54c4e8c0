//! History view: filterable list of records with a detail pane.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Modifier, Style},
  text::{Line, Span, Text},
  widgets::{List, ListItem, ListState, Paragraph, Wrap},
};
use veritas_core::record::AnalysisRecord;

use super::{Palette, pane, verdict_color};
use crate::app::{App, Mode};

pub fn draw(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)])
    .split(area);

  draw_filters(f, rows[0], app, p);

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(rows[1]);

  draw_list(f, cols[0], app, p);
  draw_detail(f, cols[1], app, p);
}

fn draw_filters(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let verdict = app
    .verdict_filter
    .map(|v| v.to_string())
    .unwrap_or_else(|| "All".to_string());

  let searching = app.mode == Mode::Searching;
  let mut search = vec![Span::raw(app.search.clone())];
  if searching {
    search.push(Span::styled("█", Style::default().fg(p.accent)));
  }

  let label = Style::default().fg(p.dim);
  let mut spans = vec![
    Span::styled("Verdict (v) ", label),
    Span::styled(verdict, Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
    Span::raw("    "),
    Span::styled("Search (/) ", label),
  ];
  spans.extend(search);

  let title = format!("Showing {} of {}", app.history.len(), app.history_total);
  f.render_widget(Paragraph::new(Line::from(spans)).block(pane(&title, p)), area);
}

fn draw_list(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  if app.history.is_empty() {
    let msg = if app.history_total == 0 {
      "No analyses yet."
    } else {
      "No records match the current filters."
    };
    f.render_widget(
      Paragraph::new(msg).style(Style::default().fg(p.dim)).block(pane("Records", p)),
      area,
    );
    return;
  }

  let items: Vec<ListItem> = app
    .history
    .iter()
    .map(|r| {
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:<10}", r.verdict.to_string()),
          Style::default().fg(verdict_color(r.verdict)),
        ),
        Span::styled(format!("{:>3}  ", r.score), Style::default().fg(p.dim)),
        Span::raw(r.timestamp.format("%m-%d %H:%M  ").to_string()),
        Span::raw(r.excerpt.replace('\n', " ")),
      ]))
    })
    .collect();

  let list = List::new(items)
    .block(pane("Records", p))
    .highlight_style(Style::default().fg(p.bg).bg(p.accent))
    .highlight_symbol("▸ ");

  let mut state = ListState::default().with_selected(Some(app.list_cursor));
  f.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let Some(record) = app.selected_record() else {
    f.render_widget(pane("Details", p), area);
    return;
  };

  f.render_widget(
    Paragraph::new(detail_lines(record, p))
      .wrap(Wrap { trim: true })
      .block(pane("Details", p)),
    area,
  );
}

/// The detail pane for one record. Reason and text keep their line breaks.
fn detail_lines(record: &AnalysisRecord, p: Palette) -> Vec<Line<'static>> {
  let label = Style::default().fg(p.dim);
  let color = verdict_color(record.verdict);
  let mut lines = vec![
    Line::from(Span::styled(
      record.verdict.label(),
      Style::default().fg(color).add_modifier(Modifier::BOLD),
    )),
    Line::from(vec![
      Span::styled("Score ", label),
      Span::styled(format!("{}/100", record.score), Style::default().fg(color)),
    ]),
    Line::from(vec![
      Span::styled("When ", label),
      Span::raw(record.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    ]),
    Line::from(vec![
      Span::styled("Language ", label),
      Span::raw(record.language.to_string()),
      Span::styled("   Model ", label),
      Span::raw(record.model.clone()),
    ]),
    Line::from(vec![Span::styled("Source ", label), Span::raw(record.source.label())]),
    Line::from(""),
    Line::from(Span::styled("Reason", Style::default().fg(p.accent))),
  ];
  lines.extend(Text::from(record.reason.clone()).lines);
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled("Text", Style::default().fg(p.accent))));
  lines.extend(Text::from(record.excerpt.clone()).lines);
  lines
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use veritas_core::{
    record::{Assessment, Language, NewAnalysis, Source, Verdict},
    session::Theme,
  };

  use super::*;
  use crate::ui::palette;

  #[test]
  fn detail_keeps_line_breaks() {
    let record = NewAnalysis {
      full_text:  "First paragraph.\nSecond paragraph.".into(),
      source:     Source::Text,
      assessment: Assessment {
        verdict:           Verdict::Fake,
        reason:            "No source cited.\nDates do not match.".into(),
        credibility_score: 12,
      },
      language:   Language::English,
      model:      "gemini-1.5-flash".into(),
    }
    .into_record(Utc::now());

    let text: Vec<String> = detail_lines(&record, palette(Theme::Light))
      .iter()
      .map(|line| line.to_string())
      .collect();

    let reason = text.iter().position(|l| l == "Reason").unwrap();
    assert_eq!(text[reason + 1], "No source cited.");
    assert_eq!(text[reason + 2], "Dates do not match.");
    assert_eq!(text[text.len() - 2], "First paragraph.");
    assert_eq!(text[text.len() - 1], "Second paragraph.");
  }
}
