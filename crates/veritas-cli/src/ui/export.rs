//! Export view: the full history as a table, plus save and clear actions.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Paragraph, Row, Table},
};

use super::{Palette, pane, verdict_color};
use crate::app::{App, Mode};

pub fn draw(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(3)])
    .split(area);

  let title = format!("History ({} records)", app.export_records.len());
  if app.export_records.is_empty() {
    f.render_widget(
      Paragraph::new("No history to export.")
        .style(Style::default().fg(p.dim))
        .block(pane(&title, p)),
      rows[0],
    );
  } else {
    let header = Row::new(["Timestamp", "Verdict", "Score", "Language", "Model"])
      .style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD));
    let body = app.export_records.iter().map(|r| {
      Row::new(vec![
        Line::from(r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        Line::from(Span::styled(
          r.verdict.to_string(),
          Style::default().fg(verdict_color(r.verdict)),
        )),
        Line::from(r.score.to_string()),
        Line::from(r.language.to_string()),
        Line::from(r.model.clone()),
      ])
    });
    let table = Table::new(body, [
      Constraint::Length(20),
      Constraint::Length(10),
      Constraint::Length(6),
      Constraint::Length(12),
      Constraint::Min(10),
    ])
    .header(header)
    .block(pane(&title, p));
    f.render_widget(table, rows[0]);
  }

  let actions = if app.mode == Mode::ConfirmClear {
    Line::from(Span::styled(
      "Clear ALL history? Press y to confirm, any other key to cancel.",
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))
  } else {
    let key = Style::default().fg(p.accent).add_modifier(Modifier::BOLD);
    Line::from(vec![
      Span::styled("c", key),
      Span::raw(" save as CSV    "),
      Span::styled("j", key),
      Span::raw(" save as JSON    "),
      Span::styled("X", key),
      Span::raw(" clear history"),
    ])
  };
  f.render_widget(Paragraph::new(actions).block(pane("Actions", p)), rows[1]);
}
