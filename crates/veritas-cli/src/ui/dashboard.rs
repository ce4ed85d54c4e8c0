//! Dashboard view: aggregate counts, score distribution and recent activity.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::{Bar, BarChart, BarGroup, Paragraph, Row, Table},
};
use veritas_core::stats::DashboardStats;

use super::{Palette, pane, verdict_color};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App, p: Palette) {
  let Some(stats) = &app.stats else {
    f.render_widget(
      Paragraph::new("No statistics loaded yet. Press r to refresh.")
        .style(Style::default().fg(p.dim))
        .block(pane("Dashboard", p)),
      area,
    );
    return;
  };

  if stats.total == 0 {
    f.render_widget(
      Paragraph::new("No analyses yet. Run one from the Detector view.")
        .style(Style::default().fg(p.dim))
        .block(pane("Dashboard", p)),
      area,
    );
    return;
  }

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3),      // metrics
      Constraint::Percentage(55), // charts
      Constraint::Min(4),         // recent
    ])
    .split(area);

  draw_metrics(f, rows[0], stats, p);

  let charts = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(rows[1]);
  draw_verdicts(f, charts[0], stats, p);
  draw_histogram(f, charts[1], stats, p);

  draw_recent(f, rows[2], stats, p);
}

fn draw_metrics(f: &mut Frame, area: Rect, stats: &DashboardStats, p: Palette) {
  let avg = stats
    .average_score
    .map(|a| format!("{a:.1}"))
    .unwrap_or_else(|| "-".to_string());

  let label = Style::default().fg(p.dim);
  let value = Style::default().fg(p.accent).add_modifier(Modifier::BOLD);
  let mut spans = vec![
    Span::styled("Total ", label),
    Span::styled(stats.total.to_string(), value),
    Span::raw("    "),
    Span::styled("Average score ", label),
    Span::styled(avg, value),
  ];
  for (verdict, count) in stats.verdict_counts() {
    spans.push(Span::raw("    "));
    spans.push(Span::styled(format!("{verdict} "), label));
    spans.push(Span::styled(
      count.to_string(),
      Style::default().fg(verdict_color(verdict)).add_modifier(Modifier::BOLD),
    ));
  }

  f.render_widget(Paragraph::new(Line::from(spans)).block(pane("Overview", p)), area);
}

fn draw_verdicts(f: &mut Frame, area: Rect, stats: &DashboardStats, p: Palette) {
  let bars: Vec<Bar> = stats
    .verdict_counts()
    .into_iter()
    .map(|(verdict, count)| {
      Bar::default()
        .label(Line::from(verdict.to_string()))
        .value(count as u64)
        .style(Style::default().fg(verdict_color(verdict)))
    })
    .collect();

  let chart = BarChart::default()
    .block(pane("Verdicts", p))
    .data(BarGroup::default().bars(&bars))
    .bar_width(8)
    .bar_gap(2);
  f.render_widget(chart, area);
}

fn draw_histogram(f: &mut Frame, area: Rect, stats: &DashboardStats, p: Palette) {
  let bars: Vec<Bar> = stats
    .score_histogram
    .iter()
    .enumerate()
    .map(|(i, count)| {
      Bar::default()
        .label(Line::from(format!("{}", i * 10)))
        .value(*count as u64)
        .style(Style::default().fg(p.accent))
    })
    .collect();

  let chart = BarChart::default()
    .block(pane("Credibility scores", p))
    .data(BarGroup::default().bars(&bars))
    .bar_width(4)
    .bar_gap(1);
  f.render_widget(chart, area);
}

fn draw_recent(f: &mut Frame, area: Rect, stats: &DashboardStats, p: Palette) {
  let header = Row::new(["Time", "Verdict", "Score"])
    .style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD));

  let rows = stats.recent.iter().map(|entry| {
    Row::new(vec![
      Line::from(entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
      Line::from(Span::styled(
        entry.verdict.label(),
        Style::default().fg(verdict_color(entry.verdict)),
      )),
      Line::from(entry.score.to_string()),
    ])
  });

  let table = Table::new(rows, [
    Constraint::Length(20),
    Constraint::Length(16),
    Constraint::Length(6),
  ])
  .header(header)
  .block(pane("Recent activity", p));
  f.render_widget(table, area);
}
