//! Question catalog pane: filter tabs over the question list.

use agora_core::question::{Question, QuestionFilter};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
};

use crate::app::catalog::Catalog;

/// Render the filter tabs and the question list into `area`.
pub fn draw(f: &mut Frame, area: Rect, catalog: &Catalog) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(area);

  draw_tabs(f, rows[0], catalog.filter);

  let block = Block::default()
    .title(format!(" Questions ({}) ", catalog.questions.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(rows[1]);
  f.render_widget(block, rows[1]);

  if let Some(err) = &catalog.error {
    f.render_widget(
      Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red)),
      inner,
    );
    return;
  }

  if catalog.questions.is_empty() {
    f.render_widget(
      Paragraph::new(EMPTY_CATALOG).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = catalog.questions.iter().map(question_item).collect();

  let mut state = ListState::default();
  state.select(Some(catalog.cursor));

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    inner,
    &mut state,
  );
}

fn draw_tabs(f: &mut Frame, area: Rect, filter: QuestionFilter) {
  let titles = QuestionFilter::ALL
    .iter()
    .enumerate()
    .map(|(i, tab)| format!("{} {}", i + 1, tab.label()));
  let selected = QuestionFilter::ALL
    .iter()
    .position(|tab| *tab == filter)
    .unwrap_or_default();
  f.render_widget(
    Tabs::new(titles)
      .select(selected)
      .style(Style::default().fg(Color::Gray))
      .highlight_style(
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
      ),
    area,
  );
}

pub const EMPTY_CATALOG: &str = "No questions found. Be the first to ask one!";

/// Two rows per question: badge, title and date, then the body's first line.
fn question_item(q: &Question) -> ListItem<'static> {
  let badge = if q.is_answered {
    Span::styled("✓ Answered   ", Style::default().fg(Color::Green))
  } else {
    Span::styled("✗ Unanswered ", Style::default().fg(Color::Yellow))
  };
  let excerpt = q.content.lines().next().unwrap_or_default().to_owned();
  ListItem::new(vec![
    Line::from(vec![
      badge,
      Span::styled(q.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
      Span::styled(
        format!("  {}", q.created_at.format("%Y-%m-%d")),
        Style::default().fg(Color::DarkGray),
      ),
    ]),
    Line::from(Span::styled(
      format!("             {excerpt}"),
      Style::default().fg(Color::Gray),
    )),
  ])
}
