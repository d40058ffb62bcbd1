//! "Ask a Question" modal drawn over the catalog.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::{centered, login::field_line};
use crate::app::form::{AskField, AskForm};

pub fn draw(f: &mut Frame, area: Rect, form: &AskForm) {
  let rect = centered(area, 70, 9);
  let block = Block::default()
    .title(" Ask a Question ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));
  let inner = block.inner(rect);
  f.render_widget(Clear, rect);
  f.render_widget(block, rect);

  let mut lines = vec![
    field_line("Title", &form.title, form.focus == AskField::Title),
    field_line("Details", &form.content, form.focus == AskField::Content),
    Line::from(""),
  ];
  if let Some(err) = &form.error {
    lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
