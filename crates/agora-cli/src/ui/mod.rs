//! TUI rendering: header, per-screen body, status bar.

pub mod ask_dialog;
pub mod login;
pub mod question_detail;
pub mod question_list;

use agora_core::backend::ForumBackend;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<B: ForumBackend + 'static>(f: &mut Frame, app: &App<B>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<B: ForumBackend + 'static>(f: &mut Frame, area: Rect, app: &App<B>) {
  let left = Span::styled(
    " agora  Q&A forum",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = match app.session.state().user() {
    Some(user) => Span::styled(
      format!("{}  [S] sign out ", user.email),
      Style::default().fg(Color::Gray),
    ),
    None => Span::raw(""),
  };

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<B: ForumBackend + 'static>(f: &mut Frame, area: Rect, app: &App<B>) {
  match app.screen() {
    Screen::Starting => {
      f.render_widget(
        Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray)),
        area,
      );
    }
    Screen::Login => login::draw(f, area, &app.login),
    Screen::Catalog => {
      question_list::draw(f, area, &app.catalog);
      if let Some(form) = &app.ask {
        ask_dialog::draw(f, area, form);
      }
    }
    Screen::Detail => {
      if let Some(thread) = &app.thread {
        question_detail::draw(f, area, app, thread);
      }
    }
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<B: ForumBackend + 'static>(f: &mut Frame, area: Rect, app: &App<B>) {
  let (mode_label, hints) = match app.screen() {
    Screen::Starting => ("START", ""),
    Screen::Login => ("LOGIN", "Tab switch field  Enter submit  Ctrl-T sign in/up  Esc quit"),
    Screen::Catalog if app.ask.is_some() => ("ASK", "Tab switch field  Enter next/post  Esc cancel"),
    Screen::Catalog => (
      "LIST",
      "↑↓/jk navigate  Enter open  Tab/1-3 filter  n ask  r reload  q quit",
    ),
    Screen::Detail if app.composing => ("ANSWER", "Type your answer  Enter post  Esc stop"),
    Screen::Detail => (
      "DETAIL",
      "↑↓/jk select  +/- vote  a answer  d/D delete  Esc back  q quit",
    ),
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
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// A rectangle of `width` x `height` centred in `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn centered_clamps_to_area() {
    let area = Rect { x: 0, y: 0, width: 40, height: 10 };
    assert_eq!(centered(area, 20, 4), Rect { x: 10, y: 3, width: 20, height: 4 });
    assert_eq!(centered(area, 80, 20), area);
  }
}
