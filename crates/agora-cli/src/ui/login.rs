//! Sign-in / sign-up form.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use super::centered;
use crate::app::form::{AuthMode, LoginField, LoginForm, TextField};

pub fn draw(f: &mut Frame, area: Rect, form: &LoginForm) {
  let title = match form.mode {
    AuthMode::SignIn => " Sign In ",
    AuthMode::SignUp => " Sign Up ",
  };
  let rect = centered(area, 56, 10);

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(rect);
  f.render_widget(Clear, rect);
  f.render_widget(block, rect);

  let mut lines = vec![
    field_line("Email", &form.email, form.focus == LoginField::Email),
    field_line("Password", &form.password, form.focus == LoginField::Password),
    Line::from(""),
  ];

  if let Some(err) = &form.error {
    lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
  } else if let Some(notice) = &form.notice {
    lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Green))));
  } else {
    lines.push(Line::from(""));
  }

  let switch = match form.mode {
    AuthMode::SignIn => "No account? Ctrl-T to sign up",
    AuthMode::SignUp => "Have an account? Ctrl-T to sign in",
  };
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(switch, Style::default().fg(Color::DarkGray))));

  f.render_widget(Paragraph::new(lines), inner);
}

/// One labelled input row; the focused row gets a cursor.
pub(crate) fn field_line(label: &str, field: &TextField, focused: bool) -> Line<'static> {
  let label_style = if focused {
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };
  let cursor = if focused { "_" } else { "" };
  Line::from(vec![
    Span::styled(format!("{label:<10}"), label_style),
    Span::raw(format!("{}{cursor}", field.display())),
  ])
}
