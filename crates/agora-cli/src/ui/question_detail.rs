//! Question detail pane: the question, its answers, votes, and the composer.

use agora_core::{
  answer::Answer,
  backend::ForumBackend,
  session::SessionState,
  vote::VoteType,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{
  App,
  thread::{Thread, ThreadStatus},
};

// ─── Public entry ─────────────────────────────────────────────────────────────

pub fn draw<B: ForumBackend + 'static>(f: &mut Frame, area: Rect, app: &App<B>, thread: &Thread) {
  let session = app.session.state();

  let question = match (&thread.status, &thread.question) {
    (ThreadStatus::NotFound, _) => return message(f, area, "Question not found", Color::Yellow),
    (ThreadStatus::Failed(msg), _) => return message(f, area, msg, Color::Red),
    (ThreadStatus::Ready, None) => return message(f, area, "Question not found", Color::Yellow),
    (ThreadStatus::Ready, Some(q)) => q,
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(3)])
    .split(area);

  let block = Block::default()
    .title(format!(" {} ", question.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(rows[0]);
  f.render_widget(block, rows[0]);

  let mut lines: Vec<Line> = Vec::new();
  for text in question.content.lines() {
    lines.push(Line::from(text.to_owned()));
  }
  lines.push(Line::from(""));

  let mut meta = vec![Span::styled(
    format!("Posted {}", question.created_at.format("%Y-%m-%d %H:%M")),
    Style::default().fg(Color::DarkGray),
  )];
  if thread.can_delete_question(session) {
    meta.push(Span::styled("  [D] delete question", Style::default().fg(Color::Red)));
  }
  lines.push(Line::from(meta));
  lines.push(Line::from(""));

  lines.push(Line::from(Span::styled(
    answer_count(thread.answers.len()),
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )));

  // Each answer is two lines plus a spacer; track where the cursor's starts.
  let mut cursor_line = 0usize;
  for (i, answer) in thread.answers.iter().enumerate() {
    if i == thread.cursor {
      cursor_line = lines.len();
    }
    lines.push(Line::from(""));
    lines.extend(answer_lines(thread, session, answer, i == thread.cursor));
  }

  if let Some(notice) = &thread.notice {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Red))));
  }

  let visible = inner.height as usize;
  let scroll = cursor_line.saturating_sub(visible / 2) as u16;
  f.render_widget(
    Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)),
    inner,
  );

  draw_composer(f, rows[1], app);
}

// ─── Answers ──────────────────────────────────────────────────────────────────

fn answer_count(n: usize) -> String {
  if n == 1 { "1 Answer".to_owned() } else { format!("{n} Answers") }
}

fn answer_lines(
  thread: &Thread,
  session: &SessionState,
  answer: &Answer,
  selected: bool,
) -> Vec<Line<'static>> {
  let marker = if selected { "▶ " } else { "  " };
  let body_style = if selected {
    Style::default().add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  };

  let mine = thread.votes.get(answer.id);
  let vote_style = |kind: VoteType| {
    if mine == Some(kind) {
      Style::default()
        .fg(Color::Black)
        .bg(match kind {
          VoteType::Like => Color::Green,
          VoteType::Dislike => Color::Red,
        })
    } else {
      Style::default().fg(Color::Gray)
    }
  };

  let mut meta = vec![
    Span::raw("  "),
    Span::styled(format!("▲ {}", answer.likes), vote_style(VoteType::Like)),
    Span::raw(" "),
    Span::styled(format!("▼ {}", answer.dislikes), vote_style(VoteType::Dislike)),
    Span::styled(
      format!("  {}", answer.created_at.format("%Y-%m-%d %H:%M")),
      Style::default().fg(Color::DarkGray),
    ),
  ];
  if thread.can_delete_answer(session, answer) {
    meta.push(Span::styled("  [d] delete", Style::default().fg(Color::Red)));
  }

  vec![
    Line::from(vec![
      Span::styled(marker, Style::default().fg(Color::Cyan)),
      Span::styled(answer.content.clone(), body_style),
    ]),
    Line::from(meta),
  ]
}

// ─── Composer ─────────────────────────────────────────────────────────────────

fn draw_composer<B: ForumBackend + 'static>(f: &mut Frame, area: Rect, app: &App<B>) {
  let border = if app.composing { Color::Cyan } else { Color::DarkGray };
  let block = Block::default()
    .title(" Your Answer ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let text = if app.composing {
    Line::from(format!("{}_", app.draft.value))
  } else if app.draft.is_blank() {
    Line::from(Span::styled("Press a to write an answer", Style::default().fg(Color::DarkGray)))
  } else {
    Line::from(app.draft.value.clone())
  };

  f.render_widget(Paragraph::new(text).block(block), area);
}

fn message(f: &mut Frame, area: Rect, text: &str, color: Color) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(
    Paragraph::new(text.to_owned())
      .style(Style::default().fg(color))
      .block(block),
    area,
  );
}
