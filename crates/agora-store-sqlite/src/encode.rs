//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed number of
//! fractional digits so that `ORDER BY created_at` sorts chronologically.
//! UUIDs are stored as hyphenated lowercase strings.

use agora_core::{answer::Answer, question::Question, vote::Vote};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const QUESTION_COLUMNS: &str = "id, title, content, user_id, created_at, is_answered";

/// Raw values read directly from a `questions` row.
pub struct RawQuestion {
  pub id:          String,
  pub title:       String,
  pub content:     String,
  pub user_id:     String,
  pub created_at:  String,
  pub is_answered: bool,
}

impl RawQuestion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      content:     row.get(2)?,
      user_id:     row.get(3)?,
      created_at:  row.get(4)?,
      is_answered: row.get(5)?,
    })
  }

  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      id:          decode_uuid(&self.id)?,
      title:       self.title,
      content:     self.content,
      user_id:     decode_uuid(&self.user_id)?,
      created_at:  decode_dt(&self.created_at)?,
      is_answered: self.is_answered,
    })
  }
}

pub const ANSWER_COLUMNS: &str = "id, content, question_id, user_id, created_at, likes, dislikes";

/// Raw values read directly from an `answers` row.
pub struct RawAnswer {
  pub id:          String,
  pub content:     String,
  pub question_id: String,
  pub user_id:     String,
  pub created_at:  String,
  pub likes:       i64,
  pub dislikes:    i64,
}

impl RawAnswer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      content:     row.get(1)?,
      question_id: row.get(2)?,
      user_id:     row.get(3)?,
      created_at:  row.get(4)?,
      likes:       row.get(5)?,
      dislikes:    row.get(6)?,
    })
  }

  pub fn into_answer(self) -> Result<Answer> {
    Ok(Answer {
      id:          decode_uuid(&self.id)?,
      content:     self.content,
      question_id: decode_uuid(&self.question_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      created_at:  decode_dt(&self.created_at)?,
      likes:       self.likes,
      dislikes:    self.dislikes,
    })
  }
}

/// Raw values read directly from a `votes` row.
pub struct RawVote {
  pub answer_id:   String,
  pub question_id: String,
  pub user_id:     String,
  pub vote_type:   String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      answer_id:   decode_uuid(&self.answer_id)?,
      question_id: decode_uuid(&self.question_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      vote_type:   self.vote_type.parse()?,
    })
  }
}
