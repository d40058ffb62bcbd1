//! Questions and the catalog filter.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A question row as returned by the `questions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id:          Uuid,
  pub title:       String,
  pub content:     String,
  pub user_id:     Uuid,
  pub created_at:  DateTime<Utc>,
  /// Whether the question has at least one answer. Maintained by the store.
  pub is_answered: bool,
}

/// Insert payload for the `questions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
  pub title:   String,
  pub content: String,
  pub user_id: Uuid,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Catalog filter over the derived answered flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionFilter {
  #[default]
  All,
  Answered,
  Unanswered,
}

impl QuestionFilter {
  pub const ALL: [QuestionFilter; 3] = [Self::All, Self::Answered, Self::Unanswered];

  /// The equality predicate on `is_answered`, or `None` for no predicate.
  pub fn answered_flag(self) -> Option<bool> {
    match self {
      Self::All => None,
      Self::Answered => Some(true),
      Self::Unanswered => Some(false),
    }
  }

  /// The next filter in display order, wrapping around.
  pub fn next(self) -> Self {
    match self {
      Self::All => Self::Answered,
      Self::Answered => Self::Unanswered,
      Self::Unanswered => Self::All,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::All => "All Questions",
      Self::Answered => "Answered",
      Self::Unanswered => "Unanswered",
    }
  }
}

impl fmt::Display for QuestionFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::All => "all",
      Self::Answered => "answered",
      Self::Unanswered => "unanswered",
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filter_predicates() {
    assert_eq!(QuestionFilter::All.answered_flag(), None);
    assert_eq!(QuestionFilter::Answered.answered_flag(), Some(true));
    assert_eq!(QuestionFilter::Unanswered.answered_flag(), Some(false));
  }

  #[test]
  fn filter_cycles_through_all_variants() {
    let mut f = QuestionFilter::All;
    for expected in [QuestionFilter::Answered, QuestionFilter::Unanswered, QuestionFilter::All] {
      f = f.next();
      assert_eq!(f, expected);
    }
  }

  #[test]
  fn filter_display_is_the_wire_name() {
    let names: Vec<String> = QuestionFilter::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(names, ["all", "answered", "unanswered"]);
  }

  #[test]
  fn question_deserialises_from_table_row() {
    let row = serde_json::json!({
      "id": "7d0d6f0e-58a4-4c52-a8d0-6e2f8c0a9b11",
      "title": "How do lifetimes work?",
      "content": "Asking for a friend.",
      "user_id": "0b8e6a34-3b55-4b0c-9a51-3f0e1f3a2c77",
      "created_at": "2024-03-01T12:30:00.123456+00:00",
      "is_answered": false
    });
    let q: Question = serde_json::from_value(row).unwrap();
    assert_eq!(q.title, "How do lifetimes work?");
    assert!(!q.is_answered);
  }
}
