//! Answers attached to a question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An answer row as returned by the `answers` table.
///
/// `likes` and `dislikes` are maintained by the store from the `votes` table;
/// the client only displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
  pub id:          Uuid,
  pub content:     String,
  pub question_id: Uuid,
  pub user_id:     Uuid,
  pub created_at:  DateTime<Utc>,
  #[serde(default)]
  pub likes:       i64,
  #[serde(default)]
  pub dislikes:    i64,
}

/// Insert payload for the `answers` table. The store attaches the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnswer {
  pub question_id: Uuid,
  pub content:     String,
}
