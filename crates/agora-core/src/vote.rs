//! Votes and the per-user vote ledger.
//!
//! A user holds at most one vote per answer. Casting a vote upserts the
//! `(answer_id, user_id)` record; casting the same type again retracts it.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// The kind of vote cast on an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
  Like,
  Dislike,
}

impl VoteType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Like => "like",
      Self::Dislike => "dislike",
    }
  }
}

impl fmt::Display for VoteType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for VoteType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "like" => Ok(Self::Like),
      "dislike" => Ok(Self::Dislike),
      other => Err(Error::UnknownVoteType(other.to_owned())),
    }
  }
}

/// A vote row as returned by the `votes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub answer_id:   Uuid,
  pub question_id: Uuid,
  pub user_id:     Uuid,
  pub vote_type:   VoteType,
}

/// Upsert payload for the `votes` table. The store attaches the voter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVote {
  pub answer_id:   Uuid,
  pub question_id: Uuid,
  pub vote_type:   VoteType,
}

// ─── Toggle ──────────────────────────────────────────────────────────────────

/// What a vote button press turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
  /// Upsert a vote of this type, replacing any vote of the other type.
  Cast(VoteType),
  /// Delete the caller's existing vote.
  Retract,
}

impl VoteAction {
  /// Pressing the button for the vote already held retracts it; anything
  /// else casts the requested type.
  pub fn toggle(current: Option<VoteType>, requested: VoteType) -> Self {
    if current == Some(requested) {
      Self::Retract
    } else {
      Self::Cast(requested)
    }
  }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// The signed-in user's votes for one question, keyed by answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteLedger {
  votes: HashMap<Uuid, VoteType>,
}

impl VoteLedger {
  /// Fold `votes` into a ledger, keeping only those cast by `user_id`.
  /// A later record for the same answer overwrites an earlier one.
  pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>, user_id: Uuid) -> Self {
    let votes = votes
      .into_iter()
      .filter(|v| v.user_id == user_id)
      .map(|v| (v.answer_id, v.vote_type))
      .collect();
    Self { votes }
  }

  pub fn get(&self, answer_id: Uuid) -> Option<VoteType> { self.votes.get(&answer_id).copied() }

  /// The action a press of `requested` on `answer_id` should perform.
  pub fn toggle(&self, answer_id: Uuid, requested: VoteType) -> VoteAction {
    VoteAction::toggle(self.get(answer_id), requested)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn vote(answer_id: Uuid, user_id: Uuid, vote_type: VoteType) -> Vote {
    Vote { answer_id, question_id: Uuid::nil(), user_id, vote_type }
  }

  #[test]
  fn toggle_same_type_retracts() {
    assert_eq!(VoteAction::toggle(Some(VoteType::Like), VoteType::Like), VoteAction::Retract);
    assert_eq!(
      VoteAction::toggle(Some(VoteType::Dislike), VoteType::Dislike),
      VoteAction::Retract
    );
  }

  #[test]
  fn toggle_other_type_casts_replacement() {
    assert_eq!(
      VoteAction::toggle(Some(VoteType::Like), VoteType::Dislike),
      VoteAction::Cast(VoteType::Dislike)
    );
    assert_eq!(
      VoteAction::toggle(Some(VoteType::Dislike), VoteType::Like),
      VoteAction::Cast(VoteType::Like)
    );
  }

  #[test]
  fn toggle_without_vote_casts() {
    assert_eq!(VoteAction::toggle(None, VoteType::Like), VoteAction::Cast(VoteType::Like));
  }

  #[test]
  fn ledger_keeps_only_own_votes() {
    let me = Uuid::new_v4();
    let other = Uuid::new_v4();
    let a1 = Uuid::new_v4();
    let a2 = Uuid::new_v4();
    let votes = vec![
      vote(a1, me, VoteType::Like),
      vote(a1, other, VoteType::Dislike),
      vote(a2, other, VoteType::Like),
    ];

    let ledger = VoteLedger::from_votes(&votes, me);
    assert_eq!(ledger.get(a1), Some(VoteType::Like));
    assert_eq!(ledger.get(a2), None);
    assert_eq!(ledger.toggle(a1, VoteType::Like), VoteAction::Retract);
    assert_eq!(ledger.toggle(a2, VoteType::Like), VoteAction::Cast(VoteType::Like));
  }

  #[test]
  fn ledger_last_record_wins() {
    let me = Uuid::new_v4();
    let a = Uuid::new_v4();
    let votes = vec![vote(a, me, VoteType::Like), vote(a, me, VoteType::Dislike)];
    assert_eq!(VoteLedger::from_votes(&votes, me).get(a), Some(VoteType::Dislike));
  }

  #[test]
  fn vote_type_wire_form() {
    assert_eq!(serde_json::to_value(VoteType::Dislike).unwrap(), "dislike");
    assert_eq!("like".parse::<VoteType>().unwrap(), VoteType::Like);
    assert!("meh".parse::<VoteType>().is_err());
  }
}
