//! Backends for exercising error and confirmation paths.

use agora_core::{
  answer::{Answer, NewAnswer},
  backend::ForumBackend,
  question::{NewQuestion, Question, QuestionFilter},
  session::{AuthBroadcaster, Credentials, Session, Subscription, User},
  vote::{NewVote, Vote},
};
use agora_store_sqlite::SqliteBackend;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("backend unavailable")]
pub struct Down;

/// Rejects everything. Session lookups also fail.
pub struct Unavailable;

impl ForumBackend for Unavailable {
  type Error = Down;

  async fn get_session(&self) -> Result<Option<Session>, Down> { Err(Down) }
  async fn get_user(&self) -> Result<Option<User>, Down> { Err(Down) }
  async fn sign_in(&self, _: Credentials) -> Result<Session, Down> { Err(Down) }
  async fn sign_up(&self, _: Credentials) -> Result<Option<Session>, Down> { Err(Down) }
  async fn sign_out(&self) -> Result<(), Down> { Err(Down) }
  fn subscribe(&self) -> Subscription { AuthBroadcaster::new().subscribe() }
  async fn list_questions(&self, _: QuestionFilter) -> Result<Vec<Question>, Down> { Err(Down) }
  async fn get_question(&self, _: Uuid) -> Result<Option<Question>, Down> { Err(Down) }
  async fn insert_question(&self, _: NewQuestion) -> Result<Question, Down> { Err(Down) }
  async fn delete_question(&self, _: Uuid) -> Result<(), Down> { Err(Down) }
  async fn list_answers(&self, _: Uuid) -> Result<Vec<Answer>, Down> { Err(Down) }
  async fn insert_answer(&self, _: NewAnswer) -> Result<Answer, Down> { Err(Down) }
  async fn delete_answer(&self, _: Uuid) -> Result<(), Down> { Err(Down) }
  async fn list_votes(&self, _: Uuid) -> Result<Vec<Vote>, Down> { Err(Down) }
  async fn upsert_vote(&self, _: NewVote) -> Result<(), Down> { Err(Down) }
  async fn delete_vote(&self, _: Uuid) -> Result<(), Down> { Err(Down) }
}

// ─── Scripted ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ScriptedError {
  #[error(transparent)]
  Store(#[from] agora_store_sqlite::Error),
  #[error("logout request failed")]
  SignOut,
}

/// An in-memory store with switchable hosted-auth behaviour.
pub struct Scripted {
  pub inner:           SqliteBackend,
  /// `sign_up` answers "confirmation pending" and creates nothing.
  pub confirm_sign_up: bool,
  /// `sign_out` clears the session, then reports a failure.
  pub fail_sign_out:   bool,
}

impl Scripted {
  pub async fn new() -> Self {
    Self {
      inner:           SqliteBackend::open_in_memory().await.unwrap(),
      confirm_sign_up: false,
      fail_sign_out:   false,
    }
  }
}

impl ForumBackend for Scripted {
  type Error = ScriptedError;

  async fn get_session(&self) -> Result<Option<Session>, ScriptedError> {
    Ok(self.inner.get_session().await?)
  }

  async fn get_user(&self) -> Result<Option<User>, ScriptedError> {
    Ok(self.inner.get_user().await?)
  }

  async fn sign_in(&self, credentials: Credentials) -> Result<Session, ScriptedError> {
    Ok(self.inner.sign_in(credentials).await?)
  }

  async fn sign_up(&self, credentials: Credentials) -> Result<Option<Session>, ScriptedError> {
    if self.confirm_sign_up {
      return Ok(None);
    }
    Ok(self.inner.sign_up(credentials).await?)
  }

  async fn sign_out(&self) -> Result<(), ScriptedError> {
    self.inner.sign_out().await?;
    if self.fail_sign_out {
      return Err(ScriptedError::SignOut);
    }
    Ok(())
  }

  fn subscribe(&self) -> Subscription { self.inner.subscribe() }

  async fn list_questions(&self, filter: QuestionFilter) -> Result<Vec<Question>, ScriptedError> {
    Ok(self.inner.list_questions(filter).await?)
  }

  async fn get_question(&self, id: Uuid) -> Result<Option<Question>, ScriptedError> {
    Ok(self.inner.get_question(id).await?)
  }

  async fn insert_question(&self, question: NewQuestion) -> Result<Question, ScriptedError> {
    Ok(self.inner.insert_question(question).await?)
  }

  async fn delete_question(&self, id: Uuid) -> Result<(), ScriptedError> {
    Ok(self.inner.delete_question(id).await?)
  }

  async fn list_answers(&self, question_id: Uuid) -> Result<Vec<Answer>, ScriptedError> {
    Ok(self.inner.list_answers(question_id).await?)
  }

  async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer, ScriptedError> {
    Ok(self.inner.insert_answer(answer).await?)
  }

  async fn delete_answer(&self, id: Uuid) -> Result<(), ScriptedError> {
    Ok(self.inner.delete_answer(id).await?)
  }

  async fn list_votes(&self, question_id: Uuid) -> Result<Vec<Vote>, ScriptedError> {
    Ok(self.inner.list_votes(question_id).await?)
  }

  async fn upsert_vote(&self, vote: NewVote) -> Result<(), ScriptedError> {
    Ok(self.inner.upsert_vote(vote).await?)
  }

  async fn delete_vote(&self, answer_id: Uuid) -> Result<(), ScriptedError> {
    Ok(self.inner.delete_vote(answer_id).await?)
  }
}
