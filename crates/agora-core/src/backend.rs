//! The `ForumBackend` trait.
//!
//! A backend is the hosted table store plus its auth service. It is
//! implemented by the Supabase REST client in `agora-cli` and by
//! `agora-store-sqlite` for local use. Ownership checks, the answered flag,
//! vote counts, and the one-vote-per-user constraint are all the backend's
//! job; callers only forward requests.

use std::future::Future;

use uuid::Uuid;

use crate::{
  answer::{Answer, NewAnswer},
  question::{NewQuestion, Question, QuestionFilter},
  session::{Credentials, Session, Subscription, User},
  vote::{NewVote, Vote},
};

/// Abstraction over the remote forum store.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait ForumBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Auth ──────────────────────────────────────────────────────────────

  /// The locally held session, if any. Does not contact the server.
  fn get_session(
    &self,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// The user behind the current session, validated against the auth
  /// service. `None` when signed out.
  fn get_user(&self) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn sign_in(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Register a new account. Returns `None` when the service requires
  /// confirmation before a session is issued.
  fn sign_up(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Subscribe to auth-state changes emitted by this backend.
  fn subscribe(&self) -> Subscription;

  // ── Questions ─────────────────────────────────────────────────────────

  /// All questions passing `filter`, newest first.
  fn list_questions(
    &self,
    filter: QuestionFilter,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  /// One question by id. `None` if it does not exist.
  fn get_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  fn insert_question(
    &self,
    input: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  fn delete_question(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Answers ───────────────────────────────────────────────────────────

  /// Answers to `question_id`, oldest first.
  fn list_answers(
    &self,
    question_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  fn insert_answer(
    &self,
    input: NewAnswer,
  ) -> impl Future<Output = Result<Answer, Self::Error>> + Send + '_;

  fn delete_answer(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Votes recorded against answers of `question_id`.
  fn list_votes(
    &self,
    question_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + '_;

  /// Insert or replace the current user's vote on `input.answer_id`.
  fn upsert_vote(&self, input: NewVote)
  -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the current user's vote on `answer_id`.
  fn delete_vote(
    &self,
    answer_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
