//! Question detail and its answer thread, including vote toggling.

use agora_core::{
  answer::{Answer, NewAnswer},
  backend::ForumBackend,
  question::Question,
  session::SessionState,
  vote::{NewVote, VoteAction, VoteLedger, VoteType},
};
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadStatus {
  Ready,
  /// The question query succeeded but returned nothing.
  NotFound,
  /// A load query failed; holds the message to show.
  Failed(String),
}

/// One question with its answers and the signed-in user's votes.
#[derive(Debug)]
pub struct Thread {
  pub question_id: Uuid,
  pub question:    Option<Question>,
  /// Oldest first.
  pub answers:     Vec<Answer>,
  pub votes:       VoteLedger,
  pub status:      ThreadStatus,
  /// Failure of the last submit, vote, or delete.
  pub notice:      Option<String>,
  pub cursor:      usize,
}

impl Thread {
  /// Fetch everything the detail view of `question_id` shows.
  pub async fn open<B: ForumBackend>(
    backend: &B,
    session: &SessionState,
    question_id: Uuid,
  ) -> Self {
    let mut thread = Self {
      question_id,
      question: None,
      answers: Vec::new(),
      votes: VoteLedger::default(),
      // Overwritten by the first load.
      status: ThreadStatus::NotFound,
      notice: None,
      cursor: 0,
    };
    thread.refresh(backend, session).await;
    thread
  }

  /// Re-fetch the question, its answers, and the caller's votes.
  pub async fn refresh<B: ForumBackend>(&mut self, backend: &B, session: &SessionState) {
    self.load(backend).await;
    self.load_votes(backend, session).await;
  }

  /// Fetch the question, then its answers.
  pub async fn load<B: ForumBackend>(&mut self, backend: &B) {
    let question = match backend.get_question(self.question_id).await {
      Ok(Some(q)) => q,
      Ok(None) => {
        self.question = None;
        self.answers.clear();
        self.status = ThreadStatus::NotFound;
        return;
      }
      Err(e) => {
        error!(question_id = %self.question_id, error = %e, "error loading question");
        self.status = ThreadStatus::Failed("Failed to load question".into());
        return;
      }
    };

    match backend.list_answers(self.question_id).await {
      Ok(answers) => {
        debug!(question_id = %self.question_id, answers = answers.len(), "thread loaded");
        self.question = Some(question);
        self.answers = answers;
        self.cursor = self.cursor.min(self.answers.len().saturating_sub(1));
        self.status = ThreadStatus::Ready;
      }
      Err(e) => {
        error!(question_id = %self.question_id, error = %e, "error loading answers");
        self.status = ThreadStatus::Failed("Failed to load question".into());
      }
    }
  }

  /// Rebuild the vote ledger for the signed-in user. Failures are logged
  /// and leave the previous ledger in place.
  pub async fn load_votes<B: ForumBackend>(&mut self, backend: &B, session: &SessionState) {
    let Some(user) = session.user() else {
      self.votes = VoteLedger::default();
      return;
    };
    match backend.list_votes(self.question_id).await {
      Ok(votes) => self.votes = VoteLedger::from_votes(&votes, user.id),
      Err(e) => error!(question_id = %self.question_id, error = %e, "error loading votes"),
    }
  }

  /// Post an answer and reload the thread. Blank input is ignored.
  /// Returns `true` if the answer was accepted.
  pub async fn submit_answer<B: ForumBackend>(&mut self, backend: &B, content: &str) -> bool {
    if content.trim().is_empty() {
      return false;
    }
    let input = NewAnswer { question_id: self.question_id, content: content.to_owned() };
    match backend.insert_answer(input).await {
      Ok(answer) => {
        debug!(answer_id = %answer.id, "answer submitted");
        self.notice = None;
        self.load(backend).await;
        true
      }
      Err(e) => {
        error!(error = %e, "error submitting answer");
        self.notice = Some("Failed to submit answer".into());
        false
      }
    }
  }

  /// Press the `vote_type` button on `answer_id`: retract a matching vote,
  /// otherwise cast (or replace with) this one. Reloads afterwards.
  pub async fn toggle_vote<B: ForumBackend>(
    &mut self,
    backend: &B,
    session: &SessionState,
    answer_id: Uuid,
    vote_type: VoteType,
  ) {
    let result = match self.votes.toggle(answer_id, vote_type) {
      VoteAction::Retract => backend.delete_vote(answer_id).await,
      VoteAction::Cast(vote_type) => {
        backend
          .upsert_vote(NewVote { answer_id, question_id: self.question_id, vote_type })
          .await
      }
    };

    match result {
      Ok(()) => self.notice = None,
      Err(e) => {
        error!(answer_id = %answer_id, error = %e, "error voting");
        self.notice = Some("Failed to record vote".into());
      }
    }

    self.load(backend).await;
    self.load_votes(backend, session).await;
  }

  pub async fn delete_answer<B: ForumBackend>(&mut self, backend: &B, answer_id: Uuid) {
    match backend.delete_answer(answer_id).await {
      Ok(()) => {
        self.notice = None;
        self.load(backend).await;
      }
      Err(e) => {
        error!(answer_id = %answer_id, error = %e, "error deleting answer");
        self.notice = Some("Failed to delete answer".into());
      }
    }
  }

  /// Delete the question. Returns `true` on success, after which the caller
  /// navigates back to the catalog.
  pub async fn delete_question<B: ForumBackend>(&mut self, backend: &B) -> bool {
    match backend.delete_question(self.question_id).await {
      Ok(()) => true,
      Err(e) => {
        error!(question_id = %self.question_id, error = %e, "error deleting question");
        self.notice = Some("Failed to delete question".into());
        false
      }
    }
  }

  // ── Ownership gates ───────────────────────────────────────────────────────

  pub fn can_delete_question(&self, session: &SessionState) -> bool {
    self
      .question
      .as_ref()
      .is_some_and(|q| session.is_owner(q.user_id))
  }

  pub fn can_delete_answer(&self, session: &SessionState, answer: &Answer) -> bool {
    session.is_owner(answer.user_id)
  }

  // ── Cursor ────────────────────────────────────────────────────────────────

  pub fn selected_answer(&self) -> Option<&Answer> { self.answers.get(self.cursor) }

  pub fn move_down(&mut self) {
    if self.cursor + 1 < self.answers.len() {
      self.cursor += 1;
    }
  }

  pub fn move_up(&mut self) { self.cursor = self.cursor.saturating_sub(1); }
}

#[cfg(test)]
mod tests {
  use agora_core::{
    question::{NewQuestion, QuestionFilter},
    session::{Credentials, User},
  };
  use agora_store_sqlite::SqliteBackend;

  use super::*;
  use crate::app::testing::Unavailable;

  struct Fixture {
    backend:  SqliteBackend,
    session:  SessionState,
    question: Question,
  }

  async fn sign_up(backend: &SqliteBackend, email: &str) -> SessionState {
    let session = backend
      .sign_up(Credentials { email: email.into(), password: "correct horse".into() })
      .await
      .unwrap();
    SessionState::from_session(session)
  }

  async fn fixture() -> Fixture {
    let backend = SqliteBackend::open_in_memory().await.unwrap();
    let session = sign_up(&backend, "ada@example.com").await;
    let user: User = session.user().unwrap().clone();
    let question = backend
      .insert_question(NewQuestion {
        title:   "Why is the sky blue?".into(),
        content: "Rayleigh?".into(),
        user_id: user.id,
      })
      .await
      .unwrap();
    Fixture { backend, session, question }
  }

  async fn opened(f: &Fixture) -> Thread { Thread::open(&f.backend, &f.session, f.question.id).await }

  #[tokio::test]
  async fn load_fetches_question_and_answers_in_order() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    assert_eq!(thread.status, ThreadStatus::Ready);
    assert!(thread.answers.is_empty());

    assert!(thread.submit_answer(&f.backend, "first").await);
    assert!(thread.submit_answer(&f.backend, "second").await);

    let bodies: Vec<_> = thread.answers.iter().map(|a| a.content.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second"]);
    assert!(thread.question.as_ref().unwrap().is_answered);
  }

  #[tokio::test]
  async fn blank_answer_is_ignored() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    assert!(!thread.submit_answer(&f.backend, "   ").await);
    assert!(f.backend.list_answers(f.question.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn missing_question_is_not_found() {
    let f = fixture().await;
    let thread = Thread::open(&f.backend, &f.session, Uuid::new_v4()).await;
    assert_eq!(thread.status, ThreadStatus::NotFound);
  }

  #[tokio::test]
  async fn query_failure_is_reported_generically() {
    let thread = Thread::open(&Unavailable, &SessionState::SignedOut, Uuid::new_v4()).await;
    assert_eq!(thread.status, ThreadStatus::Failed("Failed to load question".into()));
  }

  #[tokio::test]
  async fn toggling_same_vote_twice_clears_it() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    thread.submit_answer(&f.backend, "answer").await;
    let answer_id = thread.answers[0].id;

    thread.toggle_vote(&f.backend, &f.session, answer_id, VoteType::Like).await;
    assert_eq!(thread.votes.get(answer_id), Some(VoteType::Like));
    assert_eq!(thread.answers[0].likes, 1);

    thread.toggle_vote(&f.backend, &f.session, answer_id, VoteType::Like).await;
    assert_eq!(thread.votes.get(answer_id), None);
    assert_eq!(thread.answers[0].likes, 0);
    assert!(f.backend.list_votes(f.question.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn opposite_vote_replaces_existing() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    thread.submit_answer(&f.backend, "answer").await;
    let answer_id = thread.answers[0].id;

    thread.toggle_vote(&f.backend, &f.session, answer_id, VoteType::Like).await;
    thread.toggle_vote(&f.backend, &f.session, answer_id, VoteType::Dislike).await;

    let votes = f.backend.list_votes(f.question.id).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].vote_type, VoteType::Dislike);
    assert_eq!(thread.votes.get(answer_id), Some(VoteType::Dislike));
    assert_eq!((thread.answers[0].likes, thread.answers[0].dislikes), (0, 1));
  }

  #[tokio::test]
  async fn ledger_ignores_other_users_votes() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    thread.submit_answer(&f.backend, "answer").await;
    let answer_id = thread.answers[0].id;
    thread.toggle_vote(&f.backend, &f.session, answer_id, VoteType::Like).await;

    f.backend.sign_out().await.unwrap();
    let bob = sign_up(&f.backend, "bob@example.com").await;
    thread.load_votes(&f.backend, &bob).await;
    assert_eq!(thread.votes.get(answer_id), None);
    assert_eq!(thread.votes.toggle(answer_id, VoteType::Like), VoteAction::Cast(VoteType::Like));
  }

  #[tokio::test]
  async fn delete_answer_reloads_thread() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    thread.submit_answer(&f.backend, "answer").await;
    let answer_id = thread.answers[0].id;

    thread.delete_answer(&f.backend, answer_id).await;
    assert!(thread.answers.is_empty());
    assert!(!thread.question.as_ref().unwrap().is_answered);
  }

  #[tokio::test]
  async fn deleted_question_becomes_unreachable() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    thread.submit_answer(&f.backend, "answer").await;

    assert!(thread.delete_question(&f.backend).await);
    assert!(f.backend.list_questions(QuestionFilter::All).await.unwrap().is_empty());

    let again = Thread::open(&f.backend, &f.session, f.question.id).await;
    assert_eq!(again.status, ThreadStatus::NotFound);
  }

  #[tokio::test]
  async fn mutation_failures_set_notice() {
    let mut thread = Thread::open(&Unavailable, &SessionState::SignedOut, Uuid::new_v4()).await;
    assert!(!thread.submit_answer(&Unavailable, "text").await);
    assert_eq!(thread.notice.as_deref(), Some("Failed to submit answer"));

    thread
      .toggle_vote(&Unavailable, &SessionState::SignedOut, Uuid::new_v4(), VoteType::Like)
      .await;
    assert_eq!(thread.notice.as_deref(), Some("Failed to record vote"));

    thread.delete_answer(&Unavailable, Uuid::new_v4()).await;
    assert_eq!(thread.notice.as_deref(), Some("Failed to delete answer"));

    assert!(!thread.delete_question(&Unavailable).await);
    assert_eq!(thread.notice.as_deref(), Some("Failed to delete question"));
  }

  #[tokio::test]
  async fn owner_gates_need_a_resolved_session() {
    let f = fixture().await;
    let mut thread = opened(&f).await;
    thread.submit_answer(&f.backend, "answer").await;
    let answer = thread.answers[0].clone();

    assert!(thread.can_delete_question(&f.session));
    assert!(thread.can_delete_answer(&f.session, &answer));
    assert!(!thread.can_delete_question(&SessionState::Loading));
    assert!(!thread.can_delete_answer(&SessionState::SignedOut, &answer));
  }
}
