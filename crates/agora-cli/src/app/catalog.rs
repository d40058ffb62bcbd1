//! Question catalog: the filtered question list and question creation.

use agora_core::{
  backend::ForumBackend,
  question::{NewQuestion, Question, QuestionFilter},
};
use anyhow::{Result, anyhow, bail};
use tracing::{debug, error};

pub const NOT_LOGGED_IN: &str = "You must be logged in to create a question";

#[derive(Debug, Default)]
pub struct Catalog {
  pub filter:    QuestionFilter,
  /// Result of the last successful fetch, newest first.
  pub questions: Vec<Question>,
  pub cursor:    usize,
  pub error:     Option<String>,
}

impl Catalog {
  /// Re-fetch the whole list for the current filter.
  pub async fn load<B: ForumBackend>(&mut self, backend: &B) {
    match backend.list_questions(self.filter).await {
      Ok(questions) => {
        debug!(filter = %self.filter, count = questions.len(), "questions loaded");
        self.questions = questions;
        self.cursor = self.cursor.min(self.questions.len().saturating_sub(1));
        self.error = None;
      }
      Err(e) => {
        error!(error = %e, "error loading questions");
        self.error = Some("Failed to load questions".into());
      }
    }
  }

  /// Switch filter and re-fetch; the cursor returns to the top.
  pub async fn set_filter<B: ForumBackend>(&mut self, backend: &B, filter: QuestionFilter) {
    self.filter = filter;
    self.cursor = 0;
    self.load(backend).await;
  }

  /// Post a question as the current user, then reload the list.
  ///
  /// Fails without touching the list when nobody is signed in.
  pub async fn create<B: ForumBackend>(
    &mut self,
    backend: &B,
    title: &str,
    content: &str,
  ) -> Result<Question> {
    let (title, content) = (title.trim(), content.trim());
    if title.is_empty() || content.is_empty() {
      bail!("Title and details are both required");
    }

    let user = backend
      .get_user()
      .await
      .map_err(anyhow::Error::new)?
      .ok_or_else(|| anyhow!(NOT_LOGGED_IN))?;

    let question = backend
      .insert_question(NewQuestion {
        title:   title.to_owned(),
        content: content.to_owned(),
        user_id: user.id,
      })
      .await
      .map_err(|e| {
        error!(error = %e, "error creating question");
        anyhow::Error::new(e)
      })?;

    self.load(backend).await;
    Ok(question)
  }

  pub fn selected(&self) -> Option<&Question> { self.questions.get(self.cursor) }

  pub fn move_down(&mut self) {
    if self.cursor + 1 < self.questions.len() {
      self.cursor += 1;
    }
  }

  pub fn move_up(&mut self) { self.cursor = self.cursor.saturating_sub(1); }
}
