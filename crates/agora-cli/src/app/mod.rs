//! Application state machine and event dispatcher.

pub mod catalog;
pub mod form;
pub mod session;
pub mod thread;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use agora_core::{
  backend::ForumBackend,
  question::QuestionFilter,
  route::Route,
  session::{Credentials, SessionState},
  vote::VoteType,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, info};

use self::{
  catalog::Catalog,
  form::{AskField, AskForm, AuthMode, LoginField, LoginForm, TextField},
  session::SessionManager,
  thread::Thread,
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Session not resolved yet.
  Starting,
  Login,
  Catalog,
  Detail,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<B> {
  /// Current route; only meaningful while signed in.
  pub route: Route,

  pub session: SessionManager,

  pub login: LoginForm,

  pub catalog: Catalog,

  /// Present while the detail route is open.
  pub thread: Option<Thread>,

  /// Present while the "Ask a Question" dialog is open.
  pub ask: Option<AskForm>,

  /// Answer being written on the detail screen.
  pub draft: TextField,

  /// Whether keys go to `draft`.
  pub composing: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared backend handle.
  pub backend: Arc<B>,
}

impl<B: ForumBackend + 'static> App<B> {
  pub fn new(backend: B, route: Route, email: String) -> Self {
    Self {
      route,
      session: SessionManager::default(),
      login: LoginForm::new(email),
      catalog: Catalog::default(),
      thread: None,
      ask: None,
      draft: TextField::default(),
      composing: false,
      status_msg: String::new(),
      backend: Arc::new(backend),
    }
  }

  pub fn screen(&self) -> Screen {
    match (self.session.state(), self.route) {
      (SessionState::Loading, _) => Screen::Starting,
      (SessionState::SignedOut, _) => Screen::Login,
      (SessionState::SignedIn(_), Route::Catalog) => Screen::Catalog,
      (SessionState::SignedIn(_), Route::Question(_)) => Screen::Detail,
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Resolve the session and load whatever the current route shows.
  pub async fn start(&mut self) {
    let backend = Arc::clone(&self.backend);
    self.session.start(backend.as_ref()).await;
    self.on_session_changed().await;
  }

  /// Apply pending auth notifications; re-enter the shell if any arrived.
  pub async fn sync_session(&mut self) {
    if self.session.poll() {
      self.on_session_changed().await;
    }
  }

  async fn on_session_changed(&mut self) {
    let signed_in = match self.session.state() {
      SessionState::Loading => return,
      SessionState::SignedOut => false,
      SessionState::SignedIn(_) => true,
    };

    self.login.reset();
    if signed_in {
      self.navigate(self.route).await;
    } else {
      self.thread = None;
      self.ask = None;
      self.composing = false;
      self.draft.clear();
      self.catalog = Catalog::default();
      self.status_msg.clear();
    }
  }

  pub fn shutdown(&mut self) { self.session.shutdown(); }

  // ── Navigation ────────────────────────────────────────────────────────────

  /// Switch route and load its data.
  pub async fn navigate(&mut self, route: Route) {
    self.route = route;
    self.composing = false;
    let backend = Arc::clone(&self.backend);
    match route {
      Route::Catalog => {
        self.thread = None;
        self.catalog.load(backend.as_ref()).await;
      }
      Route::Question(id) => {
        if self.thread.as_ref().is_none_or(|t| t.question_id != id) {
          self.draft.clear();
        }
        self.thread = Some(Thread::open(backend.as_ref(), self.session.state(), id).await);
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }
    // A status line lasts until the next key.
    self.status_msg.clear();

    match self.screen() {
      Screen::Starting => Ok(true),
      Screen::Login => self.handle_login_key(key).await,
      Screen::Catalog if self.ask.is_some() => {
        self.handle_ask_key(key).await;
        Ok(true)
      }
      Screen::Catalog => self.handle_catalog_key(key).await,
      Screen::Detail if self.composing => {
        self.handle_compose_key(key).await;
        Ok(true)
      }
      Screen::Detail => self.handle_detail_key(key).await,
    }
  }

  async fn handle_login_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
      self.login.toggle_mode();
      return Ok(true);
    }
    match key.code {
      KeyCode::Esc => return Ok(false),
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => self.login.next_field(),
      KeyCode::Enter if self.login.focus == LoginField::Email => self.login.next_field(),
      KeyCode::Enter => self.submit_login().await,
      _ => {
        self.login.focused_mut().handle_key(key);
      }
    }
    Ok(true)
  }

  async fn submit_login(&mut self) {
    if self.login.email.is_blank() || self.login.password.value.is_empty() {
      self.login.error = Some("Email and password are required".into());
      return;
    }
    let credentials = Credentials {
      email:    self.login.email.value.trim().to_owned(),
      password: self.login.password.value.clone(),
    };
    self.login.error = None;
    self.login.notice = None;

    let outcome = match self.login.mode {
      AuthMode::SignIn => self.backend.sign_in(credentials).await.map(Some),
      AuthMode::SignUp => self.backend.sign_up(credentials).await,
    };

    match outcome {
      // The auth notification moves us past the login screen.
      Ok(Some(_)) => self.sync_session().await,
      Ok(None) => {
        self.login.password.clear();
        self.login.notice = Some("Check your email to confirm your account".into());
      }
      Err(e) => {
        error!(error = %e, "authentication failed");
        self.login.error = Some(e.to_string());
      }
    }
  }

  async fn handle_catalog_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let backend = Arc::clone(&self.backend);
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => self.catalog.move_down(),
      KeyCode::Up | KeyCode::Char('k') => self.catalog.move_up(),

      // Open detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.catalog.selected().map(|q| q.id) {
          self.navigate(Route::Question(id)).await;
        }
      }

      // Filter
      KeyCode::Tab | KeyCode::Char('f') => {
        let next = self.catalog.filter.next();
        self.catalog.set_filter(backend.as_ref(), next).await;
      }
      KeyCode::Char(c @ '1'..='3') => {
        let filter = QuestionFilter::ALL[(c as u8 - b'1') as usize];
        self.catalog.set_filter(backend.as_ref(), filter).await;
      }

      KeyCode::Char('n') => self.ask = Some(AskForm::default()),
      KeyCode::Char('r') => self.catalog.load(backend.as_ref()).await,
      KeyCode::Char('S') => self.sign_out().await,

      _ => {}
    }
    Ok(true)
  }

  async fn handle_ask_key(&mut self, key: KeyEvent) {
    let Some(form) = self.ask.as_mut() else {
      return;
    };
    match key.code {
      KeyCode::Esc => self.ask = None,
      KeyCode::Tab | KeyCode::BackTab => form.next_field(),
      KeyCode::Enter if form.focus == AskField::Title => form.next_field(),
      KeyCode::Enter => {
        let (title, content) = (form.title.value.clone(), form.content.value.clone());
        let backend = Arc::clone(&self.backend);
        match self.catalog.create(backend.as_ref(), &title, &content).await {
          Ok(question) => {
            info!(question_id = %question.id, "question posted");
            self.ask = None;
          }
          Err(e) => {
            let message = e.to_string();
            if let Some(form) = self.ask.as_mut() {
              form.error = Some(if message.is_empty() {
                "Failed to create question".into()
              } else {
                message
              });
            }
          }
        }
      }
      _ => {
        form.focused_mut().handle_key(key);
      }
    }
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let backend = Arc::clone(&self.backend);
    let Some(thread) = self.thread.as_mut() else {
      self.navigate(Route::Catalog).await;
      return Ok(true);
    };

    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Back to list
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.navigate(Route::Catalog).await,

      // Answer cursor
      KeyCode::Down | KeyCode::Char('j') => thread.move_down(),
      KeyCode::Up | KeyCode::Char('k') => thread.move_up(),

      // Votes
      KeyCode::Char('+') | KeyCode::Char('=') => {
        if let Some(id) = thread.selected_answer().map(|a| a.id) {
          thread
            .toggle_vote(backend.as_ref(), self.session.state(), id, VoteType::Like)
            .await;
        }
      }
      KeyCode::Char('-') => {
        if let Some(id) = thread.selected_answer().map(|a| a.id) {
          thread
            .toggle_vote(backend.as_ref(), self.session.state(), id, VoteType::Dislike)
            .await;
        }
      }

      // Owner-only deletes
      KeyCode::Char('d') => {
        let target = thread
          .selected_answer()
          .filter(|a| thread.can_delete_answer(self.session.state(), a))
          .map(|a| a.id);
        if let Some(id) = target {
          thread.delete_answer(backend.as_ref(), id).await;
        }
      }
      KeyCode::Char('D') => {
        if thread.can_delete_question(self.session.state())
          && thread.delete_question(backend.as_ref()).await
        {
          self.status_msg = "Question deleted".into();
          self.navigate(Route::Catalog).await;
        }
      }

      KeyCode::Char('a') | KeyCode::Char('i') => self.composing = true,
      KeyCode::Char('r') => thread.refresh(backend.as_ref(), self.session.state()).await,
      KeyCode::Char('S') => self.sign_out().await,

      _ => {}
    }
    Ok(true)
  }

  async fn handle_compose_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => self.composing = false,
      KeyCode::Enter => {
        let backend = Arc::clone(&self.backend);
        let Some(thread) = self.thread.as_mut() else {
          return;
        };
        if thread.submit_answer(backend.as_ref(), &self.draft.value).await {
          self.draft.clear();
          self.composing = false;
        }
      }
      _ => {
        self.draft.handle_key(key);
      }
    }
  }

  async fn sign_out(&mut self) {
    match self.backend.sign_out().await {
      Ok(()) => self.sync_session().await,
      Err(e) => {
        error!(error = %e, "error signing out");
        // The local session may already be gone, which lands us on the
        // login form; report it there so the screen change keeps it.
        self.sync_session().await;
        if self.screen() == Screen::Login {
          self.login.error = Some("Failed to sign out".into());
        } else {
          self.status_msg = "Failed to sign out".into();
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use agora_core::question::NewQuestion;
  use agora_store_sqlite::SqliteBackend;
  use uuid::Uuid;

  use super::*;
  use crate::app::{testing::Scripted, thread::ThreadStatus};

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn press<B: ForumBackend + 'static>(app: &mut App<B>, code: KeyCode) -> bool {
    app.handle_key(key(code)).await.unwrap()
  }

  async fn type_text<B: ForumBackend + 'static>(app: &mut App<B>, text: &str) {
    for c in text.chars() {
      press(app, KeyCode::Char(c)).await;
    }
  }

  async fn started(route: Route) -> App<SqliteBackend> {
    let backend = SqliteBackend::open_in_memory().await.unwrap();
    let mut app = App::new(backend, route, String::new());
    app.start().await;
    app
  }

  async fn signed_up(route: Route) -> App<SqliteBackend> {
    let mut app = started(route).await;
    app.login.toggle_mode();
    type_text(&mut app, "ada@example.com").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "correct horse").await;
    press(&mut app, KeyCode::Enter).await;
    app
  }

  #[tokio::test]
  async fn starts_on_login_when_signed_out() {
    let app = started(Route::Catalog).await;
    assert_eq!(app.screen(), Screen::Login);
  }

  #[tokio::test]
  async fn sign_up_through_form_enters_catalog() {
    let app = signed_up(Route::Catalog).await;
    assert_eq!(app.screen(), Screen::Catalog);
    assert_eq!(app.session.state().user().unwrap().email, "ada@example.com");
    assert!(app.login.password.value.is_empty());
  }

  #[tokio::test]
  async fn bad_login_shows_error() {
    let mut app = started(Route::Catalog).await;
    type_text(&mut app, "ada@example.com").await;
    press(&mut app, KeyCode::Enter).await;
    type_text(&mut app, "wrong").await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.screen(), Screen::Login);
    assert!(app.login.error.is_some());
  }

  #[tokio::test]
  async fn ask_dialog_posts_question() {
    let mut app = signed_up(Route::Catalog).await;
    press(&mut app, KeyCode::Char('n')).await;
    type_text(&mut app, "Borrowing?").await;
    press(&mut app, KeyCode::Enter).await;
    type_text(&mut app, "How does it work").await;
    press(&mut app, KeyCode::Enter).await;

    assert!(app.ask.is_none());
    assert_eq!(app.catalog.questions.len(), 1);
    assert_eq!(app.catalog.questions[0].title, "Borrowing?");
  }

  #[tokio::test]
  async fn ask_dialog_keeps_error_on_blank_body() {
    let mut app = signed_up(Route::Catalog).await;
    press(&mut app, KeyCode::Char('n')).await;
    type_text(&mut app, "title only").await;
    press(&mut app, KeyCode::Tab).await;
    press(&mut app, KeyCode::Enter).await;

    assert!(app.ask.as_ref().unwrap().error.is_some());
    assert!(app.catalog.questions.is_empty());
  }

  #[tokio::test]
  async fn full_thread_flow() {
    let mut app = signed_up(Route::Catalog).await;
    let user_id = app.session.state().user().unwrap().id;
    app
      .backend
      .insert_question(NewQuestion { title: "q".into(), content: "c".into(), user_id })
      .await
      .unwrap();
    press(&mut app, KeyCode::Char('r')).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.screen(), Screen::Detail);

    // Write an answer.
    press(&mut app, KeyCode::Char('a')).await;
    type_text(&mut app, "because").await;
    press(&mut app, KeyCode::Enter).await;
    assert!(!app.composing);
    assert!(app.draft.value.is_empty());
    let thread = app.thread.as_ref().unwrap();
    assert_eq!(thread.answers.len(), 1);
    let answer_id = thread.answers[0].id;

    // Like, then switch to dislike.
    press(&mut app, KeyCode::Char('+')).await;
    assert_eq!(app.thread.as_ref().unwrap().votes.get(answer_id), Some(VoteType::Like));
    press(&mut app, KeyCode::Char('-')).await;
    let thread = app.thread.as_ref().unwrap();
    assert_eq!(thread.votes.get(answer_id), Some(VoteType::Dislike));
    assert_eq!((thread.answers[0].likes, thread.answers[0].dislikes), (0, 1));

    // Delete the question and land back on the catalog.
    press(&mut app, KeyCode::Char('D')).await;
    assert_eq!(app.screen(), Screen::Catalog);
    assert!(app.thread.is_none());
    assert!(app.catalog.questions.is_empty());
    assert_eq!(app.status_msg, "Question deleted");

    // Gone as soon as the user moves on.
    press(&mut app, KeyCode::Char('j')).await;
    assert!(app.status_msg.is_empty());
  }

  #[tokio::test]
  async fn status_clears_on_catalog_keys() {
    for code in [KeyCode::Char('k'), KeyCode::Char('r'), KeyCode::Char('f')] {
      let mut app = signed_up(Route::Catalog).await;
      app.status_msg = "Question deleted".into();
      press(&mut app, code).await;
      assert!(app.status_msg.is_empty(), "{code:?} kept the status");
    }
  }

  #[tokio::test]
  async fn pending_confirmation_stays_on_login() {
    let mut backend = Scripted::new().await;
    backend.confirm_sign_up = true;
    let mut app = App::new(backend, Route::Catalog, String::new());
    app.start().await;

    app.login.toggle_mode();
    type_text(&mut app, "ada@example.com").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "correct horse").await;
    press(&mut app, KeyCode::Enter).await;

    assert_eq!(app.screen(), Screen::Login);
    assert_eq!(app.login.notice.as_deref(), Some("Check your email to confirm your account"));
    assert!(app.login.error.is_none());
    assert!(app.login.password.value.is_empty());
  }

  #[tokio::test]
  async fn failed_sign_out_is_reported_on_login() {
    let mut backend = Scripted::new().await;
    backend.fail_sign_out = true;
    let mut app = App::new(backend, Route::Catalog, String::new());
    app.start().await;

    app.login.toggle_mode();
    type_text(&mut app, "ada@example.com").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "correct horse").await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.screen(), Screen::Catalog);

    press(&mut app, KeyCode::Char('S')).await;
    assert_eq!(app.screen(), Screen::Login);
    assert_eq!(app.login.error.as_deref(), Some("Failed to sign out"));
  }

  #[tokio::test]
  async fn non_owner_cannot_delete() {
    let mut app = signed_up(Route::Catalog).await;
    let owner = app.session.state().user().unwrap().id;
    let q = app
      .backend
      .insert_question(NewQuestion { title: "q".into(), content: "c".into(), user_id: owner })
      .await
      .unwrap();

    press(&mut app, KeyCode::Char('S')).await;
    assert_eq!(app.screen(), Screen::Login);
    app.route = Route::Question(q.id);
    app.login.mode = AuthMode::SignUp;
    app.login.email.value = "bob@example.com".into();
    app.login.focus = LoginField::Password;
    type_text(&mut app, "correct horse").await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.screen(), Screen::Detail);

    press(&mut app, KeyCode::Char('D')).await;
    assert_eq!(app.screen(), Screen::Detail);
    assert!(app.backend.get_question(q.id).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn unknown_question_route_shows_not_found() {
    let app = signed_up(Route::Question(Uuid::new_v4())).await;
    assert_eq!(app.screen(), Screen::Detail);
    assert_eq!(app.thread.as_ref().unwrap().status, ThreadStatus::NotFound);
  }

  #[tokio::test]
  async fn sign_out_returns_to_login_and_clears_state() {
    let mut app = signed_up(Route::Catalog).await;
    press(&mut app, KeyCode::Char('S')).await;
    assert_eq!(app.screen(), Screen::Login);
    assert!(app.thread.is_none());
    assert_eq!(app.login.email.value, "ada@example.com");
  }

  #[tokio::test]
  async fn q_quits_from_catalog_but_types_on_login() {
    let mut app = started(Route::Catalog).await;
    assert!(press(&mut app, KeyCode::Char('q')).await);
    assert_eq!(app.login.email.value, "q");

    let mut app = signed_up(Route::Catalog).await;
    assert!(!press(&mut app, KeyCode::Char('q')).await);
  }
}
