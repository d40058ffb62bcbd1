//! Session manager: the single owner of [`SessionState`].

use agora_core::{
  backend::ForumBackend,
  session::{AuthChange, SessionState, Subscription},
};
use tracing::{debug, warn};

/// Tracks who is signed in and applies auth change notifications.
#[derive(Debug, Default)]
pub struct SessionManager {
  state:        SessionState,
  subscription: Option<Subscription>,
}

impl SessionManager {
  pub fn state(&self) -> &SessionState { &self.state }

  /// Subscribe to changes, then resolve the current session.
  ///
  /// Subscribing first means a sign-in racing startup is never lost. A failed
  /// lookup is treated as signed out.
  pub async fn start<B: ForumBackend>(&mut self, backend: &B) {
    self.subscription = Some(backend.subscribe());
    self.state = match backend.get_session().await {
      Ok(session) => SessionState::from_session(session),
      Err(e) => {
        warn!(error = %e, "could not read current session");
        SessionState::SignedOut
      }
    };
    debug!(signed_in = self.state.session().is_some(), "session resolved");
  }

  /// Drain pending notifications. Returns `true` if any were applied.
  pub fn poll(&mut self) -> bool {
    let mut pending = Vec::new();
    if let Some(sub) = self.subscription.as_mut() {
      while let Some(change) = sub.try_next() {
        pending.push(change);
      }
    }
    let changed = !pending.is_empty();
    for change in pending {
      self.handle(change);
    }
    changed
  }

  pub fn handle(&mut self, change: AuthChange) {
    debug!(event = ?change.event, "auth state changed");
    self.state = SessionState::from_session(change.session);
  }

  /// Stop listening for changes.
  pub fn shutdown(&mut self) {
    if let Some(sub) = self.subscription.take() {
      sub.unsubscribe();
    }
  }
}

#[cfg(test)]
mod tests {
  use agora_core::session::Credentials;
  use agora_store_sqlite::SqliteBackend;

  use super::*;
  use crate::app::testing::Unavailable;

  fn creds() -> Credentials {
    Credentials { email: "ada@example.com".into(), password: "correct horse".into() }
  }

  #[tokio::test]
  async fn starts_loading_then_resolves_signed_out() {
    let backend = SqliteBackend::open_in_memory().await.unwrap();
    let mut sm = SessionManager::default();
    assert_eq!(sm.state(), &SessionState::Loading);

    sm.start(&backend).await;
    assert_eq!(sm.state(), &SessionState::SignedOut);
  }

  #[tokio::test]
  async fn failed_lookup_resolves_signed_out() {
    let mut sm = SessionManager::default();
    sm.start(&Unavailable).await;
    assert_eq!(sm.state(), &SessionState::SignedOut);
    assert!(!sm.poll());
  }

  #[tokio::test]
  async fn follows_sign_in_and_sign_out() {
    let backend = SqliteBackend::open_in_memory().await.unwrap();
    let mut sm = SessionManager::default();
    sm.start(&backend).await;

    backend.sign_up(creds()).await.unwrap();
    assert!(sm.poll());
    assert_eq!(sm.state().user().unwrap().email, "ada@example.com");

    backend.sign_out().await.unwrap();
    assert!(sm.poll());
    assert_eq!(sm.state(), &SessionState::SignedOut);
    assert!(!sm.poll());
  }

  #[tokio::test]
  async fn shutdown_stops_updates() {
    let backend = SqliteBackend::open_in_memory().await.unwrap();
    let mut sm = SessionManager::default();
    sm.start(&backend).await;
    sm.shutdown();

    backend.sign_up(creds()).await.unwrap();
    assert!(!sm.poll());
    assert_eq!(sm.state(), &SessionState::SignedOut);
  }
}
