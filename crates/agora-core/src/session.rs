//! Identity, sessions, and auth-state change notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// An authenticated user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:    Uuid,
  #[serde(default)]
  pub email: String,
}

/// A live authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub access_token:  String,
  pub refresh_token: String,
  pub expires_at:    Option<DateTime<Utc>>,
  pub user:          User,
}

/// Email/password pair for sign-in and sign-up.
#[derive(Clone, Serialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("email", &self.email)
      .field("password", &"<redacted>")
      .finish()
  }
}

// ─── Client-side state ───────────────────────────────────────────────────────

/// What the application knows about the current session.
///
/// `Loading` is distinct from `SignedOut` so that owner-only controls are
/// never rendered from a session that has not been resolved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
  #[default]
  Loading,
  SignedOut,
  SignedIn(Session),
}

impl SessionState {
  pub fn from_session(session: Option<Session>) -> Self {
    session.map_or(Self::SignedOut, Self::SignedIn)
  }

  pub fn session(&self) -> Option<&Session> {
    match self {
      Self::SignedIn(s) => Some(s),
      _ => None,
    }
  }

  pub fn user(&self) -> Option<&User> { self.session().map(|s| &s.user) }

  /// True only for a resolved session whose user owns `owner_id`.
  pub fn is_owner(&self, owner_id: Uuid) -> bool {
    self.user().is_some_and(|u| u.id == owner_id)
  }
}

// ─── Change notifications ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
  SignedIn,
  SignedOut,
}

/// One auth-state transition and the session that resulted from it.
#[derive(Debug, Clone)]
pub struct AuthChange {
  pub event:   AuthEvent,
  pub session: Option<Session>,
}

const CHANNEL_CAPACITY: usize = 16;

/// Fan-out of [`AuthChange`]s to any number of subscribers.
///
/// Backends own one of these and emit after every sign-in or sign-out.
#[derive(Debug, Clone)]
pub struct AuthBroadcaster {
  tx: broadcast::Sender<AuthChange>,
}

impl Default for AuthBroadcaster {
  fn default() -> Self { Self::new() }
}

impl AuthBroadcaster {
  pub fn new() -> Self {
    let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
    Self { tx }
  }

  pub fn subscribe(&self) -> Subscription { Subscription { rx: self.tx.subscribe() } }

  /// Deliver `change` to current subscribers. Having none is not an error.
  pub fn emit(&self, event: AuthEvent, session: Option<Session>) {
    let _ = self.tx.send(AuthChange { event, session });
  }
}

/// A handle on the auth change stream. Dropping it (or calling
/// [`Subscription::unsubscribe`]) stops delivery.
#[derive(Debug)]
pub struct Subscription {
  rx: broadcast::Receiver<AuthChange>,
}

impl Subscription {
  /// Next pending change without waiting. A lagged receiver skips ahead to
  /// the oldest change still buffered.
  pub fn try_next(&mut self) -> Option<AuthChange> {
    loop {
      match self.rx.try_recv() {
        Ok(change) => return Some(change),
        Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
        Err(_) => return None,
      }
    }
  }

  pub fn unsubscribe(self) {}
}
