//! Error type for `agora-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] agora_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A write was attempted without a signed-in user.
  #[error("not authenticated")]
  NotAuthenticated,

  /// The row being written belongs to someone other than the current user.
  #[error("permission denied")]
  Forbidden,

  #[error("invalid login credentials")]
  InvalidCredentials,

  #[error("user already registered: {0}")]
  EmailTaken(String),

  #[error("password should be at least {0} characters")]
  WeakPassword(usize),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
