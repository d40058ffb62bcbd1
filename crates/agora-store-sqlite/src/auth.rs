//! Local password auth: argon2 hashing and opaque session tokens.

use agora_core::session::{Session, User};
use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{Duration, Utc};
use rand_core::{OsRng, RngCore};

use crate::{Error, Result};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

const SESSION_TTL_SECS: i64 = 3600;

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Mint a fresh session for `user`.
pub fn issue_session(user: User) -> Session {
  Session {
    access_token: new_token(),
    refresh_token: new_token(),
    expires_at: Some(Utc::now() + Duration::seconds(SESSION_TTL_SECS)),
    user,
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[test]
  fn correct_password_verifies() {
    let phc = hash_password("secret").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("secret", &phc));
  }

  #[test]
  fn wrong_password_fails() {
    let phc = hash_password("secret").unwrap();
    assert!(!verify_password("wrong", &phc));
  }

  #[test]
  fn malformed_hash_fails() {
    assert!(!verify_password("secret", "not-a-phc-string"));
  }

  #[test]
  fn sessions_get_distinct_tokens() {
    let user = User { id: Uuid::new_v4(), email: "a@b.c".into() };
    let a = issue_session(user.clone());
    let b = issue_session(user);
    assert_eq!(a.access_token.len(), 64);
    assert_ne!(a.access_token, b.access_token);
    assert_ne!(a.access_token, a.refresh_token);
    assert!(a.expires_at.unwrap() > Utc::now());
  }
}
