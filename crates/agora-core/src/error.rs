//! Error types for `agora-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown vote type: {0:?}")]
  UnknownVoteType(String),

  #[error("invalid question id in route: {0}")]
  InvalidRouteId(#[from] uuid::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
