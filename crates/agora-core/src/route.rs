//! Screen routes: `/` and `/question/:id`; anything else redirects to `/`.

use std::fmt;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
  #[default]
  Catalog,
  Question(Uuid),
}

impl Route {
  /// Parse a path. Unknown paths redirect to the catalog; a `/question/`
  /// path with a malformed id is an error so the caller can report it.
  pub fn parse(path: &str) -> crate::Result<Self> {
    let trimmed = path.trim().trim_end_matches('/');
    match trimmed.strip_prefix("/question/") {
      Some(id) => Ok(Self::Question(Uuid::parse_str(id)?)),
      None => Ok(Self::Catalog),
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Catalog => f.write_str("/"),
      Self::Question(id) => write!(f, "/question/{id}"),
    }
  }
}
