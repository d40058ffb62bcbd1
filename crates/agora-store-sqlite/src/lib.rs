//! SQLite backend for the Agora forum client.
//!
//! Plays the part of the hosted store for local development and tests: it
//! keeps the answered flag and vote counts up to date with triggers, enforces
//! one vote per user per answer, and only lets owners delete their rows.
//! All database access goes through [`tokio_rusqlite`] so it never blocks
//! the async runtime.

mod auth;
mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteBackend;
