//! Core types and trait definitions for the Agora forum client.
//!
//! No HTTP or database code lives here. Backends (`agora-store-sqlite`,
//! the Supabase client in `agora-cli`) implement [`backend::ForumBackend`];
//! the UI layer depends only on it.

pub mod answer;
pub mod backend;
pub mod error;
pub mod question;
pub mod route;
pub mod session;
pub mod vote;

pub use error::{Error, Result};
