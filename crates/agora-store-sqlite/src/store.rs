//! [`SqliteBackend`], the SQLite implementation of [`ForumBackend`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use agora_core::{
  answer::{Answer, NewAnswer},
  backend::ForumBackend,
  question::{NewQuestion, Question, QuestionFilter},
  session::{AuthBroadcaster, AuthEvent, Credentials, Session, Subscription, User},
  vote::{NewVote, Vote},
};

use crate::{
  Error, Result,
  auth::{MIN_PASSWORD_LEN, hash_password, issue_session, verify_password},
  encode::{
    ANSWER_COLUMNS, QUESTION_COLUMNS, RawAnswer, RawQuestion, RawVote, decode_uuid, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// A forum store backed by a single SQLite file, with in-process auth.
///
/// Cloning is cheap; clones share the connection and the signed-in session.
#[derive(Clone)]
pub struct SqliteBackend {
  conn:    tokio_rusqlite::Connection,
  session: Arc<RwLock<Option<Session>>>,
  auth:    AuthBroadcaster,
}

impl SqliteBackend {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open a throwaway in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let backend = Self {
      conn,
      session: Arc::new(RwLock::new(None)),
      auth: AuthBroadcaster::new(),
    };
    backend.init_schema().await?;
    Ok(backend)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The signed-in user, or [`Error::NotAuthenticated`].
  async fn require_user(&self) -> Result<User> {
    self
      .session
      .read()
      .await
      .as_ref()
      .map(|s| s.user.clone())
      .ok_or(Error::NotAuthenticated)
  }

  async fn start_session(&self, user: User) -> Session {
    let session = issue_session(user);
    *self.session.write().await = Some(session.clone());
    self.auth.emit(AuthEvent::SignedIn, Some(session.clone()));
    session
  }

  async fn find_user(&self, email: String) -> Result<Option<(User, String)>> {
    let row: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, password_hash FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, email, hash)| Ok::<_, Error>((User { id: decode_uuid(&id)?, email }, hash)))
      .transpose()
  }
}

// ─── ForumBackend impl ───────────────────────────────────────────────────────

impl ForumBackend for SqliteBackend {
  type Error = Error;

  // ── Auth ──────────────────────────────────────────────────────────────────

  async fn get_session(&self) -> Result<Option<Session>> { Ok(self.session.read().await.clone()) }

  async fn get_user(&self) -> Result<Option<User>> {
    let Some(user) = self.session.read().await.as_ref().map(|s| s.user.clone()) else {
      return Ok(None);
    };

    let id_str = encode_uuid(user.id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists.then_some(user))
  }

  async fn sign_in(&self, credentials: Credentials) -> Result<Session> {
    let (user, hash) = self
      .find_user(credentials.email.trim().to_owned())
      .await?
      .ok_or(Error::InvalidCredentials)?;

    if !verify_password(&credentials.password, &hash) {
      return Err(Error::InvalidCredentials);
    }

    info!(user_id = %user.id, "signed in");
    Ok(self.start_session(user).await)
  }

  async fn sign_up(&self, credentials: Credentials) -> Result<Option<Session>> {
    let email = credentials.email.trim().to_owned();
    if email.is_empty() {
      return Err(Error::InvalidCredentials);
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::WeakPassword(MIN_PASSWORD_LEN));
    }
    if self.find_user(email.clone()).await?.is_some() {
      return Err(Error::EmailTaken(email));
    }

    let user = User { id: Uuid::new_v4(), email };
    let hash = hash_password(&credentials.password)?;

    let id_str = encode_uuid(user.id);
    let email_str = user.email.clone();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_str, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    info!(user_id = %user.id, "registered");
    Ok(Some(self.start_session(user).await))
  }

  async fn sign_out(&self) -> Result<()> {
    if let Some(session) = self.session.write().await.take() {
      info!(user_id = %session.user.id, "signed out");
    }
    self.auth.emit(AuthEvent::SignedOut, None);
    Ok(())
  }

  fn subscribe(&self) -> Subscription { self.auth.subscribe() }

  // ── Questions ─────────────────────────────────────────────────────────────

  async fn list_questions(&self, filter: QuestionFilter) -> Result<Vec<Question>> {
    let flag = filter.answered_flag();

    let raws: Vec<RawQuestion> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(flag) = flag {
          let mut stmt = conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE is_answered = ?1
             ORDER BY created_at DESC, rowid DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![flag], RawQuestion::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY created_at DESC, rowid DESC"
          ))?;
          stmt
            .query_map([], RawQuestion::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQuestion::into_question).collect()
  }

  async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
              rusqlite::params![id_str],
              RawQuestion::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawQuestion::into_question).transpose()
  }

  async fn insert_question(&self, input: NewQuestion) -> Result<Question> {
    let user = self.require_user().await?;
    if input.user_id != user.id {
      return Err(Error::Forbidden);
    }

    let question = Question {
      id:          Uuid::new_v4(),
      title:       input.title,
      content:     input.content,
      user_id:     user.id,
      created_at:  Utc::now(),
      is_answered: false,
    };

    let id_str = encode_uuid(question.id);
    let title = question.title.clone();
    let content = question.content.clone();
    let user_str = encode_uuid(question.user_id);
    let at_str = encode_dt(question.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO questions (id, title, content, user_id, created_at, is_answered)
           VALUES (?1, ?2, ?3, ?4, ?5, 0)",
          rusqlite::params![id_str, title, content, user_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(question_id = %question.id, "question inserted");
    Ok(question)
  }

  async fn delete_question(&self, id: Uuid) -> Result<()> {
    let user = self.require_user().await?;
    let id_str = encode_uuid(id);
    let user_str = encode_uuid(user.id);

    // Rows owned by someone else are silently left alone.
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM questions WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?)
      })
      .await?;

    debug!(question_id = %id, deleted, "question delete");
    Ok(())
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  async fn list_answers(&self, question_id: Uuid) -> Result<Vec<Answer>> {
    let qid_str = encode_uuid(question_id);

    let raws: Vec<RawAnswer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANSWER_COLUMNS} FROM answers WHERE question_id = ?1
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![qid_str], RawAnswer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnswer::into_answer).collect()
  }

  async fn insert_answer(&self, input: NewAnswer) -> Result<Answer> {
    let user = self.require_user().await?;

    let answer = Answer {
      id:          Uuid::new_v4(),
      content:     input.content,
      question_id: input.question_id,
      user_id:     user.id,
      created_at:  Utc::now(),
      likes:       0,
      dislikes:    0,
    };

    let id_str = encode_uuid(answer.id);
    let content = answer.content.clone();
    let qid_str = encode_uuid(answer.question_id);
    let user_str = encode_uuid(answer.user_id);
    let at_str = encode_dt(answer.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO answers (id, content, question_id, user_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, content, qid_str, user_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(answer_id = %answer.id, question_id = %answer.question_id, "answer inserted");
    Ok(answer)
  }

  async fn delete_answer(&self, id: Uuid) -> Result<()> {
    let user = self.require_user().await?;
    let id_str = encode_uuid(id);
    let user_str = encode_uuid(user.id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM answers WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?)
      })
      .await?;

    debug!(answer_id = %id, deleted, "answer delete");
    Ok(())
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn list_votes(&self, question_id: Uuid) -> Result<Vec<Vote>> {
    let qid_str = encode_uuid(question_id);

    let raws: Vec<RawVote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT answer_id, question_id, user_id, vote_type FROM votes WHERE question_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![qid_str], |row| {
            Ok(RawVote {
              answer_id:   row.get(0)?,
              question_id: row.get(1)?,
              user_id:     row.get(2)?,
              vote_type:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVote::into_vote).collect()
  }

  async fn upsert_vote(&self, input: NewVote) -> Result<()> {
    let user = self.require_user().await?;
    let aid_str = encode_uuid(input.answer_id);
    let user_str = encode_uuid(user.id);
    let vote_type = input.vote_type.as_str();

    // The question is taken from the answer row, never from the caller; an
    // unknown answer yields NULL and fails the NOT NULL constraint.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO votes (answer_id, question_id, user_id, vote_type)
           VALUES (?1, (SELECT question_id FROM answers WHERE id = ?1), ?2, ?3)
           ON CONFLICT (answer_id, user_id) DO UPDATE SET vote_type = excluded.vote_type",
          rusqlite::params![aid_str, user_str, vote_type],
        )?;
        Ok(())
      })
      .await?;

    debug!(answer_id = %input.answer_id, vote = %input.vote_type, "vote upserted");
    Ok(())
  }

  async fn delete_vote(&self, answer_id: Uuid) -> Result<()> {
    let user = self.require_user().await?;
    let aid_str = encode_uuid(answer_id);
    let user_str = encode_uuid(user.id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM votes WHERE answer_id = ?1 AND user_id = ?2",
          rusqlite::params![aid_str, user_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(answer_id = %answer_id, "vote deleted");
    Ok(())
  }
}
