//! Async HTTP client for a Supabase project: PostgREST tables under
//! `/rest/v1` and GoTrue auth under `/auth/v1`.

use std::{sync::Arc, time::Duration};

use agora_core::{
  answer::{Answer, NewAnswer},
  backend::ForumBackend,
  question::{NewQuestion, Question, QuestionFilter},
  session::{AuthBroadcaster, AuthEvent, Credentials, Session, Subscription, User},
  vote::{NewVote, Vote, VoteType},
};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::ACCEPT};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// Non-2xx response; `message` is the service's own explanation.
  #[error("{message} ({status})")]
  Status { status: StatusCode, message: String },

  #[error("unexpected response body: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("not authenticated")]
  NotAuthenticated,

  #[error("{0} returned no rows")]
  EmptyResponse(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Connection settings for the hosted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  /// Public (anon) API key sent with every request.
  pub anon_key: String,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the forum's hosted backend.
///
/// Clones share the inner [`reqwest::Client`] connection pool and the
/// signed-in session.
#[derive(Clone)]
pub struct ApiClient {
  client:  Client,
  config:  ApiConfig,
  session: Arc<RwLock<Option<Session>>>,
  auth:    AuthBroadcaster,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      config,
      session: Arc::new(RwLock::new(None)),
      auth: AuthBroadcaster::new(),
    })
  }

  fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{table}", self.config.base_url.trim_end_matches('/'))
  }

  fn auth_url(&self, path: &str) -> String {
    format!("{}/auth/v1/{path}", self.config.base_url.trim_end_matches('/'))
  }

  /// Attach the API key and the bearer token: the session's access token
  /// when signed in, the anon key otherwise.
  async fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
    let token = self
      .session
      .read()
      .await
      .as_ref()
      .map(|s| s.access_token.clone())
      .unwrap_or_else(|| self.config.anon_key.clone());
    req
      .header("apikey", &self.config.anon_key)
      .bearer_auth(token)
  }

  async fn current_user(&self) -> Result<User> {
    self
      .session
      .read()
      .await
      .as_ref()
      .map(|s| s.user.clone())
      .ok_or(Error::NotAuthenticated)
  }

  async fn send(&self, req: RequestBuilder) -> Result<Response> {
    check(self.authorize(req).await.send().await?).await
  }

  async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
    let resp = self
      .send(self.client.get(self.rest_url(table)).query(query))
      .await?;
    Ok(resp.json().await?)
  }

  /// Fetch exactly one row. PostgREST answers 406 when the filter matches
  /// no row, which maps to `None`.
  async fn select_one<T: DeserializeOwned>(
    &self,
    table: &str,
    query: &[(&str, String)],
  ) -> Result<Option<T>> {
    let req = self
      .client
      .get(self.rest_url(table))
      .query(query)
      .header(ACCEPT, SINGLE_OBJECT);
    let resp = self.authorize(req).await.send().await?;
    if resp.status() == StatusCode::NOT_ACCEPTABLE {
      return Ok(None);
    }
    Ok(Some(check(resp).await?.json().await?))
  }

  async fn insert<T: DeserializeOwned>(&self, table: &'static str, row: &impl Serialize) -> Result<T> {
    let resp = self
      .send(
        self
          .client
          .post(self.rest_url(table))
          .header("Prefer", "return=representation")
          .json(row),
      )
      .await?;
    let rows: Vec<T> = resp.json().await?;
    rows.into_iter().next().ok_or(Error::EmptyResponse(table))
  }

  async fn delete(&self, table: &str, query: &[(&str, String)]) -> Result<()> {
    self
      .send(self.client.delete(self.rest_url(table)).query(query))
      .await?;
    Ok(())
  }

  async fn store_session(&self, session: Session) -> Session {
    *self.session.write().await = Some(session.clone());
    self.auth.emit(AuthEvent::SignedIn, Some(session.clone()));
    session
  }
}

/// Turn a non-2xx response into [`Error::Status`].
async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { status, message: error_message(status, &body) })
}

/// Pull a human-readable message out of a PostgREST or GoTrue error body.
fn error_message(status: StatusCode, body: &str) -> String {
  serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| {
      ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_owned))
    })
    .unwrap_or_else(|| {
      status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned()
    })
}

// ─── Query builders ───────────────────────────────────────────────────────────

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

fn eq(value: impl std::fmt::Display) -> String { format!("eq.{value}") }

fn question_list_query(filter: QuestionFilter) -> Vec<(&'static str, String)> {
  let mut query = vec![("select", "*".to_owned()), ("order", "created_at.desc".to_owned())];
  if let Some(flag) = filter.answered_flag() {
    query.push(("is_answered", eq(flag)));
  }
  query
}

fn answer_list_query(question_id: Uuid) -> Vec<(&'static str, String)> {
  vec![
    ("select", "*".to_owned()),
    ("question_id", eq(question_id)),
    ("order", "created_at.asc".to_owned()),
  ]
}

// ─── Wire types ───────────────────────────────────────────────────────────────

/// Successful GoTrue token grant.
#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token:  String,
  refresh_token: String,
  expires_in:    Option<i64>,
  expires_at:    Option<i64>,
  user:          User,
}

impl TokenResponse {
  fn into_session(self, now: DateTime<Utc>) -> Session {
    let expires_at = self
      .expires_at
      .and_then(|secs| DateTime::from_timestamp(secs, 0))
      .or_else(|| {
        self
          .expires_in
          .map(|secs| now + chrono::Duration::seconds(secs))
      });
    Session {
      access_token: self.access_token,
      refresh_token: self.refresh_token,
      expires_at,
      user: self.user,
    }
  }
}

/// Sign-up answers with a token grant when confirmation is off, or with just
/// the user record when an email confirmation is pending.
fn parse_sign_up(body: serde_json::Value, now: DateTime<Utc>) -> Result<Option<Session>, serde_json::Error> {
  if body.get("access_token").is_some() {
    let token: TokenResponse = serde_json::from_value(body)?;
    Ok(Some(token.into_session(now)))
  } else {
    Ok(None)
  }
}

#[derive(Serialize)]
struct AnswerRow<'a> {
  content:     &'a str,
  question_id: Uuid,
  user_id:     Uuid,
}

#[derive(Serialize)]
struct VoteRow {
  answer_id:   Uuid,
  question_id: Uuid,
  user_id:     Uuid,
  vote_type:   VoteType,
}

// ─── ForumBackend impl ────────────────────────────────────────────────────────

impl ForumBackend for ApiClient {
  type Error = Error;

  // ── Auth ──────────────────────────────────────────────────────────────────

  async fn get_session(&self) -> Result<Option<Session>> { Ok(self.session.read().await.clone()) }

  /// `GET /auth/v1/user`
  async fn get_user(&self) -> Result<Option<User>> {
    if self.session.read().await.is_none() {
      return Ok(None);
    }
    let resp = self
      .authorize(self.client.get(self.auth_url("user")))
      .await
      .send()
      .await?;
    if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
      return Ok(None);
    }
    Ok(Some(check(resp).await?.json().await?))
  }

  /// `POST /auth/v1/token?grant_type=password`
  async fn sign_in(&self, credentials: Credentials) -> Result<Session> {
    let resp = self
      .send(
        self
          .client
          .post(self.auth_url("token"))
          .query(&[("grant_type", "password")])
          .json(&credentials),
      )
      .await?;
    let token: TokenResponse = resp.json().await?;
    let session = self.store_session(token.into_session(Utc::now())).await;
    info!(user_id = %session.user.id, "signed in");
    Ok(session)
  }

  /// `POST /auth/v1/signup`
  async fn sign_up(&self, credentials: Credentials) -> Result<Option<Session>> {
    let resp = self
      .send(self.client.post(self.auth_url("signup")).json(&credentials))
      .await?;
    let body: serde_json::Value = resp.json().await?;
    let Some(session) = parse_sign_up(body, Utc::now())? else {
      info!("sign-up pending email confirmation");
      return Ok(None);
    };
    Ok(Some(self.store_session(session).await))
  }

  /// `POST /auth/v1/logout`. The local session is dropped even if the
  /// request fails.
  async fn sign_out(&self) -> Result<()> {
    let result = if self.session.read().await.is_some() {
      self.send(self.client.post(self.auth_url("logout"))).await.map(drop)
    } else {
      Ok(())
    };
    if let Err(e) = &result {
      warn!(error = %e, "logout request failed");
    }
    *self.session.write().await = None;
    self.auth.emit(AuthEvent::SignedOut, None);
    result
  }

  fn subscribe(&self) -> Subscription { self.auth.subscribe() }

  // ── Questions ─────────────────────────────────────────────────────────────

  /// `GET /rest/v1/questions?select=*&order=created_at.desc[&is_answered=eq.<b>]`
  async fn list_questions(&self, filter: QuestionFilter) -> Result<Vec<Question>> {
    debug!(%filter, "listing questions");
    self.select("questions", &question_list_query(filter)).await
  }

  /// `GET /rest/v1/questions?select=*&id=eq.<id>` as a single object.
  async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
    self
      .select_one("questions", &[("select", "*".to_owned()), ("id", eq(id))])
      .await
  }

  /// `POST /rest/v1/questions`
  async fn insert_question(&self, input: NewQuestion) -> Result<Question> {
    self.insert("questions", &input).await
  }

  /// `DELETE /rest/v1/questions?id=eq.<id>`
  async fn delete_question(&self, id: Uuid) -> Result<()> {
    self.delete("questions", &[("id", eq(id))]).await
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  /// `GET /rest/v1/answers?select=*&question_id=eq.<id>&order=created_at.asc`
  async fn list_answers(&self, question_id: Uuid) -> Result<Vec<Answer>> {
    self.select("answers", &answer_list_query(question_id)).await
  }

  /// `POST /rest/v1/answers`
  async fn insert_answer(&self, input: NewAnswer) -> Result<Answer> {
    let user = self.current_user().await?;
    let row = AnswerRow {
      content:     &input.content,
      question_id: input.question_id,
      user_id:     user.id,
    };
    self.insert("answers", &row).await
  }

  /// `DELETE /rest/v1/answers?id=eq.<id>`
  async fn delete_answer(&self, id: Uuid) -> Result<()> {
    self.delete("answers", &[("id", eq(id))]).await
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  /// `GET /rest/v1/votes?select=*&question_id=eq.<id>`
  async fn list_votes(&self, question_id: Uuid) -> Result<Vec<Vote>> {
    self
      .select("votes", &[("select", "*".to_owned()), ("question_id", eq(question_id))])
      .await
  }

  /// `POST /rest/v1/votes?on_conflict=answer_id,user_id` with merge-duplicates.
  async fn upsert_vote(&self, input: NewVote) -> Result<()> {
    let user = self.current_user().await?;
    let row = VoteRow {
      answer_id:   input.answer_id,
      question_id: input.question_id,
      user_id:     user.id,
      vote_type:   input.vote_type,
    };
    self
      .send(
        self
          .client
          .post(self.rest_url("votes"))
          .query(&[("on_conflict", "answer_id,user_id")])
          .header("Prefer", "resolution=merge-duplicates,return=minimal")
          .json(&row),
      )
      .await?;
    Ok(())
  }

  /// `DELETE /rest/v1/votes?answer_id=eq.<id>&user_id=eq.<me>`
  async fn delete_vote(&self, answer_id: Uuid) -> Result<()> {
    let user = self.current_user().await?;
    self
      .delete("votes", &[("answer_id", eq(answer_id)), ("user_id", eq(user.id))])
      .await
  }
}
