//! SQL schema for the Agora SQLite store.
//!
//! Derived columns (`questions.is_answered`, `answers.likes`,
//! `answers.dislikes`) are maintained by triggers, never by the client.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,     -- RFC 3339, fixed-width micros
    is_answered INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS answers (
    id          TEXT PRIMARY KEY,
    content     TEXT NOT NULL,
    question_id TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    likes       INTEGER NOT NULL DEFAULT 0,
    dislikes    INTEGER NOT NULL DEFAULT 0
);

-- At most one vote per user per answer.
CREATE TABLE IF NOT EXISTS votes (
    answer_id   TEXT NOT NULL REFERENCES answers(id) ON DELETE CASCADE,
    question_id TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    vote_type   TEXT NOT NULL CHECK (vote_type IN ('like', 'dislike')),
    PRIMARY KEY (answer_id, user_id)
);

CREATE INDEX IF NOT EXISTS questions_created_idx ON questions(created_at);
CREATE INDEX IF NOT EXISTS answers_question_idx  ON answers(question_id, created_at);
CREATE INDEX IF NOT EXISTS votes_question_idx    ON votes(question_id);

CREATE TRIGGER IF NOT EXISTS answers_mark_answered
AFTER INSERT ON answers
BEGIN
    UPDATE questions SET is_answered = 1 WHERE id = NEW.question_id;
END;

CREATE TRIGGER IF NOT EXISTS answers_unmark_answered
AFTER DELETE ON answers
BEGIN
    UPDATE questions
       SET is_answered = EXISTS (SELECT 1 FROM answers WHERE question_id = OLD.question_id)
     WHERE id = OLD.question_id;
END;

CREATE TRIGGER IF NOT EXISTS votes_count_insert
AFTER INSERT ON votes
BEGIN
    UPDATE answers
       SET likes    = likes    + (NEW.vote_type = 'like'),
           dislikes = dislikes + (NEW.vote_type = 'dislike')
     WHERE id = NEW.answer_id;
END;

CREATE TRIGGER IF NOT EXISTS votes_count_update
AFTER UPDATE OF vote_type ON votes
BEGIN
    UPDATE answers
       SET likes    = likes    - (OLD.vote_type = 'like')    + (NEW.vote_type = 'like'),
           dislikes = dislikes - (OLD.vote_type = 'dislike') + (NEW.vote_type = 'dislike')
     WHERE id = NEW.answer_id;
END;

CREATE TRIGGER IF NOT EXISTS votes_count_delete
AFTER DELETE ON votes
BEGIN
    UPDATE answers
       SET likes    = likes    - (OLD.vote_type = 'like'),
           dislikes = dislikes - (OLD.vote_type = 'dislike')
     WHERE id = OLD.answer_id;
END;

PRAGMA user_version = 1;
";
