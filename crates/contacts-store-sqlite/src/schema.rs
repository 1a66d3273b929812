//! SQL schema for the contacts SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The CHECK constraints mirror the length rules of
/// [`contacts_core::validate`] so a client that skips validation still cannot
/// store a malformed row.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS contacts (
    id          TEXT PRIMARY KEY,
    owner       TEXT NOT NULL,
    name        TEXT NOT NULL CHECK (length(name) BETWEEN 2 AND 100),
    email       TEXT NOT NULL CHECK (length(email) <= 255 AND email LIKE '%_@_%'),
    phone       TEXT NOT NULL CHECK (length(phone) BETWEEN 10 AND 20),
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC, fixed width; sorts lexically
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_owner_created_idx
    ON contacts(owner, created_at);

PRAGMA user_version = 1;
";
