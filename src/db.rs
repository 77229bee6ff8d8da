//! SQLite pool and schema.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

/// Opens the database with a single long-lived connection.
///
/// SQLite serializes writers anyway; funneling every request through one
/// connection also makes each check-then-insert sequence atomic with
/// respect to other requests, which is what keeps lobby capacity correct
/// under concurrent joins.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS public_lobbies (
        id TEXT PRIMARY KEY,
        game TEXT NOT NULL,
        rank TEXT NOT NULL,
        vibe TEXT NOT NULL,
        mic_required INTEGER NOT NULL DEFAULT 0,
        region TEXT NOT NULL DEFAULT '',
        max_participants INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        creator_token TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_public_lobbies_browse
        ON public_lobbies (game, status, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_public_lobbies_expiry
        ON public_lobbies (expires_at)",
    "CREATE TABLE IF NOT EXISTS private_lobbies (
        id TEXT PRIMARY KEY,
        creator_token TEXT NOT NULL,
        max_participants INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        lobby_code TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_private_lobbies_creator
        ON private_lobbies (creator_token, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_private_lobbies_expiry
        ON private_lobbies (expires_at)",
    "CREATE TABLE IF NOT EXISTS public_lobby_participants (
        id TEXT PRIMARY KEY,
        lobby_id TEXT NOT NULL,
        anon_token TEXT NOT NULL,
        nickname TEXT NOT NULL DEFAULT '',
        joined_at INTEGER NOT NULL,
        UNIQUE (lobby_id, anon_token)
    )",
    "CREATE INDEX IF NOT EXISTS idx_public_participants_lobby
        ON public_lobby_participants (lobby_id, joined_at)",
    "CREATE TABLE IF NOT EXISTS private_lobby_participants (
        id TEXT PRIMARY KEY,
        lobby_id TEXT NOT NULL,
        anon_token TEXT NOT NULL,
        nickname TEXT NOT NULL DEFAULT '',
        joined_at INTEGER NOT NULL,
        UNIQUE (lobby_id, anon_token)
    )",
    "CREATE INDEX IF NOT EXISTS idx_private_participants_lobby
        ON private_lobby_participants (lobby_id, joined_at)",
    "CREATE TABLE IF NOT EXISTS archived_public_lobby_stats (
        id TEXT PRIMARY KEY,
        lobby_id TEXT NOT NULL,
        game TEXT NOT NULL,
        rank TEXT NOT NULL,
        vibe TEXT NOT NULL,
        total_participants INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        expired_at INTEGER NOT NULL,
        mic_required INTEGER NOT NULL DEFAULT 0,
        region TEXT NOT NULL DEFAULT ''
    )",
    "CREATE INDEX IF NOT EXISTS idx_archived_public_lobby
        ON archived_public_lobby_stats (lobby_id)",
    "CREATE TABLE IF NOT EXISTS archived_private_lobby_stats (
        id TEXT PRIMARY KEY,
        lobby_id TEXT NOT NULL,
        total_participants INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        expired_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_archived_private_lobby
        ON archived_private_lobby_stats (lobby_id)",
];

/// Creates the schema. Idempotent; runs at every startup.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
