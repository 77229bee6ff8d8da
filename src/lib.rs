pub mod anon;
pub mod archive;
pub mod db;
pub mod error;
pub mod games;
pub mod participants;
pub mod private;
pub mod public;

use axum::extract::FromRef;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use error::{AppError, AppResult};

/// Lobbies live for 24 hours from creation.
pub const LOBBY_LIFETIME_SECS: i64 = 24 * 60 * 60;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: AppConfig,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub anon_salt: String,
    pub sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        Ok(AppConfig {
            database_url: dotenv::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            bind_addr: dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned()),
            anon_salt: dotenv::var("ANON_TOKEN_SALT")
                .unwrap_or_else(|_| anon::DEFAULT_SALT.to_owned()),
            sweep_interval_secs: match dotenv::var("SWEEP_INTERVAL_SECS") {
                Ok(v) => v
                    .parse()
                    .map_err(|_| anyhow::anyhow!("SWEEP_INTERVAL_SECS must be an integer"))?,
                Err(_) => 3600,
            },
        })
    }
}

/// Stored lobby status. Only the active/full distinction is persisted;
/// expiry is computed from `expires_at` on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyStatus {
    Active,
    Full,
}

impl LobbyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LobbyStatus::Active => "active",
            LobbyStatus::Full => "full",
        }
    }
}

/// Current time as unix seconds. Every stored timestamp uses this clock.
pub fn now_ts() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

pub fn rfc3339(ts: i64) -> String {
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}

/// Serde helper so response timestamps go out as RFC 3339 strings.
pub fn serialize_ts<S: serde::Serializer>(ts: &i64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&rfc3339(*ts))
}
