//! Private lobbies, reachable only through a shareable code.

mod delete;
mod detail;
mod join;
mod list;
mod new;

use axum::Router;
use axum::routing::{get, post};
use rand::seq::IndexedRandom;
use serde::Serialize;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::participants::{self, Participant};
use crate::{AppError, AppResult, AppState, now_ts};

pub use delete::delete;
pub use join::{join_by_code, leave};
pub use list::list_for;
pub use new::{CreateLobby, create};

pub const DEFAULT_CAPACITY: i64 = 5;
pub const MIN_CAPACITY: i64 = 2;
pub const MAX_CAPACITY: i64 = 5;

/// Code alphabet: uppercase letters and digits minus the visually
/// confusable 0, O, I and 1.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LEN: usize = 8;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_lobbies).post(new::create_lobby))
        .route("/by-code/{code}", get(detail::lobby_by_code))
        .route("/join/{code}", post(join::join_lobby))
        .route("/{id}/leave", post(join::leave_lobby))
        .route("/{id}", axum::routing::delete(delete::delete_lobby))
}

/// Database row for a private lobby.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrivateLobby {
    pub id: String,
    pub creator_token: String,
    pub max_participants: i64,
    pub status: String,
    pub lobby_code: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl PrivateLobby {
    pub fn is_expired(&self) -> bool {
        now_ts() >= self.expires_at
    }
}

/// One draw from the code space. 32^8 codes, so collisions are a retry,
/// never an exhaustion concern.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| *CODE_ALPHABET.choose(&mut rng).unwrap() as char)
        .collect()
}

pub(crate) async fn fetch<'e, E>(ex: E, id: &str) -> AppResult<PrivateLobby>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, PrivateLobby>("SELECT * FROM private_lobbies WHERE id = ?")
        .bind(id)
        .fetch_optional(ex)
        .await?
        .ok_or(AppError::NotFound)
}

/// Code lookup is case-insensitive; codes are stored uppercase.
pub(crate) async fn fetch_by_code<'e, E>(ex: E, code: &str) -> AppResult<PrivateLobby>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, PrivateLobby>("SELECT * FROM private_lobbies WHERE lobby_code = ?")
        .bind(code.to_uppercase())
        .fetch_optional(ex)
        .await?
        .ok_or(AppError::NotFound)
}

#[derive(Debug, Serialize)]
pub struct LobbySummary {
    pub id: String,
    pub lobby_code: String,
    pub participant_count: i64,
    pub max_participants: i64,
    pub is_full: bool,
    pub is_expired: bool,
    pub status: String,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub created_at: i64,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct LobbyDetail {
    pub id: String,
    pub lobby_code: String,
    pub participants: Vec<Participant>,
    pub participant_count: i64,
    pub max_participants: i64,
    pub is_full: bool,
    pub is_expired: bool,
    pub is_creator: bool,
    pub status: String,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub created_at: i64,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub expires_at: i64,
}

pub(crate) fn summarize(lobby: PrivateLobby, participant_count: i64) -> LobbySummary {
    LobbySummary {
        is_full: participant_count >= lobby.max_participants,
        is_expired: lobby.is_expired(),
        id: lobby.id,
        lobby_code: lobby.lobby_code,
        participant_count,
        max_participants: lobby.max_participants,
        status: lobby.status,
        created_at: lobby.created_at,
        expires_at: lobby.expires_at,
    }
}

/// Loads the full lobby view for a given caller. Expired lobbies answer
/// with the expiry error even while their row still exists.
pub async fn fetch_detail(pool: &SqlitePool, id: &str, viewer: &str) -> AppResult<LobbyDetail> {
    let lobby = fetch(pool, id).await?;
    if lobby.is_expired() {
        return Err(AppError::LobbyExpired);
    }
    let members = participants::PRIVATE.list(pool, id).await?;
    let participant_count = members.len() as i64;

    Ok(LobbyDetail {
        is_full: participant_count >= lobby.max_participants,
        is_expired: false,
        is_creator: lobby.creator_token == viewer,
        id: lobby.id,
        lobby_code: lobby.lobby_code,
        participants: members,
        participant_count,
        max_participants: lobby.max_participants,
        status: lobby.status,
        created_at: lobby.created_at,
        expires_at: lobby.expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_the_right_length() {
        for _ in 0..100 {
            assert_eq!(generate_code().len(), CODE_LEN);
        }
    }

    #[test]
    fn codes_never_contain_confusable_characters() {
        for _ in 0..1000 {
            let code = generate_code();
            assert!(
                !code.contains(['0', 'O', 'I', '1']),
                "confusable character in {code}"
            );
        }
    }

    #[test]
    fn code_alphabet_is_32_symbols() {
        assert_eq!(CODE_ALPHABET.len(), 32);
    }
}
