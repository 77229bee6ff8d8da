//! Public matchmaking lobbies, browsable by anyone.

mod delete;
mod detail;
mod join;
mod list;
mod new;

use axum::Router;
use axum::routing::{get, post};
use serde::Serialize;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::games::{self, Game, Vibe};
use crate::participants::{self, Participant};
use crate::{AppError, AppResult, AppState, now_ts};

pub use delete::delete;
pub use join::{join, leave};
pub use list::{ListFilter, list};
pub use new::{CreateLobby, create};

pub const DEFAULT_CAPACITY: i64 = 10;
pub const MIN_CAPACITY: i64 = 2;
pub const MAX_CAPACITY: i64 = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_lobbies).post(new::create_lobby))
        .route("/ranks", get(list::game_ranks))
        .route("/{id}", get(detail::lobby_detail).delete(delete::delete_lobby))
        .route("/{id}/join", post(join::join_lobby))
        .route("/{id}/leave", post(join::leave_lobby))
}

/// Database row for a public lobby. `creator_token` only ever gates
/// deletion and never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublicLobby {
    pub id: String,
    pub game: String,
    pub rank: String,
    pub vibe: String,
    pub mic_required: bool,
    pub region: String,
    pub max_participants: i64,
    pub status: String,
    pub creator_token: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl PublicLobby {
    pub fn is_expired(&self) -> bool {
        now_ts() >= self.expires_at
    }

    /// Human-readable composition of the stored labels, presentation only.
    pub fn display_title(&self) -> String {
        let game = Game::parse(&self.game).map(Game::label).unwrap_or("Unknown");
        let vibe = Vibe::parse(&self.vibe).map(Vibe::label).unwrap_or("Unknown");
        format!("{} • {} • {}", game, games::title_case(&self.rank), vibe)
    }
}

pub(crate) async fn fetch<'e, E>(ex: E, id: &str) -> AppResult<PublicLobby>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, PublicLobby>("SELECT * FROM public_lobbies WHERE id = ?")
        .bind(id)
        .fetch_optional(ex)
        .await?
        .ok_or(AppError::NotFound)
}

#[derive(Debug, Serialize)]
pub struct LobbySummary {
    pub id: String,
    pub display_title: String,
    pub game: String,
    pub rank: String,
    pub vibe: String,
    pub mic_required: bool,
    pub region: String,
    pub participant_count: i64,
    pub max_participants: i64,
    pub is_full: bool,
    pub status: String,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
pub struct LobbyDetail {
    pub id: String,
    pub display_title: String,
    pub game: String,
    pub rank: String,
    pub vibe: String,
    pub mic_required: bool,
    pub region: String,
    pub participants: Vec<Participant>,
    pub participant_count: i64,
    pub max_participants: i64,
    pub is_full: bool,
    pub status: String,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub created_at: i64,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub expires_at: i64,
}

pub(crate) fn summarize(lobby: PublicLobby, participant_count: i64) -> LobbySummary {
    LobbySummary {
        display_title: lobby.display_title(),
        is_full: participant_count >= lobby.max_participants,
        id: lobby.id,
        game: lobby.game,
        rank: lobby.rank,
        vibe: lobby.vibe,
        mic_required: lobby.mic_required,
        region: lobby.region,
        participant_count,
        max_participants: lobby.max_participants,
        status: lobby.status,
        created_at: lobby.created_at,
    }
}

/// Loads the full lobby view. An expired lobby answers with the expiry
/// error even while its row still exists.
pub async fn fetch_detail(pool: &SqlitePool, id: &str) -> AppResult<LobbyDetail> {
    let lobby = fetch(pool, id).await?;
    if lobby.is_expired() {
        return Err(AppError::LobbyExpired);
    }
    let members = participants::PUBLIC.list(pool, id).await?;
    let participant_count = members.len() as i64;

    Ok(LobbyDetail {
        display_title: lobby.display_title(),
        is_full: participant_count >= lobby.max_participants,
        id: lobby.id,
        game: lobby.game,
        rank: lobby.rank,
        vibe: lobby.vibe,
        mic_required: lobby.mic_required,
        region: lobby.region,
        participants: members,
        participant_count,
        max_participants: lobby.max_participants,
        status: lobby.status,
        created_at: lobby.created_at,
        expires_at: lobby.expires_at,
    })
}
