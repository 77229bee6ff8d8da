use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, debug_handler};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::anon::AnonIdentity;
use crate::games::{self, Game, Vibe};
use crate::{AppError, AppResult, AppState, LOBBY_LIFETIME_SECS, LobbyStatus, now_ts};

use super::{DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY, PublicLobby};

const REGION_MAX_CHARS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CreateLobby {
    pub game: String,
    pub rank: String,
    pub vibe: String,
    #[serde(default)]
    pub mic_required: bool,
    #[serde(default)]
    pub region: String,
    pub max_participants: Option<i64>,
}

/// Creates a public lobby after validating its vocabulary fields.
pub async fn create(
    pool: &SqlitePool,
    creator_token: &str,
    req: &CreateLobby,
) -> AppResult<PublicLobby> {
    let game = Game::parse(&req.game)?;
    games::validate_rank(game, &req.rank)?;
    let vibe = Vibe::parse(&req.vibe)?;

    let max_participants = req.max_participants.unwrap_or(DEFAULT_CAPACITY);
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&max_participants) {
        return Err(AppError::Validation(format!(
            "public lobbies hold between {MIN_CAPACITY} and {MAX_CAPACITY} participants"
        )));
    }
    if req.region.chars().count() > REGION_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "region must be at most {REGION_MAX_CHARS} characters"
        )));
    }

    let now = now_ts();
    let lobby = PublicLobby {
        id: Uuid::now_v7().to_string(),
        game: game.as_str().to_owned(),
        rank: req.rank.clone(),
        vibe: vibe.as_str().to_owned(),
        mic_required: req.mic_required,
        region: req.region.clone(),
        max_participants,
        status: LobbyStatus::Active.as_str().to_owned(),
        creator_token: creator_token.to_owned(),
        created_at: now,
        expires_at: now + LOBBY_LIFETIME_SECS,
    };

    sqlx::query(
        "INSERT INTO public_lobbies
         (id, game, rank, vibe, mic_required, region, max_participants, status, creator_token, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&lobby.id)
    .bind(&lobby.game)
    .bind(&lobby.rank)
    .bind(&lobby.vibe)
    .bind(lobby.mic_required)
    .bind(&lobby.region)
    .bind(lobby.max_participants)
    .bind(&lobby.status)
    .bind(&lobby.creator_token)
    .bind(lobby.created_at)
    .bind(lobby.expires_at)
    .execute(pool)
    .await?;

    tracing::info!(lobby_id = %lobby.id, game = %lobby.game, "public lobby created");
    Ok(lobby)
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_lobby(
    State(db_pool): State<SqlitePool>,
    AnonIdentity(token): AnonIdentity,
    Json(req): Json<CreateLobby>,
) -> AppResult<impl IntoResponse> {
    let lobby = create(&db_pool, &token, &req).await?;
    let detail = super::fetch_detail(&db_pool, &lobby.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Lobby created successfully",
            "lobby": detail,
        })),
    ))
}
