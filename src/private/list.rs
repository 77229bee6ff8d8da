use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, debug_handler};
use sqlx::SqlitePool;

use crate::anon::AnonIdentity;
use crate::{AppResult, AppState, now_ts, participants};

use super::{LobbySummary, PrivateLobby, summarize};

/// Lobbies created by this caller, newest first. Nobody else can
/// enumerate private lobbies; everyone else goes through the code.
pub async fn list_for(pool: &SqlitePool, creator_token: &str) -> AppResult<Vec<LobbySummary>> {
    let lobbies: Vec<PrivateLobby> = sqlx::query_as(
        "SELECT * FROM private_lobbies
         WHERE creator_token = ? AND expires_at > ?
         ORDER BY created_at DESC",
    )
    .bind(creator_token)
    .bind(now_ts())
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(lobbies.len());
    for lobby in lobbies {
        let count = participants::PRIVATE.count(pool, &lobby.id).await?;
        out.push(summarize(lobby, count));
    }
    Ok(out)
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_lobbies(
    State(db_pool): State<SqlitePool>,
    AnonIdentity(token): AnonIdentity,
) -> AppResult<impl IntoResponse> {
    let lobbies = list_for(&db_pool, &token).await?;
    Ok(Json(lobbies))
}
