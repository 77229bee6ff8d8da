use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Json, debug_handler};
use serde::Deserialize;
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::games::{self, Game, Vibe};
use crate::{AppError, AppResult, AppState, now_ts, participants};

use super::{LobbySummary, PublicLobby, summarize};

#[derive(Debug, Default, Deserialize)]
pub struct ListFilter {
    pub game: Option<String>,
    pub rank: Option<String>,
    pub vibe: Option<String>,
    pub mic_required: Option<bool>,
}

/// Lists active, unexpired lobbies, newest first. Filter values are
/// checked against the closed vocabularies so a typo reads as a 400
/// instead of an empty list.
pub async fn list(pool: &SqlitePool, filter: &ListFilter) -> AppResult<Vec<LobbySummary>> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT * FROM public_lobbies WHERE status = 'active' AND expires_at > ",
    );
    query.push_bind(now_ts());

    if let Some(game) = &filter.game {
        let game = Game::parse(game)?;
        query.push(" AND game = ").push_bind(game.as_str());
    }
    if let Some(rank) = &filter.rank {
        query.push(" AND rank = ").push_bind(rank.clone());
    }
    if let Some(vibe) = &filter.vibe {
        let vibe = Vibe::parse(vibe)?;
        query.push(" AND vibe = ").push_bind(vibe.as_str());
    }
    if let Some(mic_required) = filter.mic_required {
        query.push(" AND mic_required = ").push_bind(mic_required);
    }
    query.push(" ORDER BY created_at DESC");

    let lobbies: Vec<PublicLobby> = query.build_query_as().fetch_all(pool).await?;

    let mut out = Vec::with_capacity(lobbies.len());
    for lobby in lobbies {
        let count = participants::PUBLIC.count(pool, &lobby.id).await?;
        out.push(summarize(lobby, count));
    }
    Ok(out)
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_lobbies(
    State(db_pool): State<SqlitePool>,
    Query(filter): Query<ListFilter>,
) -> AppResult<impl IntoResponse> {
    let lobbies = list(&db_pool, &filter).await?;
    Ok(Json(lobbies))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RanksQuery {
    game: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn game_ranks(Query(query): Query<RanksQuery>) -> AppResult<impl IntoResponse> {
    let Some(game) = query.game else {
        return Err(AppError::Validation("game parameter is required".to_owned()));
    };
    let game = Game::parse(&game)?;

    let ranks: Vec<_> = games::ranks_for(game)
        .iter()
        .map(|(value, label)| json!({ "value": value, "label": label }))
        .collect();

    Ok(Json(json!({ "game": game.as_str(), "ranks": ranks })))
}
