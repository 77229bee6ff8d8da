use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Json, debug_handler};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn lobby_detail(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let detail = super::fetch_detail(&db_pool, &id.to_string()).await?;
    Ok(Json(detail))
}
