//! Identity-stripped archive of destroyed lobbies.
//!
//! Exactly one archive row is written per lobby, at the moment the lobby
//! is destroyed, whether by its creator or by the expiry sweep. Rows
//! carry aggregate counts and timing only. Archive write, participant
//! cascade and lobby delete share one transaction so no reader ever sees
//! a half-destroyed lobby.

use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::private::PrivateLobby;
use crate::public::PublicLobby;
use crate::{AppResult, now_ts, participants};

/// Writes the archive row for a public lobby, then removes the lobby and
/// its members. Runs inside the caller's transaction.
pub async fn archive_public(
    tx: &mut Transaction<'_, Sqlite>,
    lobby: &PublicLobby,
) -> AppResult<()> {
    let count = participants::PUBLIC.count(&mut **tx, &lobby.id).await?;
    sqlx::query(
        "INSERT INTO archived_public_lobby_stats
         (id, lobby_id, game, rank, vibe, total_participants, created_at, expired_at, mic_required, region)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(&lobby.id)
    .bind(&lobby.game)
    .bind(&lobby.rank)
    .bind(&lobby.vibe)
    .bind(count)
    .bind(lobby.created_at)
    .bind(now_ts())
    .bind(lobby.mic_required)
    .bind(&lobby.region)
    .execute(&mut **tx)
    .await?;

    participants::PUBLIC.remove_all(&mut **tx, &lobby.id).await?;
    sqlx::query("DELETE FROM public_lobbies WHERE id = ?")
        .bind(&lobby.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Private counterpart of [`archive_public`]. The row keeps no creator
/// token and no lobby code, only counts and timing.
pub async fn archive_private(
    tx: &mut Transaction<'_, Sqlite>,
    lobby: &PrivateLobby,
) -> AppResult<()> {
    let count = participants::PRIVATE.count(&mut **tx, &lobby.id).await?;
    sqlx::query(
        "INSERT INTO archived_private_lobby_stats
         (id, lobby_id, total_participants, created_at, expired_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(&lobby.id)
    .bind(count)
    .bind(lobby.created_at)
    .bind(now_ts())
    .execute(&mut **tx)
    .await?;

    participants::PRIVATE.remove_all(&mut **tx, &lobby.id).await?;
    sqlx::query("DELETE FROM private_lobbies WHERE id = ?")
        .bind(&lobby.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Archives and deletes every lobby whose expiry has passed. Returns how
/// many lobbies were reclaimed. Lazy expiry checks on read and join are
/// the primary gate; this only reclaims storage.
pub async fn sweep_expired(pool: &SqlitePool) -> AppResult<u64> {
    let now = now_ts();
    let mut reclaimed = 0;

    let expired: Vec<PublicLobby> =
        sqlx::query_as("SELECT * FROM public_lobbies WHERE expires_at <= ?")
            .bind(now)
            .fetch_all(pool)
            .await?;
    for lobby in expired {
        let mut tx = pool.begin().await?;
        archive_public(&mut tx, &lobby).await?;
        tx.commit().await?;
        reclaimed += 1;
    }

    let expired: Vec<PrivateLobby> =
        sqlx::query_as("SELECT * FROM private_lobbies WHERE expires_at <= ?")
            .bind(now)
            .fetch_all(pool)
            .await?;
    for lobby in expired {
        let mut tx = pool.begin().await?;
        archive_private(&mut tx, &lobby).await?;
        tx.commit().await?;
        reclaimed += 1;
    }

    if reclaimed > 0 {
        tracing::info!(reclaimed, "expired lobbies archived");
    }
    Ok(reclaimed)
}

/// Spawns the periodic sweep. A zero interval disables it and leaves
/// expired lobbies to the lazy checks alone.
pub fn spawn_sweeper(pool: SqlitePool, interval_secs: u64) {
    if interval_secs == 0 {
        return;
    }
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            if let Err(err) = sweep_expired(&pool).await {
                tracing::warn!(error = %err, "expiry sweep failed");
            }
        }
    });
}
