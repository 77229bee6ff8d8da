//! Per-lobby participant registry.
//!
//! Public and private lobbies keep their members in separate tables with
//! the same shape, so the registry is parameterized by table name. The
//! UNIQUE (lobby_id, anon_token) constraint is what rejects duplicate
//! joins, atomically with the insert itself.

use serde::Serialize;
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

use crate::{AppError, now_ts};

pub const NICKNAME_MAX_CHARS: usize = 50;

/// A lobby member as exposed in detail responses. The anon token stays
/// out of every serialized view.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Participant {
    pub id: String,
    pub nickname: String,
    #[serde(serialize_with = "crate::serialize_ts")]
    pub joined_at: i64,
}

pub fn validate_nickname(nickname: &str) -> Result<(), AppError> {
    if nickname.chars().count() > NICKNAME_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "nickname must be at most {NICKNAME_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

#[derive(Clone, Copy)]
pub struct Registry {
    table: &'static str,
}

pub const PUBLIC: Registry = Registry {
    table: "public_lobby_participants",
};
pub const PRIVATE: Registry = Registry {
    table: "private_lobby_participants",
};

impl Registry {
    pub async fn count<'e, E>(&self, ex: E, lobby_id: &str) -> sqlx::Result<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (count,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM {} WHERE lobby_id = ?", self.table))
                .bind(lobby_id)
                .fetch_one(ex)
                .await?;
        Ok(count)
    }

    pub async fn insert<'e, E>(
        &self,
        ex: E,
        lobby_id: &str,
        anon_token: &str,
        nickname: &str,
    ) -> sqlx::Result<Participant>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::now_v7().to_string();
        let joined_at = now_ts();
        sqlx::query(&format!(
            "INSERT INTO {} (id, lobby_id, anon_token, nickname, joined_at) VALUES (?, ?, ?, ?, ?)",
            self.table
        ))
        .bind(&id)
        .bind(lobby_id)
        .bind(anon_token)
        .bind(nickname)
        .bind(joined_at)
        .execute(ex)
        .await?;

        Ok(Participant {
            id,
            nickname: nickname.to_owned(),
            joined_at,
        })
    }

    /// Removes one membership. Returns whether a row existed.
    pub async fn remove<'e, E>(&self, ex: E, lobby_id: &str, anon_token: &str) -> sqlx::Result<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE lobby_id = ? AND anon_token = ?",
            self.table
        ))
        .bind(lobby_id)
        .bind(anon_token)
        .execute(ex)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cascade step of lobby destruction: drops every membership.
    pub async fn remove_all<'e, E>(&self, ex: E, lobby_id: &str) -> sqlx::Result<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE lobby_id = ?", self.table))
            .bind(lobby_id)
            .execute(ex)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list<'e, E>(&self, ex: E, lobby_id: &str) -> sqlx::Result<Vec<Participant>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as(&format!(
            "SELECT id, nickname, joined_at FROM {} WHERE lobby_id = ? ORDER BY joined_at",
            self.table
        ))
        .bind(lobby_id)
        .fetch_all(ex)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_length_is_bounded() {
        assert!(validate_nickname("").is_ok());
        assert!(validate_nickname(&"x".repeat(NICKNAME_MAX_CHARS)).is_ok());
        assert!(validate_nickname(&"x".repeat(NICKNAME_MAX_CHARS + 1)).is_err());
    }
}
