use crate::DbBackend;
use sqlx::Executor;

/// A single-use password reset token. Only the SHA-256 digest of the token is
/// stored; the plaintext value goes out in the reset email and nowhere else.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct PasswordResetTokensRow {
    pub token_hash: String,
    pub user_id: uuid::Uuid,
    pub expires_at: String,
    pub used: i32,
}

pub async fn insert_token<'e, E>(
    executor: E,
    row: &PasswordResetTokensRow,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query(
        "INSERT INTO password_reset_tokens (token_hash, user_id, expires_at, used) VALUES (?, ?, ?, ?)",
    )
    .bind(&row.token_hash)
    .bind(row.user_id)
    .bind(&row.expires_at)
    .bind(row.used)
    .execute(executor)
    .await?;
    Ok(())
}

/// Looks up an unused token by digest. Expiry is checked against `now` by the
/// caller so the comparison stays in one timezone-aware place.
pub async fn find_unused_by_hash<'e, E>(
    executor: E,
    token_hash: &str,
) -> Result<Option<PasswordResetTokensRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as::<_, PasswordResetTokensRow>(
        "SELECT token_hash, user_id, expires_at, used FROM password_reset_tokens WHERE token_hash = ? AND used = 0",
    )
    .bind(token_hash)
    .fetch_optional(executor)
    .await
}

pub async fn mark_used<'e, E>(executor: E, token_hash: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("UPDATE password_reset_tokens SET used = 1 WHERE token_hash = ?")
        .bind(token_hash)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
