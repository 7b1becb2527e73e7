use crate::DbBackend;
use sqlx::Executor;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct UsersRow {
    pub id: uuid::Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

pub async fn find_by_primary_key<'e, E>(
    executor: E,
    user_id: &uuid::Uuid,
) -> Result<Option<UsersRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as::<_, UsersRow>(
        "SELECT id, email, full_name, password_hash, created_at, updated_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Email lookups are case-insensitive; addresses are stored lowercased.
pub async fn find_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<UsersRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as::<_, UsersRow>(
        "SELECT id, email, full_name, password_hash, created_at, updated_at FROM users WHERE email = ?",
    )
    .bind(email.trim().to_lowercase())
    .fetch_optional(executor)
    .await
}

pub async fn insert_user<'e, E>(executor: E, row: &UsersRow) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query(
        "INSERT INTO users (id, email, full_name, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(row.id)
    .bind(&row.email)
    .bind(&row.full_name)
    .bind(&row.password_hash)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update_password_hash<'e, E>(
    executor: E,
    user_id: &uuid::Uuid,
    password_hash: &str,
    updated_at: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(updated_at)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
