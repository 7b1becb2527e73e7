use crate::DbBackend;
use sqlx::Executor;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct JobsRow {
    pub id: uuid::Uuid,
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub user_id: uuid::Uuid,
    pub created_at: String,
    pub updated_at: String,
}

const SELECT_COLUMNS: &str =
    "id, title, company_name, description, location, job_type, user_id, created_at, updated_at";

pub async fn find_by_primary_key<'e, E>(
    executor: E,
    job_id: &uuid::Uuid,
) -> Result<Option<JobsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as::<_, JobsRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM jobs WHERE id = ?"
    ))
    .bind(job_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_job<'e, E>(executor: E, row: &JobsRow) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query(&format!(
        "INSERT INTO jobs ({SELECT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(row.id)
    .bind(&row.title)
    .bind(&row.company_name)
    .bind(&row.description)
    .bind(&row.location)
    .bind(&row.job_type)
    .bind(row.user_id)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Updates a listing only when it belongs to `owner_id`. Returns the number of
/// rows touched, so callers can distinguish "not yours" from "done".
pub async fn update_by_id_and_owner<'e, E>(
    executor: E,
    job_id: &uuid::Uuid,
    owner_id: &uuid::Uuid,
    row: &JobsRow,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query(
        "UPDATE jobs SET title = ?, company_name = ?, description = ?, location = ?, job_type = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(&row.title)
    .bind(&row.company_name)
    .bind(&row.description)
    .bind(&row.location)
    .bind(&row.job_type)
    .bind(&row.updated_at)
    .bind(job_id)
    .bind(owner_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_id_and_owner<'e, E>(
    executor: E,
    job_id: &uuid::Uuid,
    owner_id: &uuid::Uuid,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("DELETE FROM jobs WHERE id = ? AND user_id = ?")
        .bind(job_id)
        .bind(owner_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// All locations currently in use, deduplicated and sorted. Blank entries are
/// dropped so the location dropdown never offers an empty option.
pub async fn distinct_locations<'e, E>(executor: E) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let raw: Vec<Option<String>> = sqlx::query_scalar("SELECT location FROM jobs")
        .fetch_all(executor)
        .await?;
    Ok(distinct_sorted(raw))
}

pub fn distinct_sorted(values: impl IntoIterator<Item = Option<String>>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_sorted_drops_blanks_and_duplicates() {
        let input = vec![
            Some("NY".to_string()),
            Some("NY".to_string()),
            Some(String::new()),
            Some("LA".to_string()),
            None,
        ];
        assert_eq!(distinct_sorted(input), vec!["LA", "NY"]);
    }

    #[test]
    fn distinct_sorted_empty_input() {
        assert_eq!(distinct_sorted(Vec::new()), Vec::<String>::new());
    }
}
