use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::handlers::auth::utils::authenticate_required;
use crate::handlers::utils::job_to_payload;
use crate::{error::ApiError, state::AppState};
use jobboard_db::jobs as db_jobs;

/// POST /api/jobs
/// Creates a posting owned by the viewer. Any client-supplied owner is ignored.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let viewer = authenticate_required(&state, &headers).await?;

    let payload = body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0
        .clone();
    let dto: super::dto::JobPayload = serde_json::from_value(payload).map_err(ApiError::from)?;
    let job = dto.validate()?;

    let now = Utc::now().to_rfc3339();
    let row = db_jobs::JobsRow {
        id: Uuid::new_v4(),
        title: job.title,
        company_name: job.company_name,
        description: job.description,
        location: job.location,
        job_type: job.job_type.as_str().to_string(),
        user_id: viewer,
        created_at: now.clone(),
        updated_at: now,
    };

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    db_jobs::insert_job(&mut *conn, &row)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(job_id = %row.id, user_id = %viewer, "job posted");

    Ok((StatusCode::CREATED, Json(job_to_payload(&row))))
}
