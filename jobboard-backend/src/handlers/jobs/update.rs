use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::HeaderMap;
use axum::response::Json;
use chrono::Utc;
use serde_json::Value;

use crate::handlers::auth::utils::authenticate_required;
use crate::handlers::jobs::get::parse_job_id;
use crate::handlers::utils::job_to_payload;
use crate::{error::ApiError, state::AppState};
use jobboard_db::jobs as db_jobs;

/// PUT /api/jobs/{jobId}
/// Owner-only edit. The UPDATE itself is owner-scoped as well, so a racing
/// ownership change cannot slip through between check and write.
pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(path_params): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let viewer = authenticate_required(&state, &headers).await?;
    let job_id = parse_job_id(&path_params)?;

    let payload = body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0
        .clone();
    let dto: super::dto::JobPayload = serde_json::from_value(payload).map_err(ApiError::from)?;
    let job = dto.validate()?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let existing = db_jobs::find_by_primary_key(&mut *conn, &job_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    if existing.user_id != viewer {
        return Err(ApiError::forbidden("only the owner can edit a posting"));
    }

    let updated_row = db_jobs::JobsRow {
        id: existing.id,
        title: job.title,
        company_name: job.company_name,
        description: job.description,
        location: job.location,
        job_type: job.job_type.as_str().to_string(),
        user_id: existing.user_id,
        created_at: existing.created_at,
        updated_at: Utc::now().to_rfc3339(),
    };

    let affected = db_jobs::update_by_id_and_owner(&mut *conn, &job_id, &viewer, &updated_row)
        .await
        .map_err(ApiError::from)?;
    if affected == 0 {
        return Err(ApiError::not_found("job not found"));
    }

    Ok(Json(job_to_payload(&updated_row)))
}
