use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::HeaderMap;
use axum::response::Json;
use serde_json::{json, Value};

use crate::handlers::auth::utils::authenticate_required;
use crate::handlers::jobs::get::parse_job_id;
use crate::{error::ApiError, state::AppState};
use jobboard_db::jobs as db_jobs;

/// DELETE /api/jobs/{jobId}
/// Owner-only removal, enforced both here and in the DELETE's WHERE clause.
pub async fn delete_job(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(path_params): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let viewer = authenticate_required(&state, &headers).await?;
    let job_id = parse_job_id(&path_params)?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let existing = db_jobs::find_by_primary_key(&mut *conn, &job_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    if existing.user_id != viewer {
        return Err(ApiError::forbidden("only the owner can delete a posting"));
    }

    let affected = db_jobs::delete_by_id_and_owner(&mut *conn, &job_id, &viewer)
        .await
        .map_err(ApiError::from)?;
    if affected == 0 {
        return Err(ApiError::not_found("job not found"));
    }

    tracing::info!(job_id = %job_id, user_id = %viewer, "job deleted");

    Ok(Json(json!({ "deleted": true })))
}
