use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::response::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::handlers::utils::job_to_payload;
use crate::{error::ApiError, state::AppState};
use jobboard_db::jobs as db_jobs;

pub fn parse_job_id(path_params: &HashMap<String, String>) -> Result<Uuid, ApiError> {
    path_params
        .get("jobId")
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| ApiError::bad_request("jobId must be a UUID"))
}

/// GET /api/jobs/{jobId}
/// Single posting; readable without a session.
pub async fn get_job(
    Extension(state): Extension<Arc<AppState>>,
    Path(path_params): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let job_id = parse_job_id(&path_params)?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let job = db_jobs::find_by_primary_key(&mut *conn, &job_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    Ok(Json(job_to_payload(&job)))
}
