use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Json;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};
use jobboard_db::jobs as db_jobs;

/// GET /api/jobs/locations
/// Every location currently in use, deduplicated and sorted, for the filter
/// dropdown. Independent of the active filters.
pub async fn locations(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let locations = db_jobs::distinct_locations(&mut *conn)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({ "locations": locations })))
}
