use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Query};
use serde_json::Value;

use crate::filters::{build_listing_query, page_count, FilterState, PAGE_SIZE};
use crate::handlers::auth::utils::authenticate_optional;
use crate::handlers::utils::job_to_payload;
use crate::{error::ApiError, state::AppState};
use jobboard_db::jobs as db_jobs;

/// GET /api/jobs
/// The filtered, paginated listing. Anonymous viewers see every posting;
/// authenticated viewers see only their own.
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let viewer = authenticate_optional(&state, &headers).await?;

    // An absent query string deserializes to an empty map; every parameter
    // stays independently optional.
    let filters =
        FilterState::from_params(&params).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let listing = build_listing_query(&filters, viewer);

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;

    let mut count_query = sqlx::query_scalar(&listing.count_sql);
    for param in &listing.text_params {
        count_query = count_query.bind(param);
    }
    if let Some(owner) = listing.owner {
        count_query = count_query.bind(owner);
    }
    let total: i64 = count_query
        .fetch_one(&mut *conn)
        .await
        .map_err(ApiError::from)?;

    let mut select_query = sqlx::query_as::<_, db_jobs::JobsRow>(&listing.select_sql);
    for param in &listing.text_params {
        select_query = select_query.bind(param);
    }
    if let Some(owner) = listing.owner {
        select_query = select_query.bind(owner);
    }
    let rows: Vec<db_jobs::JobsRow> = select_query
        .bind(listing.limit)
        .bind(listing.offset)
        .fetch_all(&mut *conn)
        .await
        .map_err(ApiError::from)?;

    let items: Vec<Value> = rows.iter().map(job_to_payload).collect();
    let total_pages = page_count(total as usize).max(1);

    Ok(Json(serde_json::json!({
        "items": items,
        "pagination": {
            "page": filters.page,
            "perPage": PAGE_SIZE,
            "total": total,
            "totalPages": total_pages
        }
    })))
}
