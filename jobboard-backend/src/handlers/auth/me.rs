use std::sync::Arc;

use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::response::Json;
use jobboard_db::users as db_users;
use serde_json::Value;

use crate::handlers::auth::utils::authenticate_required;
use crate::handlers::utils::user_to_payload;
use crate::{error::ApiError, state::AppState};

/// GET /api/auth/me
/// Returns the viewer's identity, or 401 without a valid session.
pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user_id = authenticate_required(&state, &headers).await?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let user = db_users::find_by_primary_key(&mut *conn, &user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(user_to_payload(&user)))
}
