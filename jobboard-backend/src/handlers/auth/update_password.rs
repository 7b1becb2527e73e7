use std::sync::Arc;

use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::response::Json;
use chrono::Utc;
use jobboard_db::users as db_users;
use serde_json::{json, Value};

use crate::handlers::auth::utils::{authenticate_required, MIN_PASSWORD_LENGTH};
use crate::{error::ApiError, state::AppState};

/// POST /api/auth/update-password
/// Authenticated change; the current password must verify first.
pub async fn update_password(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let user_id = authenticate_required(&state, &headers).await?;

    let payload = body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0
        .clone();
    let dto: super::dto::UpdatePassword =
        serde_json::from_value(payload).map_err(ApiError::from)?;

    if dto.new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let user = db_users::find_by_primary_key(&mut *conn, &user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(ApiError::unauthorized)?;

    jobboard_auth::verify_password(&dto.current_password, &user.password_hash)
        .map_err(|_| ApiError::forbidden("current password is incorrect"))?;

    let password_hash = jobboard_auth::hash_password(&dto.new_password)
        .map_err(|e| ApiError::Unexpected(e.to_string()))?;
    let now = Utc::now().to_rfc3339();
    db_users::update_password_hash(&mut *conn, &user_id, &password_hash, &now)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({ "ok": true })))
}
