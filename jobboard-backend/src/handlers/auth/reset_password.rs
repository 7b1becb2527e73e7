use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Json;
use chrono::{DateTime, Utc};
use jobboard_db::{reset_tokens as db_reset_tokens, users as db_users};
use serde_json::{json, Value};

use crate::handlers::auth::utils::MIN_PASSWORD_LENGTH;
use crate::{error::ApiError, state::AppState};

/// POST /api/auth/reset-password
/// Consumes a valid reset token and replaces the account's password hash.
pub async fn reset_password(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let payload = body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0
        .clone();
    let dto: super::dto::ResetPassword = serde_json::from_value(payload).map_err(ApiError::from)?;

    if dto.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let digest = jobboard_auth::sha256_hex(dto.token.trim());

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let token_row = db_reset_tokens::find_unused_by_hash(&mut *conn, &digest)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::bad_request("invalid or expired reset token"))?;

    let expires_at = DateTime::parse_from_rfc3339(&token_row.expires_at)
        .map_err(|e| ApiError::Unexpected(format!("stored expiry unparsable: {e}")))?;
    if expires_at < Utc::now() {
        return Err(ApiError::bad_request("invalid or expired reset token"));
    }

    let password_hash = jobboard_auth::hash_password(&dto.password)
        .map_err(|e| ApiError::Unexpected(e.to_string()))?;
    let now = Utc::now().to_rfc3339();

    let updated =
        db_users::update_password_hash(&mut *conn, &token_row.user_id, &password_hash, &now)
            .await
            .map_err(ApiError::from)?;
    if updated == 0 {
        // Account deleted since the token was issued.
        return Err(ApiError::bad_request("invalid or expired reset token"));
    }

    db_reset_tokens::mark_used(&mut *conn, &digest)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %token_row.user_id, "password reset completed");

    Ok(Json(json!({ "message": "Password updated. You can now log in." })))
}
