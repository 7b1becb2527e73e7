use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{header::SET_COOKIE, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use jobboard_auth::SessionEvent;
use jobboard_db::users as db_users;
use serde_json::json;

use crate::handlers::auth::utils::session_cookie;
use crate::{error::ApiError, state::AppState};

/// POST /api/auth/login
/// Accepts { email, password } and if valid issues an HttpOnly cookie with an HS256 JWT.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<serde_json::Value>>,
) -> Result<Response, ApiError> {
    let payload = body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0
        .clone();
    let dto: super::dto::Login = serde_json::from_value(payload).map_err(ApiError::from)?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let user = db_users::find_by_email(&mut *conn, &dto.email)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(ApiError::unauthorized)?;

    jobboard_auth::verify_password(&dto.password, &user.password_hash)
        .map_err(|_| ApiError::unauthorized())?;

    let token = state
        .jwt
        .issue_token(&user.id, state.auth_settings.session_ttl_hours)
        .map_err(|e| ApiError::Unexpected(format!("jwt encode failed: {e}")))?;

    state
        .session_events
        .emit(SessionEvent::SignedIn { user_id: user.id });

    let cookie = session_cookie(&token);
    let mut resp = (StatusCode::OK, Json(json!({ "userId": user.id }))).into_response();
    resp.headers_mut().append(
        SET_COOKIE,
        axum::http::HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::Unexpected(e.to_string()))?,
    );
    Ok(resp)
}
