use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{header::SET_COOKIE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use jobboard_auth::SessionEvent;
use serde_json::json;

use crate::handlers::auth::utils::{authenticate_optional, clear_session_cookie};
use crate::{error::ApiError, state::AppState};

/// POST /api/auth/logout
/// Clear cookie by setting expired Set-Cookie
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(user_id) = authenticate_optional(&state, &headers).await? {
        state
            .session_events
            .emit(SessionEvent::SignedOut { user_id });
    }

    let mut resp = (StatusCode::OK, Json(json!({ "ok": true }))).into_response();
    resp.headers_mut().append(
        SET_COOKIE,
        axum::http::HeaderValue::from_str(&clear_session_cookie())
            .map_err(|e| ApiError::Unexpected(e.to_string()))?,
    );
    Ok(resp)
}
