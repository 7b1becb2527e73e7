use axum::http::HeaderMap;
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Session cookie name used for authentication.
pub const SESSION_COOKIE_NAME: &str = "jobboard_session";

/// Minimum accepted password length, matching the signup form contract.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Extract authentication token from headers.
/// Checks Authorization header first, then falls back to session cookie.
/// Returns the token in "Bearer <token>" format for use with the authenticator.
pub fn extract_auth_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        return Some(auth_header.to_string());
    }

    extract_session_cookie(headers).map(|token| format!("Bearer {}", token))
}

/// Extract the raw session token value from cookies (without "Bearer" prefix).
fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|c| {
                cookie::Cookie::parse(c.trim())
                    .ok()
                    .filter(|parsed| parsed.name() == SESSION_COOKIE_NAME)
                    .map(|parsed| parsed.value().to_string())
            })
        })
}

/// Authenticate the request and require a concrete user identity.
pub async fn authenticate_required(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Uuid, ApiError> {
    let auth_token = extract_auth_token(headers);

    let auth = match state.authenticator.authenticate(auth_token.as_deref()).await {
        Ok(a) => a,
        Err(e) => {
            debug!(error = ?e, header_present = auth_token.is_some(), "authentication failure");
            return Err(ApiError::from(e));
        }
    };

    auth.user_id.ok_or_else(ApiError::unauthorized)
}

/// Authenticate when credentials are present. Missing or failed credentials
/// yield `None` rather than an error; the listing treats those viewers as
/// anonymous.
pub async fn authenticate_optional(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Uuid>, ApiError> {
    let auth_token = match extract_auth_token(headers) {
        Some(token) => token,
        None => return Ok(None),
    };

    match state.authenticator.authenticate(Some(&auth_token)).await {
        Ok(auth) => Ok(auth.user_id),
        Err(_) => Ok(None),
    }
}

/// Build the Set-Cookie value carrying a fresh session token.
pub fn session_cookie(token: &str) -> String {
    cookie::Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(cookie::SameSite::Lax)
        .build()
        .to_string()
}

/// Set-Cookie value that clears the session.
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Max-Age=0; SameSite=Lax",
        SESSION_COOKIE_NAME
    )
}
