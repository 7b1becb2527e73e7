use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use jobboard_db::users as db_users;
use serde_json::Value;
use uuid::Uuid;

use crate::handlers::auth::utils::MIN_PASSWORD_LENGTH;
use crate::handlers::utils::user_to_payload;
use crate::validation::{to_payload, ValidationIssue};
use crate::{error::ApiError, state::AppState};

/// POST /api/auth/signup
/// Creates an account from { full_name, email, password }.
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0
        .clone();
    let dto: super::dto::Signup = serde_json::from_value(payload).map_err(ApiError::from)?;

    let full_name = dto.full_name.trim().to_string();
    let email = dto.email.trim().to_lowercase();

    let mut issues: Vec<ValidationIssue> = Vec::new();
    if full_name.is_empty() {
        issues.push(ValidationIssue::new(
            "full_name",
            "required",
            "full name is required",
        ));
    }
    if !is_plausible_email(&email) {
        issues.push(ValidationIssue::new(
            "email",
            "invalid",
            "a valid email address is required",
        ));
    }
    if dto.password.len() < MIN_PASSWORD_LENGTH {
        issues.push(ValidationIssue::new(
            "password",
            "too_short",
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    if !issues.is_empty() {
        return Err(ApiError::Validation(to_payload(&issues)));
    }

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;

    if db_users::find_by_email(&mut *conn, &email)
        .await
        .map_err(ApiError::from)?
        .is_some()
    {
        return Err(ApiError::bad_request("email is already registered"));
    }

    let password_hash = jobboard_auth::hash_password(&dto.password)
        .map_err(|e| ApiError::Unexpected(e.to_string()))?;

    let now = Utc::now().to_rfc3339();
    let row = db_users::UsersRow {
        id: Uuid::new_v4(),
        email,
        full_name,
        password_hash,
        created_at: now.clone(),
        updated_at: now,
    };
    db_users::insert_user(&mut *conn, &row)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %row.id, "account created");

    Ok((StatusCode::CREATED, Json(user_to_payload(&row))))
}

/// A light plausibility check; delivery is the only real validator.
fn is_plausible_email(email: &str) -> bool {
    if email.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_plausible_email;

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("jane@example.com"));
        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("janeexample.com"));
        assert!(!is_plausible_email("jane@com"));
        assert!(!is_plausible_email("jane doe@example.com"));
        assert!(!is_plausible_email("jane@.com"));
    }
}
