use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Json;
use chrono::{Duration, Utc};
use jobboard_db::{reset_tokens as db_reset_tokens, users as db_users};
use jobboard_mailer::MailMessage;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

/// The reply never reveals whether an account exists.
const GENERIC_REPLY: &str =
    "If an account exists for that address, a password reset email has been sent.";

/// POST /api/auth/forgot-password
/// Stores a hashed single-use reset token and emails the plaintext one.
pub async fn forgot_password(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let payload = body
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("missing request body"))?
        .0
        .clone();
    let dto: super::dto::ForgotPassword =
        serde_json::from_value(payload).map_err(ApiError::from)?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let maybe_user = db_users::find_by_email(&mut *conn, &dto.email)
        .await
        .map_err(ApiError::from)?;

    if let Some(user) = maybe_user {
        let token = jobboard_auth::generate_reset_token();
        let expires_at = (Utc::now()
            + Duration::minutes(state.auth_settings.reset_token_ttl_minutes))
        .to_rfc3339();

        let row = db_reset_tokens::PasswordResetTokensRow {
            token_hash: token.digest,
            user_id: user.id,
            expires_at,
            used: 0,
        };
        db_reset_tokens::insert_token(&mut *conn, &row)
            .await
            .map_err(ApiError::from)?;

        if let Some(mailer) = &state.mailer {
            let link = format!(
                "{}?token={}",
                state.auth_settings.reset_link_base, token.plaintext
            );
            let message = MailMessage::new(
                user.email.clone(),
                "Reset your password",
                format!(
                    "Hello {},\n\nA password reset was requested for your account. \
                     Use the link below to choose a new password:\n\n{}\n\n\
                     If you did not request this, you can ignore this email.",
                    user.full_name, link
                ),
            );
            // The tool invocation blocks, so it runs off the async workers.
            // Delivery failures are logged, never surfaced to the caller.
            let mailer = mailer.clone();
            let user_id = user.id;
            match tokio::task::spawn_blocking(move || mailer.send(&message)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, user_id = %user_id, "reset email delivery failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, user_id = %user_id, "reset email task failed");
                }
            }
        } else {
            tracing::warn!(user_id = %user.id, "no mailer configured; reset token stored but not sent");
        }
    }

    Ok(Json(json!({ "message": GENERIC_REPLY })))
}
