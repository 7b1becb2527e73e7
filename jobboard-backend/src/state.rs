use std::sync::Arc;

use jobboard_auth::{AuthenticatorTrait, JwtAuthenticator, SessionEvents};
use jobboard_mailer::MailClient;

/// Auth-related knobs the handlers need at request time.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_ttl_hours: u64,
    pub reset_token_ttl_minutes: i64,
    pub reset_link_base: String,
}

/// Shared application state passed to every route handler.
pub struct AppState {
    pub db_pool: Arc<jobboard_db::DbPool>,
    pub authenticator: Arc<dyn AuthenticatorTrait>,
    /// Issues the session tokens that `authenticator` later verifies.
    pub jwt: JwtAuthenticator,
    /// Absent when no mail tool is configured; the forgot-password flow then
    /// only records the token.
    pub mailer: Option<Arc<MailClient>>,
    pub session_events: SessionEvents,
    pub auth_settings: AuthSettings,
}

impl AppState {
    /// Build a fully initialised state container from its constituent parts.
    pub fn new(
        db_pool: jobboard_db::DbPool,
        authenticator: Arc<dyn AuthenticatorTrait>,
        jwt: JwtAuthenticator,
        mailer: Option<MailClient>,
        auth_settings: AuthSettings,
    ) -> Self {
        Self {
            db_pool: Arc::new(db_pool),
            authenticator,
            jwt,
            mailer: mailer.map(Arc::new),
            session_events: SessionEvents::new(),
            auth_settings,
        }
    }
}
