//! Authentication facade for the job board service.
//!
//! Provides:
//! - JWT session token issuance and verification (HS256)
//! - Password hashing with Argon2id
//! - Single-use password reset tokens (SHA-256 digests at rest)
//! - Session lifecycle event broadcasting

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

pub mod events;

pub use events::{SessionEvent, SessionEvents, SessionSubscription};

// ============================================================================
// Authentication Context
// ============================================================================

/// Captures the outcome of an authentication attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Option<Uuid>,
}

impl AuthContext {
    #[inline]
    pub fn new(user_id: Option<Uuid>) -> Self {
        Self { user_id }
    }

    /// Helper for requests carrying no (or an unusable) session token.
    #[inline]
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// Indicates if the request represents an authenticated user.
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Authentication errors that can surface during request processing.
#[derive(Debug, Error, Clone)]
pub enum AuthError {
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token format")]
    InvalidTokenFormat,
    #[error("authentication subsystem is unavailable: {0}")]
    Subsystem(String),
}

/// Password-related errors.
#[derive(Debug, Error, Clone)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
    #[error("password verification failed")]
    VerificationFailed,
    #[error("invalid hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Authenticator Trait
// ============================================================================

/// Trait for authentication backends. Implement this for production and test authenticators.
#[async_trait::async_trait]
pub trait AuthenticatorTrait: Send + Sync + 'static {
    async fn authenticate(&self, token: Option<&str>) -> Result<AuthContext, AuthError>;
}

// ============================================================================
// Test Authenticator
// ============================================================================

/// Test-only authenticator that resolves every request to a fixed identity.
#[derive(Debug, Default)]
pub struct TestAuthenticator {
    pub user_id: Option<Uuid>,
}

impl TestAuthenticator {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

#[async_trait::async_trait]
impl AuthenticatorTrait for TestAuthenticator {
    async fn authenticate(&self, _token: Option<&str>) -> Result<AuthContext, AuthError> {
        Ok(AuthContext::new(self.user_id))
    }
}

// ============================================================================
// JWT Authenticator
// ============================================================================

/// HS256 session-token authenticator. Also issues the tokens it later verifies.
#[derive(Debug, Clone)]
pub struct JwtAuthenticator {
    secret: String,
    /// Grace period in seconds for token expiration (default: 60)
    exp_grace_seconds: u64,
}

impl JwtAuthenticator {
    pub fn new_hs256(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            exp_grace_seconds: 60,
        }
    }

    /// Set the grace period for token expiration checks.
    pub fn with_exp_grace(mut self, seconds: u64) -> Self {
        self.exp_grace_seconds = seconds;
        self
    }

    /// Issue a signed session token for `user_id` that expires after `ttl_hours`.
    pub fn issue_token(&self, user_id: &Uuid, ttl_hours: u64) -> Result<String, AuthError> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: Some(user_id.to_string()),
            exp: Some(now + ttl_hours * 3600),
            iat: Some(now),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Subsystem(e.to_string()))
    }

    fn process_claims(&self, claims: Claims) -> Result<AuthContext, AuthError> {
        if let Some(exp) = claims.exp {
            let now = chrono::Utc::now().timestamp() as u64;
            if exp < now.saturating_sub(self.exp_grace_seconds) {
                tracing::debug!(exp, now, "session token expired");
                return Err(AuthError::TokenExpired);
            }
        }

        let sub = claims.sub.and_then(|s| Uuid::parse_str(&s).ok());
        Ok(AuthContext::new(sub))
    }

    /// Strip the "Bearer " prefix from a token if present.
    #[inline]
    fn strip_bearer(token: &str) -> &str {
        let token = token.trim();
        if token.len() > 7 && token[..7].eq_ignore_ascii_case("bearer ") {
            &token[7..]
        } else {
            token
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Option<String>,
    exp: Option<u64>,
    iat: Option<u64>,
}

#[async_trait::async_trait]
impl AuthenticatorTrait for JwtAuthenticator {
    async fn authenticate(&self, token: Option<&str>) -> Result<AuthContext, AuthError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => Self::strip_bearer(t),
            _ => return Ok(AuthContext::anonymous()),
        };

        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false; // We handle exp manually for grace period

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|error| {
            tracing::debug!(%error, "session token rejected");
            AuthError::AuthenticationFailed
        })?;

        self.process_claims(data.claims)
    }
}

// ============================================================================
// Password Hashing
// ============================================================================

/// Password hasher using Argon2id (the recommended variant for password hashing).
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    m_cost: u32,
    /// Time cost / iterations (default: 2)
    t_cost: u32,
    /// Parallelism factor (default: 1)
    p_cost: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        // OWASP recommended minimum parameters for Argon2id
        Self {
            m_cost: 19456, // 19 MiB
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure memory cost in KiB.
    pub fn with_memory_cost(mut self, kib: u32) -> Self {
        self.m_cost = kib;
        self
    }

    /// Configure time cost (iterations).
    pub fn with_time_cost(mut self, iterations: u32) -> Self {
        self.t_cost = iterations;
        self
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(self.m_cost, self.t_cost, self.p_cost, None)
                .expect("valid argon2 params"),
        )
    }

    /// Hash a password, returning the PHC-format hash string.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored PHC-format hash.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<(), PasswordError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|_| PasswordError::InvalidHashFormat)?;

        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| PasswordError::VerificationFailed)
    }
}

// ============================================================================
// Reset Tokens
// ============================================================================

/// A freshly minted password reset token. `plaintext` goes out in the email;
/// only `digest` is persisted.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub plaintext: String,
    pub digest: String,
}

/// Mint a reset token with enough entropy that guessing is impractical.
pub fn generate_reset_token() -> ResetToken {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let digest = sha256_hex(&plaintext);
    ResetToken { plaintext, digest }
}

/// Compute SHA-256 of input as a lowercase hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Hash a password using default Argon2id parameters.
#[inline]
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Argon2Hasher::new().hash(password)
}

/// Verify a password against a stored hash using default parameters.
#[inline]
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), PasswordError> {
    Argon2Hasher::new().verify(password, stored_hash)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let password = "supersecret123";

        let hash = hasher.hash(password).expect("hash should succeed");
        assert!(hash.starts_with("$argon2id$"));

        hasher
            .verify(password, &hash)
            .expect("verification should succeed");

        assert!(hasher.verify("wrongpassword", &hash).is_err());
    }

    #[test]
    fn test_reset_token_digest_matches() {
        let token = generate_reset_token();
        assert_eq!(token.digest, sha256_hex(&token.plaintext));
        assert_eq!(token.plaintext.len(), 64);

        let other = generate_reset_token();
        assert_ne!(token.plaintext, other.plaintext);
    }

    #[tokio::test]
    async fn test_jwt_authenticator_anonymous() {
        let auth = JwtAuthenticator::new_hs256("secret");
        let ctx = auth.authenticate(None).await.unwrap();
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_jwt_issue_and_verify_roundtrip() {
        let auth = JwtAuthenticator::new_hs256("secret");
        let user_id = Uuid::new_v4();
        let token = auth.issue_token(&user_id, 1).expect("token");

        let ctx = auth.authenticate(Some(&token)).await.expect("authenticate");
        assert_eq!(ctx.user_id, Some(user_id));

        // Bearer prefix is tolerated.
        let ctx = auth
            .authenticate(Some(&format!("Bearer {token}")))
            .await
            .expect("authenticate");
        assert_eq!(ctx.user_id, Some(user_id));
    }

    #[tokio::test]
    async fn test_jwt_rejects_wrong_secret() {
        let issuer = JwtAuthenticator::new_hs256("secret-a");
        let verifier = JwtAuthenticator::new_hs256("secret-b");
        let token = issuer.issue_token(&Uuid::new_v4(), 1).expect("token");

        let err = verifier.authenticate(Some(&token)).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthenticationFailed));
    }
}
