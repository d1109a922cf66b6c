//! Admin authentication: scrypt password verification, session lifecycle, and
//! the cookie carrying the session token.

use axum::http::{HeaderMap, header};
use scrypt::{
    Params, Scrypt,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tracing::warn;

use crate::{
    error::ServiceError,
    state::{SessionToken, SharedState},
};

/// Name of the cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "scorecast_session";

/// scrypt cost parameters for admin password hashes (N=2^15, r=8, p=1, 32-byte key).
const SCRYPT_LOG_N: u8 = 15;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const SCRYPT_KEY_LEN: usize = 32;

/// Failure while hashing a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The configured scrypt cost parameters are out of range.
    #[error("invalid scrypt parameters")]
    Params,
    /// The hashing backend rejected the input.
    #[error(transparent)]
    Hash(#[from] scrypt::password_hash::Error),
}

/// Hash a password with scrypt and return the PHC string, salt included.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_KEY_LEN)
        .map_err(|_| PasswordError::Params)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt.hash_password_customized(
        password.as_bytes(),
        None,
        None,
        params,
        salt.as_salt(),
    )?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Returns `false` for malformed hashes rather than erroring.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Scrypt.verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Check the submitted credentials and open a session on success.
///
/// The failure message never says which of the two fields was wrong.
pub async fn login(
    state: &SharedState,
    username: &str,
    password: &str,
) -> Result<SessionToken, ServiceError> {
    let config = state.config();
    if username != config.admin_username {
        return Err(invalid_credentials());
    }

    // scrypt verification is deliberately slow; keep it off the async workers.
    let stored_hash = config.admin_password_hash.clone();
    let candidate = password.to_owned();
    let verified = tokio::task::spawn_blocking(move || verify_password(&stored_hash, &candidate))
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "password verification task failed");
            false
        });

    if verified {
        Ok(state.open_session())
    } else {
        Err(invalid_credentials())
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("invalid credentials".to_owned())
}

/// Close the session referenced by the request cookie, if any.
pub fn logout(state: &SharedState, headers: &HeaderMap) {
    if let Some(token) = session_token(headers) {
        state.close_session(&token);
    }
}

/// Whether the request carries a cookie for a live session.
pub fn authenticated(state: &SharedState, headers: &HeaderMap) -> bool {
    session_token(headers).is_some_and(|token| state.session_active(&token))
}

/// Extract the session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionToken::parse(value))
}

/// `Set-Cookie` value establishing the session.
pub fn session_cookie(token: &SessionToken) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value clearing the session cookie.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};
    use axum::http::HeaderValue;

    #[test]
    fn hashes_and_verifies_passwords() {
        let hash = hash_password("scorecast-test-password").expect("hashing should succeed");
        assert!(verify_password(&hash, "scorecast-test-password"));
        assert!(!verify_password(&hash, "wrong-password"));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("not-a-phc-string", "anything"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn session_cookie_round_trips_through_headers() {
        let state = AppState::new(AppConfig::default());
        let token = state.open_session();

        let mut headers = HeaderMap::new();
        let cookie_header = format!("theme=dark; {SESSION_COOKIE}={token}");
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie_header).unwrap());

        assert_eq!(session_token(&headers), Some(token));
        assert!(authenticated(&state, &headers));

        state.close_session(&token);
        assert!(!authenticated(&state, &headers));
    }

    #[test]
    fn requests_without_a_cookie_are_anonymous() {
        let state = AppState::new(AppConfig::default());
        assert!(!authenticated(&state, &HeaderMap::new()));
    }

    #[tokio::test]
    async fn login_accepts_only_the_exact_credential_pair() {
        let config = AppConfig {
            admin_username: "admin".to_owned(),
            admin_password_hash: hash_password("letmein").unwrap(),
            ..AppConfig::default()
        };
        let state = AppState::new(config);

        assert!(login(&state, "admin", "letmein").await.is_ok());
        assert!(login(&state, "admin", "wrong").await.is_err());
        assert!(login(&state, "Admin", "letmein").await.is_err());
        assert!(login(&state, "", "").await.is_err());
    }
}
