use serde::Deserialize;
use utoipa::ToSchema;

/// Credentials submitted by the login form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    /// Admin login name.
    pub username: String,
    /// Admin password in the clear; only ever compared against the stored hash.
    pub password: String,
}
