//! Print a PHC-format scrypt hash for the given password, suitable for
//! `SCORECAST_ADMIN_PASSWORD_HASH` or the `admin_password_hash` config key.

use anyhow::Context;
use scorecast_back::services::auth_service;

fn main() -> anyhow::Result<()> {
    let password = std::env::args()
        .nth(1)
        .context("usage: hash-password <password>")?;
    let hash = auth_service::hash_password(&password).context("hashing password")?;
    println!("{hash}");
    Ok(())
}
