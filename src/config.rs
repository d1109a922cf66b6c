//! Runtime configuration: admin credentials and the logo catalogue offered to
//! the admin panel.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCORECAST_CONFIG_PATH";
/// Environment override for the admin login name.
const ADMIN_USERNAME_ENV: &str = "SCORECAST_ADMIN_USERNAME";
/// Environment override for the admin password hash.
const ADMIN_PASSWORD_HASH_ENV: &str = "SCORECAST_ADMIN_PASSWORD_HASH";

/// Admin login name used when nothing else is configured.
const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// scrypt hash of the development-only password `password123`.
/// Generate a replacement with the `hash-password` tool.
const DEFAULT_ADMIN_PASSWORD_HASH: &str =
    "$scrypt$ln=15,r=8,p=1$PdtzI3z1K6r6N91gWqUCFg$7MkRhYZBxcc+zl/ZE+3XQCqL9Hdn/PHYDB8ZRewnyhY";

/// One selectable team logo offered by the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogoOption {
    /// Short name shown in the dropdown.
    pub label: String,
    /// Image URL the display page loads.
    pub url: String,
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name the admin must log in with.
    pub admin_username: String,
    /// PHC-format scrypt hash the admin password is verified against.
    pub admin_password_hash: String,
    /// Logos offered in the admin panel dropdowns.
    pub logos: Vec<LogoOption>,
}

impl AppConfig {
    /// Load the configuration from the JSON file and the environment, falling
    /// back to built-in defaults. Environment variables win over the file and
    /// the file wins over the defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let admin_username = env::var(ADMIN_USERNAME_ENV)
            .ok()
            .or(raw.admin_username)
            .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_owned());
        let admin_password_hash = env::var(ADMIN_PASSWORD_HASH_ENV)
            .ok()
            .or(raw.admin_password_hash)
            .unwrap_or_else(|| {
                warn!("no admin password hash configured; using built-in development credentials");
                DEFAULT_ADMIN_PASSWORD_HASH.to_owned()
            });
        let logos = raw.logos.unwrap_or_else(default_logos);
        Self {
            admin_username,
            admin_password_hash,
            logos,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_username: DEFAULT_ADMIN_USERNAME.to_owned(),
            admin_password_hash: DEFAULT_ADMIN_PASSWORD_HASH.to_owned(),
            logos: default_logos(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    admin_username: Option<String>,
    admin_password_hash: Option<String>,
    logos: Option<Vec<LogoOption>>,
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in logo catalogue shipped with the binary.
fn default_logos() -> Vec<LogoOption> {
    const LABELS: [&str; 12] = [
        "404", "cloud", "diffenso", "echo", "los", "offenso", "rootkits", "soccer", "sp",
        "torrent", "united", "yg",
    ];
    LABELS
        .into_iter()
        .map(|label| LogoOption {
            label: label.to_owned(),
            url: format!("/logos/{label}.png"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalogue_has_twelve_logos() {
        let logos = default_logos();
        assert_eq!(logos.len(), 12);
        assert_eq!(logos[0].label, "404");
        assert_eq!(logos[0].url, "/logos/404.png");
    }

    #[test]
    fn config_file_shape_parses() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "admin_username": "ops",
                "logos": [{"label": "home", "url": "/logos/home.png"}]
            }"#,
        )
        .expect("valid config json");
        assert_eq!(raw.admin_username.as_deref(), Some("ops"));
        assert!(raw.admin_password_hash.is_none());
        assert_eq!(raw.logos.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn file_values_override_defaults() {
        let raw = RawConfig {
            admin_username: Some("ops".to_owned()),
            admin_password_hash: Some("$scrypt$ln=15,r=8,p=1$c2FsdA$aGFzaA".to_owned()),
            logos: Some(vec![]),
        };
        let config = AppConfig::from_raw(raw);
        assert_eq!(config.admin_username, "ops");
        assert!(config.logos.is_empty());
    }
}
