//! Gateway configuration.
//!
//! The embedding application supplies everything the gateway needs up
//! front: where the API lives, whether the viewer is logged in, and the
//! anti-forgery token for the current page. Nothing is read from
//! ambient globals.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::auth::SessionKind;

/// Application name used for the session store directory
const APP_NAME: &str = "modshelf";

#[derive(Debug, Clone)]
pub struct Config {
    /// Origin the API is served from, e.g. `https://shelf.example.org`.
    pub api_base_url: String,
    /// Whether the embedding application has a logged-in viewer.
    pub logged_in: bool,
    /// Request a user session even when `logged_in` is false. Useful
    /// for deployments where login state is not known until the first
    /// authenticated call succeeds.
    pub always_try_login: bool,
    /// Anti-forgery token injected by the host application, if any.
    pub csrf_token: Option<String>,
    /// Override for the session store location. Defaults to the user
    /// cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            logged_in: false,
            always_try_login: false,
            csrf_token: None,
            cache_dir: None,
        }
    }

    /// Load configuration from `MODSHELF_*` environment variables,
    /// reading a `.env` file first when one is present.
    ///
    /// `MODSHELF_API_URL` is required; `MODSHELF_LOGGED_IN`,
    /// `MODSHELF_ALWAYS_TRY_LOGIN` and `MODSHELF_CSRF_TOKEN` are
    /// optional.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_base_url =
            std::env::var("MODSHELF_API_URL").context("MODSHELF_API_URL is not set")?;

        let mut config = Config::new(api_base_url);
        config.logged_in = env_flag("MODSHELF_LOGGED_IN");
        config.always_try_login = env_flag("MODSHELF_ALWAYS_TRY_LOGIN");
        config.csrf_token = std::env::var("MODSHELF_CSRF_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        Ok(config)
    }

    /// Which kind of session calls made with this configuration use.
    pub fn session_kind(&self) -> SessionKind {
        if self.logged_in || self.always_try_login {
            SessionKind::User
        } else {
            SessionKind::Public
        }
    }

    /// Directory the session store persists to.
    pub fn session_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewer_gets_a_public_session() {
        let config = Config::new("https://shelf.example.org");
        assert_eq!(config.session_kind(), SessionKind::Public);
    }

    #[test]
    fn logged_in_viewer_gets_a_user_session() {
        let mut config = Config::new("https://shelf.example.org");
        config.logged_in = true;
        assert_eq!(config.session_kind(), SessionKind::User);
    }

    #[test]
    fn always_try_login_forces_a_user_session() {
        let mut config = Config::new("https://shelf.example.org");
        config.always_try_login = true;
        assert_eq!(config.session_kind(), SessionKind::User);
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let mut config = Config::new("https://shelf.example.org");
        config.cache_dir = Some(PathBuf::from("/tmp/shelf-test"));
        assert_eq!(config.session_dir().unwrap(), PathBuf::from("/tmp/shelf-test"));
    }
}
