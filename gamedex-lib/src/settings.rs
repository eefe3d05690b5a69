//! Server settings (`gamedex.toml`) and config-file resolution.
//!
//! The settings file is looked up by priority:
//!
//! 1. CLI override (if `Some`)
//! 2. `gamedex.toml` in the current directory
//! 3. `~/.config/gamedex/config.toml`

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Default address the HTTP server binds to.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8986";

/// Everything the server reads from its config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    /// Root directory of game zip archives.
    pub game_zip_path: PathBuf,
    /// Root directory holding `Logos/` and `Screenshots/`.
    pub image_path: PathBuf,
    /// Image served when the requested one is missing.
    pub error_image_file: PathBuf,
    /// Append logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Log one line per served request.
    pub log_activity: bool,
    /// Row ceiling for searches; zero or negative means unlimited.
    pub search_limit: i64,
    /// Tags excluded from results when a request sets `filter=true`.
    pub filter: Vec<String>,
    /// YAML field schema; the built-in Flashpoint schema when unset.
    pub schema_file: Option<PathBuf>,
    pub listen: String,
    /// Number of read-only database connections.
    pub pool_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("flashpoint.sqlite"),
            game_zip_path: PathBuf::from("Games"),
            image_path: PathBuf::from("Images"),
            error_image_file: PathBuf::from("error.png"),
            log_file: None,
            log_activity: false,
            search_limit: 1000,
            filter: Vec::new(),
            schema_file: None,
            listen: DEFAULT_LISTEN.to_string(),
            pool_size: 4,
        }
    }
}

impl ServerConfig {
    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load and parse a settings file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config = Self::from_toml(&contents).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Make relative paths relative to the config file's directory.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() && !p.as_os_str().is_empty() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.database_path);
        join(&mut self.game_zip_path);
        join(&mut self.image_path);
        join(&mut self.error_image_file);
        if let Some(p) = self.log_file.as_mut() {
            join(p);
        }
        if let Some(p) = self.schema_file.as_mut() {
            join(p);
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.listen
            .parse()
            .map_err(|_| SettingsError::InvalidListen(self.listen.clone()))
    }
}

/// Canonical per-user settings path: `~/.config/gamedex/config.toml`.
pub fn user_settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("gamedex").join("config.toml")
}

/// Resolve which settings file to load.
pub fn resolve_settings_path(cli_override: Option<PathBuf>) -> Result<PathBuf, SettingsError> {
    if let Some(p) = cli_override {
        return Ok(p);
    }
    let local = PathBuf::from("gamedex.toml");
    if local.is_file() {
        return Ok(local);
    }
    let user = user_settings_path();
    if user.is_file() {
        return Ok(user);
    }
    Err(SettingsError::NotFound(user.display().to_string()))
}
