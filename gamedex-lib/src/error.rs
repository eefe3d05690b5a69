use thiserror::Error;

/// Errors loading server settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    /// No config file in any of the searched locations
    #[error("No config file found (looked for ./gamedex.toml and {0})")]
    NotFound(String),

    #[error("Invalid listen address: {0}")]
    InvalidListen(String),
}

/// Errors reading game archives and images.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Neither the requested image nor the fallback image could be opened
    #[error("Image not found")]
    NotFound,
}
