//! Server-side support shared by the gamedex binary: settings resolution
//! and the archive/image assets served next to search results.

pub mod assets;
pub mod error;
pub mod settings;

pub use assets::{
    ImageEncoding, ImageKind, ImageRequest, Resize, encode_image, image_path,
    list_archive_content, open_image, render_image, resize_image,
};
pub use error::{AssetError, SettingsError};
pub use settings::{DEFAULT_LISTEN, ServerConfig, resolve_settings_path, user_settings_path};
