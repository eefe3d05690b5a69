//! `env_logger` setup driven by the server config.

use std::fs::{File, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};
use gamedex_lib::ServerConfig;
use log::LevelFilter;

/// Log target for per-request access lines.
pub const ACTIVITY_TARGET: &str = "activity";

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Build the logger: `info` unless `RUST_LOG` says otherwise, activity lines
/// only when enabled, output to `log_file` when one is configured.
///
/// Returns a warning to emit once the logger is installed, if the log file
/// could not be opened.
pub fn build_logger(config: &ServerConfig) -> (Builder, Option<String>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    let activity_level = if config.log_activity {
        LevelFilter::Info
    } else {
        LevelFilter::Off
    };
    builder.filter_module(ACTIVITY_TARGET, activity_level);

    let mut warning = None;
    if let Some(path) = &config.log_file {
        match open_log_file(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                warning = Some(format!(
                    "Could not open log file {}: {e}; logging to stderr",
                    path.display()
                ));
            }
        }
    }
    (builder, warning)
}

/// Install the global logger. A second call is a no-op.
pub fn init_logging(config: &ServerConfig) {
    let (mut builder, warning) = build_logger(config);
    if builder.try_init().is_err() {
        return;
    }
    if let Some(warning) = warning {
        log::warn!("{warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_appended() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("server.log");
        std::fs::write(&path, "first\n").unwrap();

        use std::io::Write;
        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn unopenable_log_file_warns() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            // A directory cannot be opened for appending
            log_file: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        let (_, warning) = build_logger(&config);
        assert!(warning.unwrap().contains("logging to stderr"));
    }

    #[test]
    fn no_log_file_no_warning() {
        let (_, warning) = build_logger(&ServerConfig::default());
        assert!(warning.is_none());
    }
}
