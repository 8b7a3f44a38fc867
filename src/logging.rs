//! Logger setup. The terminal is in raw mode on the alternate screen, so
//! log output goes to a file and never to stdout or stderr.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

use crate::config::{LogSettings, default_log_path};

/// Initialise the global logger. Returns the file being written, or `None`
/// when no file could be opened and logging is off.
pub fn init(settings: &LogSettings) -> Option<PathBuf> {
    let path = settings.file.clone().or_else(default_log_path)?;
    let file = match open_log_file(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("vgmtui: logging disabled, cannot open {}: {e}", path.display());
            return None;
        }
    };

    let env = Env::default().default_filter_or(settings.level.as_str());
    let result = Builder::from_env(env)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    match result {
        Ok(()) => {
            log::info!("vgmtui {} starting", env!("CARGO_PKG_VERSION"));
            Some(path)
        }
        Err(_) => None,
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
