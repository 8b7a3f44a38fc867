use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` layers environment variables (prefix `VGMTUI__`) over an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("VGMTUI")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(8_000..=192_000).contains(&self.audio.sample_rate) {
            return Err("audio.sample_rate must be between 8000 and 192000".to_string());
        }
        if self.audio.tick_ms < 10 {
            return Err("audio.tick_ms must be >= 10".to_string());
        }
        if !(0.0..=2.0).contains(&self.playback.volume) {
            return Err("playback.volume must be between 0.0 and 2.0".to_string());
        }
        if !(10..=90).contains(&self.ui.library_width_percent) {
            return Err("ui.library_width_percent must be between 10 and 90".to_string());
        }
        if self.ui.error_timeout_ms == 0 {
            return Err("ui.error_timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `VGMTUI_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("VGMTUI_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/vgmtui/config.toml`
/// or `~/.config/vgmtui/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("vgmtui").join("config.toml"))
}

/// Compute the default log file under `$XDG_STATE_HOME/vgmtui/vgmtui.log`
/// or `~/.local/state/vgmtui/vgmtui.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("vgmtui").join("vgmtui.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(dir) = env::var_os(var).filter(|v| !v.is_empty()) {
        Some(PathBuf::from(dir))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
