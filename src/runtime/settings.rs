use crate::config;

/// Load settings, falling back to defaults when the file or environment is
/// unusable. Runs before the alternate screen and before the logger, so the
/// problem is printed to stderr and also returned for logging later.
pub fn load_settings() -> (config::Settings, Option<String>) {
    let problem = match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => return (s, None),
            Err(msg) => format!("invalid config, using defaults: {msg}"),
        },
        Err(e) => format!("failed to load config, using defaults: {e}"),
    };
    eprintln!("vgmtui: {problem}");
    (config::Settings::default(), Some(problem))
}
