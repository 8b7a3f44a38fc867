use std::env;
use std::error::Error;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config::Settings;
use crate::logging;

mod effects;
mod event_loop;
mod settings;

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn run() -> Result<(), Box<dyn Error>> {
    let (settings, problem) = settings::load_settings();
    logging::init(&settings.log);
    if let Some(problem) = problem {
        log::warn!("{problem}");
    }

    let arg = env::args_os().nth(1).map(PathBuf::from);
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = library_root(arg.as_deref(), &settings);
    match &root {
        Some(r) => log::info!("library root {}", r.display()),
        None => log::info!("no library root, browsing {}", cwd.display()),
    }

    let (app, startup) = App::start(&settings, root, &cwd);
    let audio_player = AudioPlayer::new(&settings.audio, &settings.playback);

    enable_raw_mode()?;
    let mut terminal = match enter_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            if let Err(restore) = restore_terminal(&mut io::stdout()) {
                log::error!("failed to restore terminal: {restore}");
            }
            audio_player.close();
            return Err(e);
        }
    };

    let run_result: Result<(), Box<dyn Error>> = (|| {
        event_loop::run(&mut terminal, &settings, app, startup, &audio_player)
    })();

    restore_terminal(terminal.backend_mut())?;
    terminal.show_cursor()?;

    audio_player.close();
    if let Err(e) = &run_result {
        log::error!("exiting with error: {e}");
    } else {
        log::info!("bye");
    }
    run_result
}

fn enter_terminal() -> Result<Tui, Box<dyn Error>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Leave raw mode and the alternate screen. Both steps run even if the
/// first fails; the first error is returned.
fn restore_terminal(out: &mut impl Write) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(out, LeaveAlternateScreen);
    raw.and(screen)
}

/// Pick the library root: a directory given on the command line, then the
/// configured root, then `~/VGM`. `None` means browse the filesystem.
fn library_root(arg: Option<&Path>, settings: &Settings) -> Option<PathBuf> {
    if let Some(path) = arg {
        if path.is_dir() {
            return Some(path.to_path_buf());
        }
        log::warn!("{} is not a directory, ignoring", path.display());
    }
    settings
        .library
        .root
        .clone()
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join("VGM")))
        .filter(|p| p.is_dir())
}

#[cfg(test)]
mod tests;
