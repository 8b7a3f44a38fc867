use std::io::Stdout;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Effect, Msg, update};
use crate::audio::{AudioEvent, AudioPlayer, PlaybackSnapshot};
use crate::config::Settings;
use crate::ui;

use super::effects::Executor;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything that feeds the reducer besides the keyboard.
struct Inbox {
    snapshots: Receiver<PlaybackSnapshot>,
    audio_events: Option<Receiver<AudioEvent>>,
    internal: Receiver<Msg>,
}

impl Inbox {
    /// Collect pending messages without blocking.
    fn drain(&mut self, app: &App, out: &mut Vec<Msg>) {
        loop {
            match self.snapshots.try_recv() {
                Ok(snap) => out.push(Msg::Tick(snap)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if app.snapshots_open {
                        out.push(Msg::SnapshotsClosed);
                    }
                    break;
                }
            }
        }

        if let Some(events) = &self.audio_events {
            while let Ok(event) = events.try_recv() {
                out.push(match event {
                    AudioEvent::Started { info, session } => Msg::TrackStarted { info, session },
                    AudioEvent::Failed { path, error } => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string());
                        Msg::TrackFailed(format!("{name}: {error}"))
                    }
                });
            }
        }

        while let Ok(msg) = self.internal.try_recv() {
            out.push(msg);
        }
    }
}

/// Main terminal event loop: draws, feeds messages through the reducer and
/// executes the resulting effects. Returns `Ok(())` when `Quit` is seen.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    settings: &Settings,
    mut app: App,
    startup: Vec<Effect>,
    audio_player: &AudioPlayer,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel::<Msg>();
    let executor = Executor::new(audio_player, tx, settings.library.clone());
    let mut inbox = Inbox {
        snapshots: audio_player.subscribe(),
        audio_events: audio_player.take_events(),
        internal: rx,
    };

    let size = terminal.size()?;
    app.size = (size.width, size.height);
    if executor.run_all(startup) {
        return Ok(());
    }

    let mut pending = Vec::new();
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        inbox.drain(&app, &mut pending);

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => pending.push(Msg::Key(key)),
                Event::Resize(w, h) => pending.push(Msg::Resize(w, h)),
                _ => {}
            }
        }

        for msg in pending.drain(..) {
            let (next, effects) = update(app, msg);
            app = next;
            if executor.run_all(effects) {
                return Ok(());
            }
        }
    }
}
