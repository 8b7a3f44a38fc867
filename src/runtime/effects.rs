//! Effect executor. Audio effects become `AudioCmd`s; slow work runs on a
//! short-lived thread that reports back with a `Msg`.

use std::sync::mpsc::Sender;
use std::thread;

use crate::app::{Effect, Msg};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::browser::read_dir_filtered;
use crate::config::LibrarySettings;
use crate::engine::read_track_info;
use crate::library::{self, Track};

pub struct Executor<'a> {
    audio: &'a AudioPlayer,
    tx: Sender<Msg>,
    library: LibrarySettings,
}

impl<'a> Executor<'a> {
    pub fn new(audio: &'a AudioPlayer, tx: Sender<Msg>, library: LibrarySettings) -> Self {
        Self { audio, tx, library }
    }

    /// Execute `effects` in order. Returns true once `Quit` is seen.
    pub fn run_all(&self, effects: Vec<Effect>) -> bool {
        for effect in effects {
            if self.run(effect) {
                return true;
            }
        }
        false
    }

    fn run(&self, effect: Effect) -> bool {
        match effect {
            Effect::StartTrack { path } => self.audio_cmd(AudioCmd::Play { path }),
            Effect::Stop => self.audio_cmd(AudioCmd::Stop),
            Effect::Pause => self.audio_cmd(AudioCmd::Pause),
            Effect::Resume => self.audio_cmd(AudioCmd::Resume),
            Effect::SeekBy(secs) => self.audio_cmd(AudioCmd::SeekBy(secs)),
            Effect::SetVolume(v) => self.audio_cmd(AudioCmd::SetVolume(v)),
            Effect::ScheduleClearError { stamp, after } => {
                let tx = self.tx.clone();
                thread::spawn(move || {
                    thread::sleep(after);
                    let _ = tx.send(Msg::ClearError { stamp });
                });
            }
            Effect::ScanLibrary(root) => {
                let tx = self.tx.clone();
                let settings = self.library.clone();
                thread::spawn(move || {
                    let result = library::scan(&root, &settings).map_err(|e| e.to_string());
                    let _ = tx.send(Msg::LibraryScanned(result));
                });
            }
            Effect::ReadDir { dir, show_hidden } => {
                let tx = self.tx.clone();
                thread::spawn(move || {
                    let entries = read_dir_filtered(&dir, show_hidden).map_err(|e| e.to_string());
                    let _ = tx.send(Msg::DirRead { dir, entries });
                });
            }
            Effect::LoadMetadata { path, play } => {
                let tx = self.tx.clone();
                thread::spawn(move || {
                    let msg = match read_track_info(&path) {
                        Ok(info) => Msg::MetadataLoaded {
                            track: Track::from_info(&info),
                            play,
                        },
                        Err(e) => Msg::Error(format!("{}: {e}", path.display())),
                    };
                    let _ = tx.send(msg);
                });
            }
            Effect::Quit => return true,
        }
        false
    }

    fn audio_cmd(&self, cmd: AudioCmd) {
        if let Err(e) = self.audio.send(cmd) {
            log::error!("audio command dropped: {e}");
            let _ = self.tx.send(Msg::Error(e.to_string()));
        }
    }
}
