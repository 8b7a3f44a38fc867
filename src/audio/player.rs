use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::{AudioSettings, PlaybackSettings};
use crate::engine::{Engine, VgmEngine};
use crate::error::{Error, Result};

use super::thread::spawn_audio_thread;
use super::ticker::{Subscribers, spawn_ticker};
use super::types::{
    AudioCmd, AudioEvent, AudioOptions, OutputMode, PlaybackSnapshot, SessionCounter, SharedEngine,
    VolumeHandle,
};

pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: Mutex<Option<Receiver<AudioEvent>>>,
    subscribers: Subscribers,
    ticker_stop: Arc<AtomicBool>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    join: Mutex<Option<JoinHandle<()>>>,
    /// Lets tests pull audio when no device is rendering.
    #[cfg(test)]
    pub(super) engine: SharedEngine,
}

impl AudioPlayer {
    /// Build the built-in engine from settings and open the default device.
    pub fn new(audio: &AudioSettings, playback: &PlaybackSettings) -> Self {
        let engine = VgmEngine::new(
            audio.sample_rate,
            playback.loop_count,
            Duration::from_millis(playback.fade_ms),
            Duration::from_millis(playback.end_silence_ms),
        );
        Self::with_engine(
            Box::new(engine),
            AudioOptions {
                sample_rate: audio.sample_rate,
                tick: Duration::from_millis(audio.tick_ms),
                volume: playback.volume,
                output: OutputMode::Device,
            },
        )
    }

    pub fn with_engine(engine: Box<dyn Engine>, options: AudioOptions) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events_rx) = mpsc::channel::<AudioEvent>();
        let engine: SharedEngine = Arc::new(Mutex::new(engine));
        let volume: VolumeHandle = Arc::new(Mutex::new(options.volume.clamp(0.0, 2.0)));
        let session: SessionCounter = Arc::new(AtomicU64::new(0));
        let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));
        let ticker_stop = Arc::new(AtomicBool::new(false));

        let audio_handle = spawn_audio_thread(
            engine.clone(),
            volume.clone(),
            session.clone(),
            options,
            rx,
            events_tx,
        );
        let ticker_handle = spawn_ticker(
            engine.clone(),
            volume,
            session,
            subscribers.clone(),
            options.tick,
            ticker_stop.clone(),
        );

        Self {
            tx,
            events: Mutex::new(Some(events_rx)),
            subscribers,
            ticker_stop,
            ticker: Mutex::new(Some(ticker_handle)),
            join: Mutex::new(Some(audio_handle)),
            #[cfg(test)]
            engine,
        }
    }

    /// New snapshot stream. Each subscriber holds at most one pending snapshot.
    pub fn subscribe(&self) -> Receiver<PlaybackSnapshot> {
        let (tx, rx) = mpsc::sync_channel(1);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Take the receiver for `Play` results. Only the first call gets it.
    pub fn take_events(&self) -> Option<Receiver<AudioEvent>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<()> {
        self.tx.send(cmd).map_err(|_| Error::ChannelClosed)
    }

    /// Stop the ticker, then the audio thread, then close all subscriber
    /// channels. Safe to call more than once.
    pub fn close(&self) {
        self.ticker_stop.store(true, Ordering::SeqCst);
        if let Some(h) = take_handle(&self.ticker) {
            let _ = h.join();
        }

        let _ = self.send(AudioCmd::Quit);
        if let Some(h) = take_handle(&self.join) {
            let _ = h.join();
            log::debug!("audio closed");
        }

        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.close();
    }
}

fn take_handle(slot: &Mutex<Option<JoinHandle<()>>>) -> Option<JoinHandle<()>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}
