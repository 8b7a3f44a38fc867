//! Periodic snapshot producer with drop-if-full fan-out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::types::{
    PlaybackSnapshot, SessionCounter, SharedEngine, VolumeHandle, lock_engine, read_volume,
};

pub(super) type Subscribers = Arc<Mutex<Vec<SyncSender<PlaybackSnapshot>>>>;

pub(super) fn snapshot(
    engine: &SharedEngine,
    volume: &VolumeHandle,
    session: &SessionCounter,
) -> PlaybackSnapshot {
    let engine = lock_engine(engine);
    PlaybackSnapshot {
        state: engine.state(),
        position: engine.position(),
        duration: engine.duration(),
        current_loop: engine.current_loop(),
        total_loops: engine.loop_count(),
        has_loop: engine.track().is_some_and(|t| t.has_loop),
        volume: read_volume(volume),
        session: session.load(Ordering::SeqCst),
    }
}

/// Send `snap` to every subscriber without blocking. Full queues skip this
/// snapshot; disconnected subscribers are removed.
pub(super) fn fan_out(subscribers: &Subscribers, snap: PlaybackSnapshot) {
    let mut subs = subscribers.lock().unwrap_or_else(PoisonError::into_inner);
    subs.retain(|tx| match tx.try_send(snap) {
        Ok(()) | Err(TrySendError::Full(_)) => true,
        Err(TrySendError::Disconnected(_)) => false,
    });
}

pub(super) fn spawn_ticker(
    engine: SharedEngine,
    volume: VolumeHandle,
    session: SessionCounter,
    subscribers: Subscribers,
    interval: Duration,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        log::debug!("ticker started ({} ms)", interval.as_millis());
        while !stop.load(Ordering::SeqCst) {
            fan_out(&subscribers, snapshot(&engine, &volume, &session));
            thread::sleep(interval);
        }
        log::debug!("ticker stopped");
    })
}
