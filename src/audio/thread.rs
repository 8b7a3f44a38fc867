use std::sync::atomic::Ordering;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::engine::PlayState;
use crate::error::Error;

use super::source::EngineSource;
use super::types::{
    AudioCmd, AudioEvent, AudioOptions, OutputMode, SessionCounter, SharedEngine, VolumeHandle,
    lock_engine, read_volume,
};

/// Output device and the sink the engine source plays through.
struct Output {
    // Dropping the stream closes the device, so it lives as long as the sink.
    _stream: OutputStream,
    sink: Sink,
}

fn open_output(engine: &SharedEngine, options: &AudioOptions) -> Option<Output> {
    if options.output == OutputMode::Null {
        log::info!("audio output disabled");
        return None;
    }
    let mut stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("no audio output device: {e}");
            return None;
        }
    };
    // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
    // but noisy for a TUI app.
    stream.log_on_drop(false);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(options.volume);
    sink.append(EngineSource::new(engine.clone(), options.sample_rate));
    sink.play();
    log::info!("audio output opened at {} Hz", options.sample_rate);
    Some(Output {
        _stream: stream,
        sink,
    })
}

pub(super) fn spawn_audio_thread(
    engine: SharedEngine,
    volume: VolumeHandle,
    session: SessionCounter,
    options: AudioOptions,
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let output = open_output(&engine, &options);
        let device_ok = output.is_some() || options.output == OutputMode::Null;

        while let Ok(cmd) = rx.recv() {
            match cmd {
                AudioCmd::Play { path } => {
                    let result = if device_ok {
                        let mut engine = lock_engine(&engine);
                        engine.load(&path).and_then(|()| engine.start()).map(|()| {
                            let info = engine.track().cloned().unwrap_or_default();
                            (info, session.fetch_add(1, Ordering::SeqCst) + 1)
                        })
                    } else {
                        Err(Error::AudioDevice("no output device".to_string()))
                    };
                    let event = match result {
                        Ok((info, session)) => {
                            log::info!("playing {}", path.display());
                            AudioEvent::Started { info, session }
                        }
                        Err(error) => {
                            log::warn!("failed to play {}: {error}", path.display());
                            AudioEvent::Failed { path, error }
                        }
                    };
                    if events.send(event).is_err() {
                        log::debug!("audio event receiver dropped");
                    }
                }
                AudioCmd::Stop => lock_engine(&engine).stop(),
                AudioCmd::Pause => lock_engine(&engine).pause(),
                AudioCmd::Resume => lock_engine(&engine).resume(),
                AudioCmd::SeekBy(secs) => {
                    let mut engine = lock_engine(&engine);
                    if engine.state() == PlayState::Stopped {
                        continue;
                    }
                    let cur = engine.position();
                    let delta = Duration::from_secs(secs.unsigned_abs());
                    let target = if secs >= 0 {
                        cur.saturating_add(delta)
                    } else {
                        cur.saturating_sub(delta)
                    };
                    engine.seek(target);
                }
                AudioCmd::SetVolume(v) => {
                    let v = v.clamp(0.0, 2.0);
                    if let Ok(mut shared) = volume.lock() {
                        *shared = v;
                    }
                    if let Some(out) = output.as_ref() {
                        out.sink.set_volume(v);
                    }
                }
                AudioCmd::Quit => break,
            }
        }

        lock_engine(&engine).stop();
        if let Some(out) = output {
            out.sink.stop();
        }
        log::debug!("audio thread exiting (volume {:.1})", read_volume(&volume));
    })
}
