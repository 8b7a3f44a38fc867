use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

use super::psg::Sn76489;
use super::song::{self, Event, Song, duration_to_samples, samples_to_duration};
use super::{
    DEFAULT_END_SILENCE_MS, DEFAULT_FADE_MS, DEFAULT_LOOP_COUNT, DEFAULT_SAMPLE_RATE, Engine,
    PlayState, SONG_RATE, TrackInfo,
};

/// Built-in engine: plays parsed songs through the SN76489 model.
pub struct VgmEngine {
    sample_rate: u32,
    loop_count: u32,
    fade_samples: u64,
    end_silence_samples: u64,
    session: Option<Session>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    Running,
    Fading { left: u64 },
    Silence { left: u64 },
    Finished,
}

/// One loaded song and its playback cursor.
struct Session {
    song: Song,
    info: TrackInfo,
    psg: Option<Sn76489>,
    cursor: usize,
    wait_left: u64,
    /// Song samples played since the start, loops included.
    elapsed: u64,
    loops_done: u32,
    phase: Phase,
    rate_acc: u64,
    started: bool,
    paused: bool,
}

impl Default for VgmEngine {
    fn default() -> Self {
        Self::new(
            DEFAULT_SAMPLE_RATE,
            DEFAULT_LOOP_COUNT,
            Duration::from_millis(DEFAULT_FADE_MS),
            Duration::from_millis(DEFAULT_END_SILENCE_MS),
        )
    }
}

impl VgmEngine {
    pub fn new(sample_rate: u32, loop_count: u32, fade: Duration, end_silence: Duration) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            loop_count,
            fade_samples: duration_to_samples(fade),
            end_silence_samples: duration_to_samples(end_silence),
            session: None,
        }
    }

    fn display_samples(&self, s: &Session) -> u64 {
        s.song.display_samples(self.loop_count, self.fade_samples)
    }
}

impl Session {
    fn rewind(&mut self) {
        if let Some(psg) = self.psg.as_mut() {
            psg.reset();
        }
        self.cursor = 0;
        self.wait_left = 0;
        self.elapsed = 0;
        self.loops_done = 0;
        self.phase = Phase::Running;
        self.rate_acc = 0;
    }

    /// Advance the timeline by `budget` song samples, applying events on the way.
    fn advance(&mut self, mut budget: u64, loop_count: u32, fade: u64, end_silence: u64) {
        while budget > 0 {
            match &mut self.phase {
                Phase::Finished => return,
                Phase::Silence { left } => {
                    let step = budget.min(*left);
                    *left -= step;
                    budget -= step;
                    self.elapsed += step;
                    if *left == 0 {
                        self.phase = Phase::Finished;
                    }
                    continue;
                }
                Phase::Running | Phase::Fading { .. } => {}
            }

            if self.wait_left == 0 {
                self.next_event(loop_count, fade, end_silence);
                continue;
            }

            let mut step = budget.min(self.wait_left);
            if let Phase::Fading { left } = &mut self.phase {
                step = step.min(*left);
                *left -= step;
                if *left == 0 {
                    self.phase = Phase::Finished;
                }
            }
            self.wait_left -= step;
            self.elapsed += step;
            budget -= step;
        }
    }

    fn next_event(&mut self, loop_count: u32, fade: u64, end_silence: u64) {
        let event = self.song.events.get(self.cursor).copied();
        match event {
            Some(Event::Wait(n)) => self.wait_left = u64::from(n),
            Some(Event::Psg(byte)) => {
                if let Some(psg) = self.psg.as_mut() {
                    psg.write(byte);
                }
            }
            Some(Event::PsgStereo(mask)) => {
                if let Some(psg) = self.psg.as_mut() {
                    psg.set_stereo(mask);
                }
            }
            None => {
                self.on_end(loop_count, fade, end_silence);
                return;
            }
        }
        self.cursor += 1;
    }

    fn on_end(&mut self, loop_count: u32, fade: u64, end_silence: u64) {
        match self.song.loop_index.filter(|_| self.song.has_loop()) {
            Some(loop_index) => {
                self.loops_done += 1;
                self.cursor = loop_index;
                if self.phase == Phase::Running && self.loops_done >= loop_count.max(1) {
                    self.phase = if fade > 0 {
                        Phase::Fading { left: fade }
                    } else {
                        Phase::Finished
                    };
                }
            }
            None => {
                self.phase = if end_silence > 0 {
                    Phase::Silence { left: end_silence }
                } else {
                    Phase::Finished
                };
            }
        }
    }

    fn audible(&self) -> bool {
        self.started
            && !self.paused
            && matches!(
                self.phase,
                Phase::Running | Phase::Fading { .. } | Phase::Silence { .. }
            )
    }
}

impl Engine for VgmEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        // A file that fails to parse leaves the current session playing.
        let song = song::load(path)?;
        let info = song.track_info(self.loop_count, samples_to_duration(self.fade_samples));
        let psg = song.psg_clock.map(|clock| Sn76489::new(clock, self.sample_rate));
        log::debug!(
            "loaded {} ({}, {} events, loop: {})",
            path.display(),
            info.format,
            song.events.len(),
            song.has_loop()
        );
        self.session = Some(Session {
            song,
            info,
            psg,
            cursor: 0,
            wait_left: 0,
            elapsed: 0,
            loops_done: 0,
            phase: Phase::Running,
            rate_acc: 0,
            started: false,
            paused: false,
        });
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let s = self.session.as_mut().ok_or(Error::NoTrack)?;
        if !s.started || s.phase == Phase::Finished {
            s.rewind();
        }
        s.started = true;
        s.paused = false;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.started = false;
            s.paused = false;
            s.rewind();
        }
    }

    fn pause(&mut self) {
        if let Some(s) = self.session.as_mut() {
            if s.started && s.phase != Phase::Finished {
                s.paused = true;
            }
        }
    }

    fn resume(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.paused = false;
        }
    }

    fn seek(&mut self, pos: Duration) {
        let (loop_count, fade, silence) =
            (self.loop_count, self.fade_samples, self.end_silence_samples);
        let Some(limit) = self.session.as_ref().map(|s| self.display_samples(s)) else {
            return;
        };
        let Some(s) = self.session.as_mut() else {
            return;
        };
        let target = duration_to_samples(pos).min(limit);
        s.rewind();
        s.advance(target, loop_count, fade, silence);
    }

    fn render(&mut self, out: &mut [f32]) -> usize {
        let frames = out.len() / 2;
        let (rate, loop_count, fade, silence) = (
            u64::from(self.sample_rate),
            self.loop_count,
            self.fade_samples,
            self.end_silence_samples,
        );
        let Some(s) = self.session.as_mut() else {
            out.fill(0.0);
            return frames;
        };

        for frame in out.chunks_exact_mut(2) {
            if !s.audible() {
                frame.fill(0.0);
                continue;
            }
            s.rate_acc += u64::from(SONG_RATE);
            let steps = s.rate_acc / rate;
            s.rate_acc %= rate;
            s.advance(steps, loop_count, fade, silence);

            let gain = match s.phase {
                Phase::Running => 1.0,
                Phase::Fading { left } if fade > 0 => left as f32 / fade as f32,
                _ => 0.0,
            };
            let (l, r) = match s.psg.as_mut() {
                Some(psg) => psg.frame(),
                None => (0.0, 0.0),
            };
            frame[0] = l * gain;
            frame[1] = r * gain;
        }
        frames
    }

    fn position(&self) -> Duration {
        match &self.session {
            Some(s) => samples_to_duration(s.elapsed.min(self.display_samples(s))),
            None => Duration::ZERO,
        }
    }

    fn duration(&self) -> Duration {
        match &self.session {
            Some(s) => samples_to_duration(self.display_samples(s)),
            None => Duration::ZERO,
        }
    }

    fn current_loop(&self) -> u32 {
        self.session.as_ref().map(|s| s.loops_done).unwrap_or(0)
    }

    fn loop_count(&self) -> u32 {
        self.loop_count
    }

    fn is_finished(&self) -> bool {
        matches!(&self.session, Some(s) if s.phase == Phase::Finished)
    }

    fn state(&self) -> PlayState {
        let Some(s) = &self.session else {
            return PlayState::Stopped;
        };
        if !s.started {
            return PlayState::Stopped;
        }
        match s.phase {
            Phase::Finished => PlayState::Stopped,
            _ if s.paused => PlayState::Paused,
            Phase::Fading { .. } => PlayState::Fading,
            Phase::Running | Phase::Silence { .. } => PlayState::Playing,
        }
    }

    fn track(&self) -> Option<&TrackInfo> {
        self.session.as_ref().map(|s| &s.info)
    }
}
