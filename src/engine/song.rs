//! Normalized event stream shared by every file format.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

use super::{ChipInfo, SONG_RATE, TrackInfo, bytes, dro, gym, s98, vgm};

/// Default SN76489 clock (NTSC master clock / 1).
pub(super) const DEFAULT_PSG_CLOCK: u32 = 3_579_545;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum Event {
    /// Advance time by this many samples at `SONG_RATE`.
    Wait(u32),
    /// SN76489 register write.
    Psg(u8),
    /// Game Gear stereo mask.
    PsgStereo(u8),
}

/// Descriptive fields carried over from the file's tags.
#[derive(Debug, Clone, Default)]
pub(super) struct Tags {
    pub title: String,
    pub game: String,
    pub system: String,
    pub composer: String,
    pub date: String,
    pub vgm_by: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub(super) struct Song {
    pub events: Vec<Event>,
    /// Index into `events` where the loop section starts.
    pub loop_index: Option<usize>,
    /// Samples in one pass through the whole stream.
    pub total_samples: u64,
    /// Samples in the loop section.
    pub loop_samples: u64,
    /// SN76489 clock, or `None` when the song has no PSG.
    pub psg_clock: Option<u32>,
    pub tags: Tags,
    pub format: String,
    pub chips: Vec<ChipInfo>,
    pub path: std::path::PathBuf,
}

impl Song {
    pub fn has_loop(&self) -> bool {
        self.loop_index.is_some() && self.loop_samples > 0
    }

    pub fn intro_samples(&self) -> u64 {
        self.total_samples - self.loop_samples
    }

    /// Length of playback in song samples: intro, `loop_count` passes of the
    /// loop section and the fade for looping songs; the stream plus trailing
    /// silence otherwise.
    pub fn playback_samples(&self, loop_count: u32, fade: u64, end_silence: u64) -> u64 {
        if self.has_loop() {
            self.intro_samples() + self.loop_samples * u64::from(loop_count.max(1)) + fade
        } else {
            self.total_samples + end_silence
        }
    }

    /// Duration shown to the user. End silence is not part of it.
    pub fn display_samples(&self, loop_count: u32, fade: u64) -> u64 {
        if self.has_loop() {
            self.playback_samples(loop_count, fade, 0)
        } else {
            self.total_samples
        }
    }

    pub fn track_info(&self, loop_count: u32, fade: Duration) -> TrackInfo {
        let fade = duration_to_samples(fade);
        TrackInfo {
            path: self.path.clone(),
            title: self.tags.title.clone(),
            game: self.tags.game.clone(),
            system: self.tags.system.clone(),
            composer: self.tags.composer.clone(),
            date: self.tags.date.clone(),
            vgm_by: self.tags.vgm_by.clone(),
            notes: self.tags.notes.clone(),
            format: self.format.clone(),
            duration: samples_to_duration(self.display_samples(loop_count, fade)),
            loop_point: if self.has_loop() {
                samples_to_duration(self.intro_samples())
            } else {
                Duration::ZERO
            },
            has_loop: self.has_loop(),
            chips: self.chips.clone(),
        }
    }
}

pub(super) fn samples_to_duration(samples: u64) -> Duration {
    Duration::from_micros(samples * 1_000_000 / u64::from(SONG_RATE))
}

pub(super) fn duration_to_samples(d: Duration) -> u64 {
    (d.as_micros() * u128::from(SONG_RATE) / 1_000_000) as u64
}

/// Accumulates events while a parser walks its command stream.
#[derive(Debug, Default)]
pub(super) struct SongBuilder {
    events: Vec<Event>,
    loop_index: Option<usize>,
    total: u64,
    at_loop: u64,
}

impl SongBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a wait, merging it with a directly preceding one.
    pub fn wait(&mut self, samples: u32) {
        if samples == 0 {
            return;
        }
        self.total += u64::from(samples);
        let loop_boundary = self.loop_index == Some(self.events.len());
        match self.events.last_mut() {
            Some(Event::Wait(prev)) if !loop_boundary => {
                match prev.checked_add(samples) {
                    Some(sum) => *prev = sum,
                    None => self.events.push(Event::Wait(samples)),
                }
            }
            _ => self.events.push(Event::Wait(samples)),
        }
    }

    /// Wait given in (possibly fractional) seconds.
    pub fn wait_seconds(&mut self, carry: &mut f64, seconds: f64) {
        let exact = seconds * f64::from(SONG_RATE) + *carry;
        let whole = exact.floor();
        *carry = exact - whole;
        self.wait(whole as u32);
    }

    pub fn psg(&mut self, data: u8) {
        self.events.push(Event::Psg(data));
    }

    pub fn psg_stereo(&mut self, mask: u8) {
        self.events.push(Event::PsgStereo(mask));
    }

    /// Mark the current position as the loop start. Later calls are ignored.
    pub fn mark_loop(&mut self) {
        if self.loop_index.is_none() {
            self.loop_index = Some(self.events.len());
            self.at_loop = self.total;
        }
    }

    pub fn finish(
        self,
        psg_clock: Option<u32>,
        tags: Tags,
        format: String,
        chips: Vec<ChipInfo>,
        path: &Path,
    ) -> Song {
        let loop_samples = match self.loop_index {
            Some(_) => self.total - self.at_loop,
            None => 0,
        };
        Song {
            events: self.events,
            loop_index: self.loop_index.filter(|_| loop_samples > 0),
            total_samples: self.total,
            loop_samples,
            psg_clock,
            tags,
            format,
            chips,
            path: path.to_path_buf(),
        }
    }
}

/// Read and parse any supported file.
pub(super) fn load(path: &Path) -> Result<Song> {
    if !super::is_supported(path) {
        return Err(super::unsupported(path));
    }
    let raw = fs::read(path)?;
    let data = bytes::maybe_gunzip(raw)?;
    parse(&data, path)
}

/// Pick a parser by magic bytes, falling back to the extension.
pub(super) fn parse(data: &[u8], path: &Path) -> Result<Song> {
    if data.starts_with(vgm::MAGIC) {
        return vgm::parse(data, path);
    }
    if data.starts_with(dro::MAGIC) {
        return dro::parse(data, path);
    }
    if data.starts_with(s98::MAGIC) {
        return s98::parse(data, path);
    }
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "gym" => gym::parse(data, path),
        "vgm" | "vgz" => Err(Error::parse("missing \"Vgm \" header")),
        "dro" => Err(Error::parse("missing DBRAWOPL header")),
        "s98" => Err(Error::parse("missing S98 header")),
        _ => Err(super::unsupported(path)),
    }
}
