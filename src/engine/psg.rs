//! SN76489 programmable sound generator.
//!
//! Three square-wave tone channels and one noise channel driven by a
//! 16-bit LFSR. The chip divides its input clock by 16; output is
//! box-filtered over the internal ticks that fall inside one output frame.

const NOISE_CHANNEL: usize = 3;
const LFSR_RESET: u16 = 0x8000;
/// Taps for white noise (bits 0 and 3).
const WHITE_NOISE_TAPS: u16 = 0x0009;
/// Per-channel output scale so four channels at full volume stay below 1.0.
const CHANNEL_GAIN: f32 = 0.2;

/// Attenuation in 2 dB steps; 15 is silence.
const VOLUME_TABLE: [f32; 16] = [
    1.0, 0.794_328, 0.630_957, 0.501_187, 0.398_107, 0.316_228, 0.251_189, 0.199_526, 0.158_489,
    0.125_893, 0.100_000, 0.079_433, 0.063_096, 0.050_119, 0.039_811, 0.0,
];

#[derive(Clone, Debug)]
pub(super) struct Sn76489 {
    /// 10-bit tone periods for channels 0-2.
    periods: [u16; 3],
    counters: [u16; 4],
    /// Square output polarity for tone channels and the noise flip-flop.
    outputs: [bool; 4],
    /// 4-bit attenuation per channel.
    attenuation: [u8; 4],
    noise_control: u8,
    lfsr: u16,
    /// Register index selected by the last latch byte (channel * 2 + type).
    latched: u8,
    /// Game Gear stereo mask: high nibble left, low nibble right.
    stereo: u8,
    ticks_per_frame: f64,
    tick_carry: f64,
}

impl Sn76489 {
    pub fn new(clock: u32, sample_rate: u32) -> Self {
        Self {
            periods: [0; 3],
            counters: [0; 4],
            outputs: [true; 4],
            attenuation: [0x0F; 4],
            noise_control: 0,
            lfsr: LFSR_RESET,
            latched: 0,
            stereo: 0xFF,
            ticks_per_frame: f64::from(clock) / 16.0 / f64::from(sample_rate.max(1)),
            tick_carry: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            ticks_per_frame: self.ticks_per_frame,
            ..Self::new(0, 1)
        };
    }

    pub fn set_stereo(&mut self, mask: u8) {
        self.stereo = mask;
    }

    /// Apply one byte written to the chip's data port.
    pub fn write(&mut self, byte: u8) {
        if byte & 0x80 != 0 {
            self.latched = (byte >> 4) & 0x07;
            self.apply(byte & 0x0F, true);
        } else {
            self.apply(byte & 0x3F, false);
        }
    }

    fn apply(&mut self, data: u8, latch: bool) {
        let channel = usize::from(self.latched >> 1);
        let is_volume = self.latched & 1 == 1;
        if is_volume {
            self.attenuation[channel] = data & 0x0F;
        } else if channel == NOISE_CHANNEL {
            self.noise_control = data & 0x07;
            self.lfsr = LFSR_RESET;
        } else if latch {
            self.periods[channel] = (self.periods[channel] & 0x3F0) | u16::from(data & 0x0F);
        } else {
            self.periods[channel] = (self.periods[channel] & 0x00F) | (u16::from(data) << 4);
        }
    }

    /// Render one stereo output frame.
    pub fn frame(&mut self) -> (f32, f32) {
        self.tick_carry += self.ticks_per_frame;
        let ticks = self.tick_carry.floor();
        self.tick_carry -= ticks;
        let ticks = ticks as u32;

        let mut acc = [0.0f32; 4];
        for _ in 0..ticks {
            self.tick();
            for (ch, slot) in acc.iter_mut().enumerate() {
                *slot += self.channel_level(ch);
            }
        }
        if ticks == 0 {
            for (ch, slot) in acc.iter_mut().enumerate() {
                *slot = self.channel_level(ch);
            }
        }
        let norm = 1.0 / ticks.max(1) as f32;

        let (mut left, mut right) = (0.0, 0.0);
        for (ch, level) in acc.iter().enumerate() {
            let level = level * norm * CHANNEL_GAIN;
            if self.stereo & (0x10 << ch) != 0 {
                left += level;
            }
            if self.stereo & (0x01 << ch) != 0 {
                right += level;
            }
        }
        (left, right)
    }

    fn channel_level(&self, ch: usize) -> f32 {
        let volume = VOLUME_TABLE[usize::from(self.attenuation[ch])];
        let high = if ch == NOISE_CHANNEL {
            self.lfsr & 1 == 1
        } else {
            // Periods 0 and 1 hold the output high (used for sample playback).
            self.periods[ch] <= 1 || self.outputs[ch]
        };
        if high { volume } else { -volume }
    }

    fn tick(&mut self) {
        for ch in 0..3 {
            if self.counters[ch] > 0 {
                self.counters[ch] -= 1;
            }
            if self.counters[ch] == 0 {
                self.counters[ch] = self.periods[ch].max(1);
                self.outputs[ch] = !self.outputs[ch];
            }
        }

        if self.counters[NOISE_CHANNEL] > 0 {
            self.counters[NOISE_CHANNEL] -= 1;
        }
        if self.counters[NOISE_CHANNEL] == 0 {
            self.counters[NOISE_CHANNEL] = match self.noise_control & 0x03 {
                0 => 0x10,
                1 => 0x20,
                2 => 0x40,
                _ => self.periods[2].max(1),
            };
            self.outputs[NOISE_CHANNEL] = !self.outputs[NOISE_CHANNEL];
            if self.outputs[NOISE_CHANNEL] {
                self.shift_noise();
            }
        }
    }

    fn shift_noise(&mut self) {
        let feedback = if self.noise_control & 0x04 != 0 {
            ((self.lfsr & WHITE_NOISE_TAPS).count_ones() & 1) as u16
        } else {
            self.lfsr & 1
        };
        self.lfsr = (self.lfsr >> 1) | (feedback << 15);
    }

    #[cfg(test)]
    pub fn period(&self, ch: usize) -> u16 {
        self.periods[ch]
    }

    #[cfg(test)]
    pub fn attenuation(&self, ch: usize) -> u8 {
        self.attenuation[ch]
    }
}
