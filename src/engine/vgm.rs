//! VGM command stream parser.

use std::path::Path;

use crate::error::{Error, Result};

use super::ChipInfo;
use super::bytes::{need_u32, u8_at, u16_at, u32_at};
use super::gd3;
use super::song::{Song, SongBuilder, Tags};

pub(super) const MAGIC: &[u8] = b"Vgm ";

const DEFAULT_DATA_OFFSET: usize = 0x40;
const WAIT_NTSC: u32 = 735;
const WAIT_PAL: u32 = 882;

/// Clock fields in header order. Fields past the data offset are absent.
const CHIP_CLOCKS: &[(usize, &str)] = &[
    (0x0C, "SN76489"),
    (0x10, "YM2413"),
    (0x2C, "YM2612"),
    (0x30, "YM2151"),
    (0x38, "SegaPCM"),
    (0x40, "RF5C68"),
    (0x44, "YM2203"),
    (0x48, "YM2608"),
    (0x4C, "YM2610"),
    (0x50, "YM3812"),
    (0x54, "YM3526"),
    (0x58, "Y8950"),
    (0x5C, "YMF262"),
    (0x60, "YMF278B"),
    (0x64, "YMF271"),
    (0x68, "YMZ280B"),
    (0x6C, "RF5C164"),
    (0x70, "PWM"),
    (0x74, "AY8910"),
    (0x80, "GB DMG"),
    (0x84, "NES APU"),
    (0x88, "YMW258"),
    (0x8C, "uPD7759"),
    (0x90, "OKIM6258"),
    (0x98, "OKIM6295"),
    (0x9C, "K051649"),
    (0xA0, "K054539"),
    (0xA4, "HuC6280"),
    (0xA8, "C140"),
    (0xAC, "K053260"),
    (0xB0, "Pokey"),
    (0xB4, "QSound"),
];

pub(super) fn parse(data: &[u8], path: &Path) -> Result<Song> {
    if !data.starts_with(MAGIC) {
        return Err(Error::parse("missing \"Vgm \" header"));
    }
    let version = need_u32(data, 0x08, "version")?;
    let eof = relative_offset(data, 0x04).unwrap_or(data.len()).min(data.len());
    let gd3_at = relative_offset(data, 0x14);
    let loop_at = relative_offset(data, 0x1C);
    let data_start = if version >= 0x150 {
        relative_offset(data, 0x34).unwrap_or(DEFAULT_DATA_OFFSET)
    } else {
        DEFAULT_DATA_OFFSET
    };

    let chips = chip_list(data, version, data_start);
    let psg_clock = clock_at(data, 0x0C);

    let mut b = SongBuilder::new();
    let mut pos = data_start;
    while pos < eof {
        if Some(pos) == loop_at {
            b.mark_loop();
        }
        let cmd = data[pos];
        let len = match cmd {
            0x66 => break,
            0x61 => {
                let Some(n) = u16_at(data, pos + 1) else { break };
                b.wait(u32::from(n));
                3
            }
            0x62 => {
                b.wait(WAIT_NTSC);
                1
            }
            0x63 => {
                b.wait(WAIT_PAL);
                1
            }
            0x70..=0x7F => {
                b.wait(u32::from(cmd & 0x0F) + 1);
                1
            }
            0x80..=0x8F => {
                b.wait(u32::from(cmd & 0x0F));
                1
            }
            0x50 => {
                let Some(v) = u8_at(data, pos + 1) else { break };
                b.psg(v);
                2
            }
            0x4F => {
                let Some(v) = u8_at(data, pos + 1) else { break };
                b.psg_stereo(v);
                2
            }
            0x67 => {
                let Some(size) = u32_at(data, pos + 3) else { break };
                7 + (size & 0x7FFF_FFFF) as usize
            }
            0x68 => 12,
            0x90 | 0x91 | 0x95 => 5,
            0x92 => 6,
            0x93 => 11,
            0x94 => 2,
            0x30..=0x3F => 2,
            0x40..=0x4E | 0x51..=0x5F | 0xA0..=0xBF => 3,
            0xC0..=0xDF => 4,
            0xE0..=0xFF => 5,
            _ => {
                return Err(Error::parse(format!(
                    "unknown VGM command 0x{cmd:02X} at 0x{pos:X}"
                )));
            }
        };
        pos += len;
    }

    let tags = gd3_at
        .and_then(|off| gd3::parse(data, off))
        .unwrap_or_else(Tags::default);

    Ok(b.finish(psg_clock, tags, format_version(version), chips, path))
}

/// Absolute offset of a field stored relative to its own position; zero means unset.
fn relative_offset(data: &[u8], field: usize) -> Option<usize> {
    match u32_at(data, field)? {
        0 => None,
        rel => Some(field + rel as usize),
    }
}

/// Clock with the dual-chip and variant flag bits removed.
fn clock_at(data: &[u8], field: usize) -> Option<u32> {
    u32_at(data, field)
        .map(|c| c & 0x3FFF_FFFF)
        .filter(|&c| c != 0)
}

fn chip_list(data: &[u8], version: u32, data_start: usize) -> Vec<ChipInfo> {
    CHIP_CLOCKS
        .iter()
        // Before 1.10, YM2612/YM2151 shared the YM2413 clock field.
        .filter(|(off, _)| version >= 0x110 || *off < 0x2C)
        .filter(|(off, _)| off + 4 <= data_start)
        .filter_map(|&(off, name)| {
            let raw = u32_at(data, off)?;
            clock_at(data, off)?;
            let name = if raw & 0x4000_0000 != 0 {
                format!("2x{name}")
            } else {
                name.to_string()
            };
            let core = if off == 0x0C { "PSG" } else { "silent" };
            Some(ChipInfo {
                name,
                core: core.to_string(),
            })
        })
        .collect()
}

/// "VGM 1.71" from the BCD version field.
fn format_version(version: u32) -> String {
    format!("VGM {:x}.{:02x}", version >> 8, version & 0xFF)
}
