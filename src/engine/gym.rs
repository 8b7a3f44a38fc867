//! GYM (Genesis YM2612 log) parser, with optional GYMX header.

use std::path::Path;

use crate::error::{Error, Result};

use super::ChipInfo;
use super::bytes::{fixed_str, u8_at, u32_at, zlib_inflate};
use super::song::{DEFAULT_PSG_CLOCK, Song, SongBuilder, Tags};

const GYMX_MAGIC: &[u8] = b"GYMX";
const GYMX_HEADER_LEN: usize = 0x1AC;
/// One 60 Hz frame at the song rate.
const FRAME_SAMPLES: u32 = 735;

pub(super) fn parse(data: &[u8], path: &Path) -> Result<Song> {
    let tags;
    let loop_frame;
    let inflated: Vec<u8>;
    let body: &[u8] = if data.starts_with(GYMX_MAGIC) {
        if data.len() < GYMX_HEADER_LEN {
            return Err(Error::parse("truncated GYMX header"));
        }
        tags = Tags {
            title: fixed_str(data, 0x04, 32),
            game: fixed_str(data, 0x24, 32),
            date: fixed_str(data, 0x44, 32),
            vgm_by: fixed_str(data, 0x84, 32),
            notes: fixed_str(data, 0xA4, 256),
            system: "Sega Mega Drive / Genesis".to_string(),
            composer: String::new(),
        };
        loop_frame = u32_at(data, 0x1A4).unwrap_or(0);
        let packed = u32_at(data, 0x1A8).unwrap_or(0);
        if packed != 0 {
            inflated = zlib_inflate(&data[GYMX_HEADER_LEN..])?;
            &inflated
        } else {
            &data[GYMX_HEADER_LEN..]
        }
    } else {
        tags = Tags {
            system: "Sega Mega Drive / Genesis".to_string(),
            ..Tags::default()
        };
        loop_frame = 0;
        data
    };

    let mut b = SongBuilder::new();
    let mut frames: u32 = 0;
    let mut pos = 0;
    while pos < body.len() {
        if loop_frame > 0 && frames + 1 == loop_frame {
            b.mark_loop();
        }
        pos += match body[pos] {
            0x00 => {
                b.wait(FRAME_SAMPLES);
                frames += 1;
                1
            }
            0x01 | 0x02 => 3,
            0x03 => {
                let Some(v) = u8_at(body, pos + 1) else { break };
                b.psg(v);
                2
            }
            other => {
                return Err(Error::parse(format!(
                    "unknown GYM command 0x{other:02X} at 0x{pos:X}"
                )));
            }
        };
    }

    let chips = vec![
        ChipInfo::new("YM2612", "silent"),
        ChipInfo::new("SN76489", "PSG"),
    ];
    let format = if data.starts_with(GYMX_MAGIC) { "GYMX" } else { "GYM" };
    Ok(b.finish(Some(DEFAULT_PSG_CLOCK), tags, format.to_string(), chips, path))
}
