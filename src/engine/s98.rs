//! S98 register log parser (v1 to v3).

use std::path::Path;

use crate::error::{Error, Result};

use super::ChipInfo;
use super::bytes::{u8_at, u32_at};
use super::song::{Song, SongBuilder, Tags};

pub(super) const MAGIC: &[u8] = b"S98";

const DEVICE_DCSG: u32 = 16;
const DEVICE_INFO_LEN: usize = 16;

struct Device {
    kind: u32,
    clock: u32,
}

pub(super) fn parse(data: &[u8], path: &Path) -> Result<Song> {
    if !data.starts_with(MAGIC) {
        return Err(Error::parse("missing S98 header"));
    }
    let version = u8_at(data, 3)
        .filter(u8::is_ascii_digit)
        .map(|c| c - b'0')
        .ok_or_else(|| Error::parse("bad S98 version"))?;
    let truncated = || Error::parse("truncated S98 header");

    let numerator = match u32_at(data, 0x04).ok_or_else(truncated)? {
        0 => 10,
        n => n,
    };
    let denominator = match u32_at(data, 0x08).ok_or_else(truncated)? {
        0 => 1000,
        d => d,
    };
    let sync_seconds = f64::from(numerator) / f64::from(denominator);
    let tag_at = u32_at(data, 0x10).ok_or_else(truncated)? as usize;
    let dump_at = u32_at(data, 0x14).ok_or_else(truncated)? as usize;
    let loop_at = u32_at(data, 0x18).ok_or_else(truncated)? as usize;

    let devices = read_devices(data, version);
    let psg_clock = devices
        .iter()
        .find(|d| d.kind == DEVICE_DCSG)
        .map(|d| d.clock);

    let mut b = SongBuilder::new();
    let mut carry = 0.0;
    let mut pos = dump_at;
    while pos < data.len() {
        if loop_at != 0 && pos == loop_at {
            b.mark_loop();
        }
        match data[pos] {
            0xFD => break,
            0xFF => {
                b.wait_seconds(&mut carry, sync_seconds);
                pos += 1;
            }
            0xFE => {
                let (n, used) = read_varint(&data[pos + 1..]);
                b.wait_seconds(&mut carry, sync_seconds * (n as f64 + 2.0));
                pos += 1 + used;
            }
            cmd => {
                let device = devices.get(usize::from(cmd >> 1));
                if let (Some(dev), Some(value)) = (device, u8_at(data, pos + 2)) {
                    if dev.kind == DEVICE_DCSG {
                        b.psg(value);
                    }
                }
                pos += 3;
            }
        }
    }

    let tags = if tag_at == 0 {
        Tags::default()
    } else if version >= 3 {
        parse_v3_tags(data.get(tag_at..).unwrap_or(&[]))
    } else {
        Tags {
            title: c_string(data.get(tag_at..).unwrap_or(&[])),
            ..Tags::default()
        }
    };

    let chips = devices
        .iter()
        .filter_map(|d| {
            let name = device_name(d.kind)?;
            let core = if d.kind == DEVICE_DCSG { "PSG" } else { "silent" };
            Some(ChipInfo::new(name, core))
        })
        .collect();

    Ok(b.finish(psg_clock, tags, format!("S98 v{version}"), chips, path))
}

fn read_devices(data: &[u8], version: u8) -> Vec<Device> {
    let count = if version >= 3 {
        u32_at(data, 0x1C).unwrap_or(0) as usize
    } else {
        0
    };
    if count == 0 {
        // Older files imply a single OPNA.
        return vec![Device {
            kind: 4,
            clock: 7_987_200,
        }];
    }
    (0..count)
        .map_while(|i| {
            let off = 0x20 + i * DEVICE_INFO_LEN;
            Some(Device {
                kind: u32_at(data, off)?,
                clock: u32_at(data, off + 4)?,
            })
        })
        .collect()
}

/// Little-endian base-128 integer; returns the value and bytes consumed.
fn read_varint(data: &[u8]) -> (u64, usize) {
    let mut value: u64 = 0;
    for (i, &byte) in data.iter().enumerate().take(9) {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return (value, i + 1);
        }
    }
    (value, data.len().min(9))
}

fn parse_v3_tags(raw: &[u8]) -> Tags {
    let mut tags = Tags::default();
    let Some(body) = raw.strip_prefix(b"[S98]") else {
        tags.title = c_string(raw);
        return tags;
    };
    let body = body.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(body);
    let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
    let text = String::from_utf8_lossy(&body[..end]);
    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "title" => tags.title = value,
            "artist" => tags.composer = value,
            "game" => tags.game = value,
            "year" => tags.date = value,
            "comment" => tags.notes = value,
            "s98by" => tags.vgm_by = value,
            "system" => tags.system = value,
            _ => {}
        }
    }
    tags
}

fn c_string(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

fn device_name(kind: u32) -> Option<&'static str> {
    Some(match kind {
        1 => "YM2149",
        2 => "YM2203",
        3 => "YM2612",
        4 => "YM2608",
        5 => "YM2151",
        6 => "YM2413",
        7 => "YM3526",
        8 => "YM3812",
        9 => "YMF262",
        15 => "AY8910",
        16 => "SN76489",
        _ => return None,
    })
}
