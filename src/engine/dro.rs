//! DOSBox Raw OPL capture (DRO v1 and v2).

use std::path::Path;

use crate::error::{Error, Result};

use super::ChipInfo;
use super::bytes::{u8_at, u16_at, u32_at};
use super::song::{Song, SongBuilder, Tags};

pub(super) const MAGIC: &[u8] = b"DBRAWOPL";

pub(super) fn parse(data: &[u8], path: &Path) -> Result<Song> {
    if !data.starts_with(MAGIC) {
        return Err(Error::parse("missing DBRAWOPL header"));
    }
    let major = u16_at(data, 0x08).ok_or_else(|| Error::parse("truncated DRO header"))?;
    let minor = u16_at(data, 0x0A).unwrap_or(0);

    let mut b = SongBuilder::new();
    let hardware = match (major, minor) {
        (2, _) => parse_v2(data, &mut b)?,
        (0, 1) | (1, 0) => parse_v1(data, &mut b)?,
        _ => {
            return Err(Error::parse(format!(
                "unsupported DRO version {major}.{minor}"
            )));
        }
    };

    let chip = match hardware {
        0 => "YM3812",
        1 => "2xYM3812",
        _ => "YMF262",
    };
    let tags = Tags {
        system: "PC (AdLib)".to_string(),
        ..Tags::default()
    };
    let format = if major == 2 { "DRO v2.0" } else { "DRO v1.0" };
    Ok(b.finish(
        None,
        tags,
        format.to_string(),
        vec![ChipInfo::new(chip, "silent")],
        path,
    ))
}

fn parse_v2(data: &[u8], b: &mut SongBuilder) -> Result<u8> {
    let truncated = || Error::parse("truncated DRO v2 header");
    let pairs = u32_at(data, 0x0C).ok_or_else(truncated)? as usize;
    let hardware = u8_at(data, 0x14).ok_or_else(truncated)?;
    let short_delay = u8_at(data, 0x17).ok_or_else(truncated)?;
    let long_delay = u8_at(data, 0x18).ok_or_else(truncated)?;
    let codemap_len = u8_at(data, 0x19).ok_or_else(truncated)? as usize;

    let start = 0x1A + codemap_len;
    let mut carry = 0.0;
    for pair in data.get(start..).unwrap_or(&[]).chunks_exact(2).take(pairs) {
        let (reg, val) = (pair[0], pair[1]);
        if reg == short_delay {
            b.wait_seconds(&mut carry, ms(u32::from(val) + 1));
        } else if reg == long_delay {
            b.wait_seconds(&mut carry, ms((u32::from(val) + 1) << 8));
        }
    }
    Ok(hardware)
}

fn parse_v1(data: &[u8], b: &mut SongBuilder) -> Result<u8> {
    let length = u32_at(data, 0x10).ok_or_else(|| Error::parse("truncated DRO v1 header"))?;
    let hardware = u8_at(data, 0x14).unwrap_or(0);
    // Some writers store the hardware type as a u32.
    let start: usize = if data.get(0x15..0x18) == Some(&[0u8, 0, 0][..]) {
        0x18
    } else {
        0x15
    };
    let end = start.saturating_add(length as usize).min(data.len());

    let mut carry = 0.0;
    let mut pos = start;
    while pos < end {
        pos += match data[pos] {
            0x00 => {
                let Some(d) = u8_at(data, pos + 1) else { break };
                b.wait_seconds(&mut carry, ms(u32::from(d) + 1));
                2
            }
            0x01 => {
                let Some(d) = u16_at(data, pos + 1) else { break };
                b.wait_seconds(&mut carry, ms(u32::from(d) + 1));
                3
            }
            0x02 | 0x03 => 1,
            0x04 => 3,
            _ => 2,
        };
    }
    Ok(hardware)
}

fn ms(n: u32) -> f64 {
    f64::from(n) / 1000.0
}
