//! GD3 tag block: eleven NUL-terminated UTF-16LE strings.

use super::bytes::u32_at;
use super::song::Tags;

pub(super) const MAGIC: &[u8] = b"Gd3 ";
const FIELD_COUNT: usize = 11;

/// Parse the GD3 block starting at `off`. Returns `None` when the block is
/// missing or damaged; a song without tags is still playable.
pub(super) fn parse(data: &[u8], off: usize) -> Option<Tags> {
    if data.get(off..off + 4)? != MAGIC {
        return None;
    }
    let len = u32_at(data, off + 8)? as usize;
    let start = off + 12;
    let end = start.saturating_add(len).min(data.len());
    let body = data.get(start..end)?;

    let mut fields: Vec<String> = Vec::with_capacity(FIELD_COUNT);
    let mut units: Vec<u16> = Vec::new();
    for pair in body.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if unit == 0 {
            fields.push(String::from_utf16_lossy(&units).trim().to_string());
            units.clear();
            if fields.len() == FIELD_COUNT {
                break;
            }
        } else {
            units.push(unit);
        }
    }
    fields.resize(FIELD_COUNT, String::new());

    Some(Tags {
        title: prefer_english(&fields[0], &fields[1]),
        game: prefer_english(&fields[2], &fields[3]),
        system: prefer_english(&fields[4], &fields[5]),
        composer: prefer_english(&fields[6], &fields[7]),
        date: fields[8].clone(),
        vgm_by: fields[9].clone(),
        notes: fields[10].clone(),
    })
}

fn prefer_english(en: &str, jp: &str) -> String {
    if en.is_empty() { jp } else { en }.to_string()
}
