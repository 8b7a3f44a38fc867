//! Little-endian field access and input decompression for the parsers.

use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflate gzip input (`.vgz`, or a `.vgm` that is secretly compressed).
pub(super) fn maybe_gunzip(data: Vec<u8>) -> Result<Vec<u8>> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Ok(data);
    }
    let mut out = Vec::with_capacity(data.len() * 4);
    GzDecoder::new(data.as_slice())
        .read_to_end(&mut out)
        .map_err(|e| Error::parse(format!("gzip: {e}")))?;
    Ok(out)
}

pub(super) fn zlib_inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4);
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::parse(format!("zlib: {e}")))?;
    Ok(out)
}

pub(super) fn u8_at(data: &[u8], off: usize) -> Option<u8> {
    data.get(off).copied()
}

pub(super) fn u16_at(data: &[u8], off: usize) -> Option<u16> {
    let b = data.get(off..off + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

pub(super) fn u32_at(data: &[u8], off: usize) -> Option<u32> {
    let b = data.get(off..off + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Like `u32_at` but a truncated header is a parse error.
pub(super) fn need_u32(data: &[u8], off: usize, what: &str) -> Result<u32> {
    u32_at(data, off).ok_or_else(|| Error::parse(format!("truncated header: {what}")))
}

/// Fixed-width, NUL-padded text field.
pub(super) fn fixed_str(data: &[u8], off: usize, len: usize) -> String {
    let Some(raw) = data.get(off..off + len) else {
        return String::new();
    };
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}
