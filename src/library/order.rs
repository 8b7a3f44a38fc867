//! Track ordering within a game: M3U position, then the number in the
//! filename, then the path.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::is_supported;

use super::model::Track;

/// Patterns tried in order, each a hand-written anchored match on the stem:
/// "01 - Title" / "01_Title" / "01.Title" / "01) Title", "[01] Title",
/// "(01) Title", "Track 01", "01", "01 Title".
const PATTERNS: [fn(&str) -> Option<u32>; 6] = [
    separated,
    bracketed,
    parenthesized,
    track_prefix,
    bare,
    spaced,
];

/// Track number from a file name, accepted in 1..=999.
pub fn track_number(file_name: &str) -> Option<u32> {
    let stem = strip_supported_extension(file_name);
    PATTERNS
        .iter()
        .filter_map(|pattern| pattern(stem))
        .find(|n| (1..=999).contains(n))
}

fn strip_supported_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if is_supported(Path::new(name)) => stem,
        _ => name,
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// One to three digits.
fn short_number(digits: &str) -> Option<u32> {
    if (1..=3).contains(&digits.len()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn separated(s: &str) -> Option<u32> {
    let (digits, rest) = split_digits(s);
    let n = short_number(digits)?;
    rest.trim_start()
        .starts_with(['-', '.', '_', ')', ']'])
        .then_some(n)
}

fn enclosed(s: &str, open: char, close: char) -> Option<u32> {
    let (digits, rest) = split_digits(s.strip_prefix(open)?);
    let n = short_number(digits)?;
    rest.starts_with(close).then_some(n)
}

fn bracketed(s: &str) -> Option<u32> {
    enclosed(s, '[', ']')
}

fn parenthesized(s: &str) -> Option<u32> {
    enclosed(s, '(', ')')
}

fn track_prefix(s: &str) -> Option<u32> {
    if !s.get(..5)?.eq_ignore_ascii_case("track") {
        return None;
    }
    let (digits, _) = split_digits(s[5..].trim_start());
    short_number(&digits[..digits.len().min(3)])
}

fn bare(s: &str) -> Option<u32> {
    let (digits, rest) = split_digits(s);
    if rest.is_empty() { short_number(digits) } else { None }
}

fn spaced(s: &str) -> Option<u32> {
    let (digits, rest) = split_digits(s);
    let n = short_number(digits)?;
    rest.starts_with(char::is_whitespace).then_some(n)
}

/// First `.m3u`/`.m3u8` file in `dir` by name.
pub fn find_m3u(dir: &Path) -> Option<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| !t.is_dir()))
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("m3u") || e.eq_ignore_ascii_case("m3u8"))
        })
        .collect();
    found.sort();
    found.into_iter().next()
}

/// Map of lowercase file name to 1-based playlist position. Only supported
/// files count toward the position; comments and blank lines are skipped.
pub fn parse_m3u(text: &str) -> HashMap<String, u32> {
    let mut order = HashMap::new();
    let mut position = 0;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.replace('\\', "/");
        let name = line.rsplit('/').next().unwrap_or(&line);
        if is_supported(Path::new(name)) {
            position += 1;
            order.insert(name.to_lowercase(), position);
        }
    }
    order
}

fn read_m3u(path: &Path) -> HashMap<String, u32> {
    match fs::read(path) {
        Ok(bytes) => parse_m3u(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            log::warn!("cannot read playlist {}: {e}", path.display());
            HashMap::new()
        }
    }
}

/// Number and sort the tracks of one game.
///
/// The M3U in the directory of the game's first track overrides filename
/// numbers for the files it lists.
pub(super) fn order_game(tracks: &mut [Track]) {
    let playlist = tracks
        .first()
        .and_then(|t| t.path.parent())
        .and_then(find_m3u)
        .map(|p| read_m3u(&p))
        .unwrap_or_default();

    for track in tracks.iter_mut() {
        let name = track
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        track.track_number = playlist
            .get(&name.to_lowercase())
            .copied()
            .or_else(|| track_number(&name));
    }

    sort_tracks(tracks);
}

/// Numbered tracks first by number, then the rest; ties by path.
pub(super) fn sort_tracks(tracks: &mut [Track]) {
    tracks.sort_by(|a, b| {
        let key = |t: &Track| (t.track_number.is_none(), t.track_number);
        key(a).cmp(&key(b)).then_with(|| a.path.cmp(&b.path))
    });
}
