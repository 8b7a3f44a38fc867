//! Playlist: an ordered, user-editable list of tracks with a "currently
//! playing" pointer and a cursor.
//!
//! Every operation is a no-op on out-of-range input. Indices handed out are
//! either `None` or valid for the current length.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::LoopModeSetting;
use crate::library::Track;

/// Playlist-level repeat policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    #[default]
    None,
    /// Repeat the current track. Only auto-advance honours it; manual
    /// next/previous treat it like `None`.
    One,
    All,
}

impl LoopMode {
    /// Cycle `None -> One -> All -> None`.
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::One,
            Self::One => Self::All,
            Self::All => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "-",
            Self::One => "1",
            Self::All => "A",
        }
    }
}

impl From<LoopModeSetting> for LoopMode {
    fn from(s: LoopModeSetting) -> Self {
        match s {
            LoopModeSetting::None => Self::None,
            LoopModeSetting::One => Self::One,
            LoopModeSetting::All => Self::All,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
    selected: usize,
    loop_mode: LoopMode,
}

impl Playlist {
    pub fn new(loop_mode: LoopMode) -> Self {
        Self {
            loop_mode,
            ..Self::default()
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn add_tracks(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Remove the track under the cursor.
    ///
    /// Removing the current track clears the pointer; removing one before it
    /// shifts the pointer so it keeps naming the same track.
    pub fn remove_selected(&mut self) {
        let at = self.selected;
        if at >= self.tracks.len() {
            return;
        }
        self.tracks.remove(at);
        self.current = match self.current {
            Some(c) if c == at => None,
            Some(c) if c > at => Some(c - 1),
            other => other,
        };
        if self.selected >= self.tracks.len() {
            self.selected = self.tracks.len().saturating_sub(1);
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
        self.selected = 0;
    }

    /// Mark `index` as playing. Out-of-range values clear the pointer.
    pub fn set_current_track(&mut self, index: usize) {
        self.current = (index < self.tracks.len()).then_some(index);
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// A copy of the track at `index`.
    pub fn get_track(&self, index: usize) -> Option<Track> {
        self.tracks.get(index).cloned()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.current.and_then(|i| self.get_track(i))
    }

    pub fn selected_track(&self) -> Option<Track> {
        self.get_track(self.selected)
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn cycle_loop_mode(&mut self) {
        self.loop_mode = self.loop_mode.next();
    }

    /// Index after the current one, without moving the pointer.
    pub fn peek_next_track(&self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        match self.current {
            None => Some(0),
            Some(c) if c + 1 < len => Some(c + 1),
            Some(_) if self.loop_mode == LoopMode::All => Some(0),
            Some(_) => None,
        }
    }

    /// Index before the current one, without moving the pointer.
    pub fn peek_prev_track(&self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        match self.current {
            Some(c) if c > 0 => Some(c - 1),
            _ if self.loop_mode == LoopMode::All => Some(len - 1),
            _ => None,
        }
    }

    /// Advance the pointer and the cursor together.
    pub fn next_track(&mut self) -> Option<usize> {
        let next = self.peek_next_track()?;
        self.current = Some(next);
        self.selected = next;
        Some(next)
    }

    /// Retreat the pointer and the cursor together.
    pub fn prev_track(&mut self) -> Option<usize> {
        let prev = self.peek_prev_track()?;
        self.current = Some(prev);
        self.selected = prev;
        Some(prev)
    }

    /// Swap the selected entry with the one above it.
    pub fn move_up(&mut self) {
        let at = self.selected;
        if at == 0 || at >= self.tracks.len() {
            return;
        }
        self.swap(at, at - 1);
        self.selected = at - 1;
    }

    /// Swap the selected entry with the one below it.
    pub fn move_down(&mut self) {
        let at = self.selected;
        if at + 1 >= self.tracks.len() {
            return;
        }
        self.swap(at, at + 1);
        self.selected = at + 1;
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.tracks.swap(a, b);
        self.current = match self.current {
            Some(c) if c == a => Some(b),
            Some(c) if c == b => Some(a),
            other => other,
        };
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    /// Permute every entry, keeping the pointer on the same track (by path).
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.tracks.len() <= 1 {
            return;
        }
        let playing = self.current_track().map(|t| t.path);
        self.tracks.shuffle(rng);
        self.current =
            playing.and_then(|path| self.tracks.iter().position(|t| t.path == path));
    }

    pub fn move_cursor_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn move_cursor_down(&mut self, n: usize) {
        let last = self.tracks.len().saturating_sub(1);
        self.selected = self.selected.saturating_add(n).min(last);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    /// Panel title: `Playlist`, `Playlist [len]` or `Playlist [cur/len]`.
    pub fn title(&self) -> String {
        match (self.tracks.len(), self.current) {
            (0, _) => "Playlist".to_string(),
            (len, Some(c)) => format!("Playlist [{}/{}]", c + 1, len),
            (len, None) => format!("Playlist [{len}]"),
        }
    }
}

#[cfg(test)]
mod tests;
