//! File browser used when no library root is available.
//!
//! The browser never touches the filesystem itself: navigation returns the
//! directory to list, and the listing comes back through `apply_listing`.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::is_supported;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// What opening the selected entry asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Open {
    Dir(PathBuf),
    File(PathBuf),
}

/// List `dir`: directories first, then case-insensitive name order. Files
/// are limited to supported formats.
pub fn read_dir_filtered(dir: &Path, show_hidden: bool) -> Result<Vec<FileEntry>> {
    let mut entries: Vec<FileEntry> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if !show_hidden && name.starts_with('.') {
                return None;
            }
            let path = e.path();
            // Follow symlinks so linked directories stay browsable.
            let is_dir = path.is_dir();
            if !is_dir && !is_supported(&path) {
                return None;
            }
            Some(FileEntry { name, path, is_dir })
        })
        .collect();
    entries.sort_by(compare_entries);
    Ok(entries)
}

fn compare_entries(a: &FileEntry, b: &FileEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

#[derive(Debug, Clone)]
pub struct FileBrowser {
    dir: PathBuf,
    entries: Vec<FileEntry>,
    selected: usize,
    show_hidden: bool,
    /// Directory of the last listing asked for; other listings are stale.
    requested: PathBuf,
    /// Entry name to select once the next listing arrives.
    reselect: Option<String>,
}

impl FileBrowser {
    pub fn new(start: &Path) -> Self {
        let dir = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
        Self {
            requested: dir.clone(),
            dir,
            entries: Vec::new(),
            selected: 0,
            show_hidden: false,
            reselect: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.entries.get(self.selected)
    }

    /// Whether `dir` is the directory the browser is waiting on.
    pub fn is_requested(&self, dir: &Path) -> bool {
        self.requested == dir
    }

    /// Install a listing of `dir`. A new directory resets the cursor, or puts
    /// it on the child we just came up from. Listings of any directory but
    /// the last one requested are dropped.
    pub fn apply_listing(&mut self, dir: PathBuf, entries: Vec<FileEntry>) -> bool {
        if !self.is_requested(&dir) {
            log::debug!("dropping stale listing of {}", dir.display());
            return false;
        }
        let moved = dir != self.dir;
        self.dir = dir;
        self.entries = entries;
        let wanted = self.reselect.take();
        if moved {
            self.selected = wanted
                .and_then(|name| self.entries.iter().position(|e| e.name == name))
                .unwrap_or(0);
        }
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        true
    }

    /// Enter the selected directory or pick the selected file.
    pub fn open(&mut self) -> Option<Open> {
        let entry = self.selected_entry()?;
        if entry.is_dir {
            let dir = entry.path.clone();
            self.reselect = None;
            self.requested = dir.clone();
            Some(Open::Dir(dir))
        } else {
            Some(Open::File(entry.path.clone()))
        }
    }

    /// Directory to list when going up, or `None` at the filesystem root.
    pub fn parent(&mut self) -> Option<PathBuf> {
        let parent = self.dir.parent()?.to_path_buf();
        self.reselect = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.requested = parent.clone();
        Some(parent)
    }

    /// Flip hidden-file visibility; the current directory must be re-listed.
    pub fn toggle_hidden(&mut self) -> PathBuf {
        self.show_hidden = !self.show_hidden;
        self.requested = self.dir.clone();
        self.dir.clone()
    }

    pub fn move_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn move_down(&mut self, n: usize) {
        let last = self.entries.len().saturating_sub(1);
        self.selected = self.selected.saturating_add(n).min(last);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.entries.len().saturating_sub(1);
    }
}
