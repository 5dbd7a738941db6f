//! Navigation state and entry list logic for ncview.
//!
//! Holds the current directory, its accepted scan snapshot and the selection. A
//! directory change is two-phase: [NavState::begin_change] records where we are going
//! and [NavState::apply_scan] swaps in the listing once the scan is accepted. Until then
//! the previous listing stays visible.

use crate::core::DirectoryEntry;

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct PendingChange {
    dir: PathBuf,
    focus: Option<OsString>,
}

/// Holds the navigation, selection and entry list state.
#[derive(Debug)]
pub struct NavState {
    current_dir: PathBuf,
    entries: Vec<DirectoryEntry>,
    selected: usize,
    positions: HashMap<PathBuf, OsString>,
    pending: Option<PendingChange>,
}

impl NavState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            current_dir: path,
            entries: Vec::new(),
            selected: 0,
            positions: HashMap::new(),
            pending: None,
        }
    }

    // Getters / Accessors

    #[inline]
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    #[inline]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    #[inline]
    pub fn selected_idx(&self) -> usize {
        self.selected
    }

    /// Directory of the scan in flight, if any.
    #[inline]
    pub fn pending_dir(&self) -> Option<&Path> {
        self.pending.as_ref().map(|p| p.dir.as_path())
    }

    pub fn selected_entry(&self) -> Option<&DirectoryEntry> {
        self.entries.get(self.selected)
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected_entry().map(|e| e.path().to_path_buf())
    }

    /// Returns `(dirs, files)` of the current listing.
    pub fn counts(&self) -> (usize, usize) {
        let dirs = self.entries.iter().filter(|e| e.is_dir()).count();
        (dirs, self.entries.len() - dirs)
    }

    // Selection

    /// Moves the selection up by one entry, wrapping around.
    /// Returns `false` if there are no entries.
    pub fn move_up(&mut self) -> bool {
        let len = self.entries.len();
        if len == 0 {
            return false;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
        true
    }

    /// Moves the selection down by one entry, wrapping around.
    pub fn move_down(&mut self) -> bool {
        let len = self.entries.len();
        if len == 0 {
            return false;
        }
        self.selected = (self.selected + 1) % len;
        true
    }

    pub fn move_to_top(&mut self) -> bool {
        let moved = self.selected != 0;
        self.selected = 0;
        moved
    }

    pub fn move_to_bottom(&mut self) -> bool {
        let last = self.entries.len().saturating_sub(1);
        let moved = self.selected != last;
        self.selected = last;
        moved
    }

    /// Selects the next entry whose name contains `query` (case-insensitive),
    /// starting at the current selection and wrapping around.
    pub fn jump_to_match(&mut self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() || self.entries.is_empty() {
            return false;
        }
        let len = self.entries.len();
        let found = (0..len)
            .map(|offset| (self.selected + offset) % len)
            .find(|&idx| self.entries[idx].lowercase_name().contains(&needle));
        match found {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    /// Selects the entry named `name`, if present.
    pub fn focus_name(&mut self, name: &OsStr) -> bool {
        match self.entries.iter().position(|e| e.name() == name) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    // Directory changes

    /// Records a pending change to `dir`. The current listing stays until the scan lands.
    /// `focus` names the entry to select once it does.
    pub fn begin_change(&mut self, dir: PathBuf, focus: Option<OsString>) {
        self.save_position();
        self.pending = Some(PendingChange { dir, focus });
    }

    /// Installs an accepted scan. Selection prefers the pending focus, then the entry that
    /// was selected when `dir` was last left, then the first entry.
    pub fn apply_scan(&mut self, dir: PathBuf, entries: Vec<DirectoryEntry>) {
        let focus = match self.pending.take() {
            Some(p) if p.dir == dir => p.focus,
            _ => None,
        };
        let remembered = focus.or_else(|| self.positions.get(&dir).cloned());

        self.current_dir = dir;
        self.entries = entries;
        self.selected = 0;
        if let Some(name) = remembered {
            self.focus_name(&name);
        }
    }

    /// Drops the pending change after a failed scan. Visible state is untouched.
    pub fn fail_pending(&mut self) -> Option<PathBuf> {
        self.pending.take().map(|p| p.dir)
    }

    fn save_position(&mut self) {
        if let Some(entry) = self.entries.get(self.selected) {
            self.positions
                .insert(self.current_dir.clone(), entry.name().to_os_string());
        }
    }
}
