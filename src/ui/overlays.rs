//! Overlay module for the dialogs that sit on top of the panes.
//!
//! Handles the delete and unpin confirmations and the pins/history pickers. The app owns
//! at most one overlay at a time; keys go to it unless a prompt is open.

use crate::session::Pin;
use crate::utils::shorten_home_path;

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    pub label: String,
    pub path: PathBuf,
}

/// A selectable list of directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Picker {
    items: Vec<PickerItem>,
    selected: usize,
}

impl Picker {
    pub fn new(items: Vec<PickerItem>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn from_pins(pins: &[Pin]) -> Self {
        Self::new(
            pins.iter()
                .map(|p| PickerItem {
                    label: p.name.clone(),
                    path: p.path.clone(),
                })
                .collect(),
        )
    }

    pub fn from_history(history: &[PathBuf]) -> Self {
        Self::new(
            history
                .iter()
                .map(|p| PickerItem {
                    label: shorten_home_path(p),
                    path: p.clone(),
                })
                .collect(),
        )
    }

    #[inline]
    pub fn items(&self) -> &[PickerItem] {
        &self.items
    }

    #[inline]
    pub fn selected_idx(&self) -> usize {
        self.selected
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.items.get(self.selected).map(|i| i.path.as_path())
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.items.len() - 1);
        }
    }

    /// Moves the selection to the item for `path`, if present.
    pub fn select_path(&mut self, path: &Path) {
        if let Some(idx) = self.items.iter().position(|i| i.path == path) {
            self.selected = idx;
        }
    }

    /// Removes the selected item and returns its path.
    pub fn remove_selected(&mut self) -> Option<PathBuf> {
        if self.selected >= self.items.len() {
            return None;
        }
        let item = self.items.remove(self.selected);
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
        Some(item.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    ConfirmDelete { targets: Vec<PathBuf> },
    /// Asks before removing `pin`; `picker` is the pins list to return to.
    ConfirmUnpin { pin: Pin, picker: Picker },
    Pins(Picker),
    History(Picker),
}

impl Overlay {
    pub fn title(&self) -> &'static str {
        match self {
            Overlay::ConfirmDelete { .. } => " Confirm Delete ",
            Overlay::ConfirmUnpin { .. } => " Confirm Unpin ",
            Overlay::Pins(_) => " Pins ",
            Overlay::History(_) => " History ",
        }
    }

    pub fn picker_mut(&mut self) -> Option<&mut Picker> {
        match self {
            Overlay::Pins(p) | Overlay::History(p) => Some(p),
            Overlay::ConfirmDelete { .. } | Overlay::ConfirmUnpin { .. } => None,
        }
    }
}
