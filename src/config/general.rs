//! General listing settings for ncview.
//!
//! [General] is deserialized from the `[general]` table and converted into
//! [InternalGeneral], which also resolves the editor command.

use crate::config::Editor;
use crate::core::{ScanOptions, SortKey};

use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    show_hidden: bool,
    sort: SortKey,
    dirs_first: bool,
    editor: Option<String>,
}

impl Default for General {
    fn default() -> Self {
        General {
            show_hidden: false,
            sort: SortKey::Name,
            dirs_first: false,
            editor: None,
        }
    }
}

#[derive(Debug)]
pub struct InternalGeneral {
    scan: ScanOptions,
    editor: Editor,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        let editor = g
            .editor
            .filter(|cmd| !cmd.trim().is_empty())
            .or_else(|| std::env::var("EDITOR").ok())
            .map(Editor::new)
            .unwrap_or_default();
        Self {
            scan: ScanOptions {
                show_hidden: g.show_hidden,
                sort: g.sort,
                dirs_first: g.dirs_first,
            },
            editor,
        }
    }
}

impl InternalGeneral {
    /// Initial filter and ordering for directory scans.
    #[inline]
    pub fn scan_options(&self) -> ScanOptions {
        self.scan
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.scan.show_hidden
    }

    #[inline]
    pub fn sort(&self) -> SortKey {
        self.scan.sort
    }

    #[inline]
    pub fn dirs_first(&self) -> bool {
        self.scan.dirs_first
    }

    #[inline]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }
}
