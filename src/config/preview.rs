//! Preview pane settings for ncview.

use crate::core::handlers::{DEFAULT_CSV_ROWS, DEFAULT_MAX_LINES, RenderOptions};
use crate::core::loader::DEFAULT_MAX_BYTES;
use crate::core::registry::DEFAULT_PEEK_BYTES;

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Pane shown at startup.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaneSetting {
    #[default]
    Split,
    Hidden,
}

/// Raw `[preview]` table.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Preview {
    pane: PaneSetting,
    debounce_ms: u64,
    binary_peek_bytes: usize,
    max_bytes: u64,
    max_lines: usize,
    csv_rows: usize,
}

impl Default for Preview {
    fn default() -> Self {
        Preview {
            pane: PaneSetting::Split,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            binary_peek_bytes: DEFAULT_PEEK_BYTES,
            max_bytes: DEFAULT_MAX_BYTES,
            max_lines: DEFAULT_MAX_LINES,
            csv_rows: DEFAULT_CSV_ROWS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PreviewSettings {
    pane: PaneSetting,
    debounce: Duration,
    peek_bytes: usize,
    max_bytes: u64,
    render: RenderOptions,
}

impl From<Preview> for PreviewSettings {
    fn from(p: Preview) -> Self {
        Self {
            pane: p.pane,
            debounce: Duration::from_millis(p.debounce_ms),
            // a zero peek would classify everything as text
            peek_bytes: p.binary_peek_bytes.max(1),
            max_bytes: p.max_bytes.max(1),
            render: RenderOptions {
                max_lines: p.max_lines.max(1),
                csv_rows: p.csv_rows,
            },
        }
    }
}

impl PreviewSettings {
    #[inline]
    pub fn pane(&self) -> PaneSetting {
        self.pane
    }

    #[inline]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    #[inline]
    pub fn peek_bytes(&self) -> usize {
        self.peek_bytes
    }

    #[inline]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    #[inline]
    pub fn render_options(&self) -> RenderOptions {
        self.render
    }
}
