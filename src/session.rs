//! Session persistence for ncview.
//!
//! Stores pinned directories, the visited-directory history and the last directory in
//! the config directory:
//! - `pins.json`: list of `{ "path": ..., "name": ... }`. Older files holding a list of
//!   bare path strings are still accepted.
//! - `history.json`: list of paths, most recent first
//! - `last_dir`: a single path
//!
//! Stored paths are canonicalized so the same location reached through different
//! symlinks is deduplicated. Reads are tolerant: a missing or corrupt file is treated as
//! empty. Writes report their errors.

use crate::error::Result;
use crate::utils::config_dir;

use serde::{Deserialize, Serialize};

use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_HISTORY: usize = 25;

const PINS_FILE: &str = "pins.json";
const HISTORY_FILE: &str = "history.json";
const LAST_DIR_FILE: &str = "last_dir";

/// A pinned directory with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub path: PathBuf,
    pub name: String,
}

impl Pin {
    /// Display name defaults to the last path component.
    pub fn new(path: PathBuf, name: Option<String>) -> Self {
        let name = name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        });
        Self { path, name }
    }
}

/// On-disk pin entry. Bare strings come from the older pins format.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPin {
    Full { path: PathBuf, name: Option<String> },
    Bare(PathBuf),
}

impl From<StoredPin> for Pin {
    fn from(stored: StoredPin) -> Self {
        match stored {
            StoredPin::Full { path, name } => Pin::new(path, name),
            StoredPin::Bare(path) => Pin::new(path, None),
        }
    }
}

/// File-backed store for pins, history and the last directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the resolved config directory.
    pub fn open_default() -> Self {
        Self::new(config_dir())
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Pins

    pub fn load_pins(&self) -> Vec<Pin> {
        self.read_json::<Vec<StoredPin>>(PINS_FILE)
            .unwrap_or_default()
            .into_iter()
            .map(Pin::from)
            .collect()
    }

    pub fn save_pins(&self, pins: &[Pin]) -> Result<()> {
        self.write_json(PINS_FILE, &pins)
    }

    /// Pins `path`. Returns true when an existing pin for the same location was replaced.
    pub fn add_pin(&self, path: &Path, name: Option<String>) -> Result<bool> {
        let resolved = resolve_path(path);
        let mut pins = self.load_pins();
        let before = pins.len();
        pins.retain(|p| resolve_path(&p.path) != resolved);
        let replaced = pins.len() != before;
        pins.push(Pin::new(resolved, name));
        self.save_pins(&pins)?;
        Ok(replaced)
    }

    /// Removes the pin for `path`. Returns false if it was not pinned.
    pub fn remove_pin(&self, path: &Path) -> Result<bool> {
        let resolved = resolve_path(path);
        let mut pins = self.load_pins();
        let before = pins.len();
        pins.retain(|p| resolve_path(&p.path) != resolved);
        if pins.len() == before {
            return Ok(false);
        }
        self.save_pins(&pins)?;
        Ok(true)
    }

    pub fn is_pinned(&self, path: &Path) -> bool {
        let resolved = resolve_path(path);
        self.load_pins()
            .iter()
            .any(|p| resolve_path(&p.path) == resolved)
    }

    // History

    pub fn load_history(&self) -> Vec<PathBuf> {
        self.read_json(HISTORY_FILE).unwrap_or_default()
    }

    /// Moves `path` to the front of the history, deduplicated and capped at [MAX_HISTORY].
    pub fn append_history(&self, path: &Path) -> Result<()> {
        let resolved = resolve_path(path);
        let mut history = self.load_history();
        history.retain(|p| *p != resolved);
        history.insert(0, resolved);
        history.truncate(MAX_HISTORY);
        self.write_json(HISTORY_FILE, &history)
    }

    // Last directory

    pub fn save_last_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let resolved = resolve_path(path);
        fs::write(
            self.dir.join(LAST_DIR_FILE),
            resolved.to_string_lossy().as_bytes(),
        )?;
        Ok(())
    }

    pub fn load_last_dir(&self) -> Option<PathBuf> {
        let raw = fs::read_to_string(self.dir.join(LAST_DIR_FILE)).ok()?;
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.dir.join(file), json)?;
        Ok(())
    }
}

/// Canonical form used for deduplication. Paths that cannot be canonicalized
/// (already deleted, unreadable parent) fall back to their absolute form.
pub fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_store_loads_nothing() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = SessionStore::new(dir.path().join("cfg"));
        assert!(store.load_pins().is_empty());
        assert!(store.load_history().is_empty());
        assert_eq!(store.load_last_dir(), None);
        Ok(())
    }

    #[test]
    fn pins_are_deduplicated_by_resolved_path() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        let target = dir.path().join("data");
        fs::create_dir(&target)?;
        let store = SessionStore::new(dir.path().join("cfg"));

        assert!(!store.add_pin(&target, None)?);
        assert!(store.add_pin(&target.join("."), Some("renamed".into()))?);

        let pins = store.load_pins();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].name, "renamed");
        assert!(store.is_pinned(&target));

        assert!(store.remove_pin(&target)?);
        assert!(!store.remove_pin(&target)?);
        assert!(store.load_pins().is_empty());
        Ok(())
    }

    #[test]
    fn default_pin_name_is_last_component() {
        let pin = Pin::new(PathBuf::from("/srv/datasets"), None);
        assert_eq!(pin.name, "datasets");
        let pin = Pin::new(PathBuf::from("/srv/datasets"), Some("  ".into()));
        assert_eq!(pin.name, "datasets");
    }

    #[test]
    fn history_is_most_recent_first_and_capped() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        let store = SessionStore::new(dir.path().join("cfg"));
        let mut dirs = Vec::new();
        for i in 0..30 {
            let d = dir.path().join(format!("d{i}"));
            fs::create_dir(&d)?;
            store.append_history(&d)?;
            dirs.push(d);
        }
        let history = store.load_history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0], fs::canonicalize(&dirs[29])?);

        store.append_history(&dirs[20])?;
        let history = store.load_history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0], fs::canonicalize(&dirs[20])?);
        assert_eq!(
            history.iter().filter(|p| **p == history[0]).count(),
            1,
            "history must not contain duplicates"
        );
        Ok(())
    }

    #[test]
    fn last_dir_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = SessionStore::new(dir.path().join("cfg"));
        store.save_last_dir(dir.path())?;
        assert_eq!(store.load_last_dir(), Some(fs::canonicalize(dir.path())?));
        Ok(())
    }

    #[test]
    fn legacy_bare_string_pins_are_accepted() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        fs::write(
            dir.path().join(PINS_FILE),
            r#"["/srv/a", {"path": "/srv/b", "name": "bee"}, {"path": "/srv/c"}]"#,
        )?;
        let store = SessionStore::new(dir.path());
        let pins = store.load_pins();

        assert_eq!(
            pins,
            vec![
                Pin::new(PathBuf::from("/srv/a"), None),
                Pin::new(PathBuf::from("/srv/b"), Some("bee".into())),
                Pin::new(PathBuf::from("/srv/c"), None),
            ]
        );
        assert_eq!(pins[0].name, "a");

        // rewriting upgrades the file to the full format
        store.save_pins(&pins)?;
        let raw = fs::read_to_string(dir.path().join(PINS_FILE))?;
        assert!(raw.contains(r#""name": "a""#));
        Ok(())
    }

    #[test]
    fn corrupt_file_reads_as_empty() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join(PINS_FILE), "{not json")?;
        let store = SessionStore::new(dir.path());
        assert!(store.load_pins().is_empty());
        Ok(())
    }
}
