//! Directory scanning for ncview.
//!
//! Provides the [DirectoryEntry] snapshot used throughout ncview and the [scan_dir]
//! function the scan worker calls. Scanning is synchronous and has no concurrency of its
//! own; the [crate::core::loader] moves it off the coordinating thread.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::fs::{self, DirEntry, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Deserialize;

/// Kind of a scanned entry. Symlinks keep their own kind; the target kind is stored
/// separately in [DirectoryEntry::points_to_dir].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// Sort key for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Modified,
}

impl SortKey {
    /// Next key in the name → size → modified cycle.
    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::Size,
            SortKey::Size => SortKey::Modified,
            SortKey::Modified => SortKey::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Size => "size",
            SortKey::Modified => "modified",
        }
    }
}

/// Filter and ordering settings handed to [scan_dir].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    pub show_hidden: bool,
    pub sort: SortKey,
    pub dirs_first: bool,
}

/// Immutable snapshot of one directory child.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    path: PathBuf,
    name: Box<OsStr>,
    lowercase_name: Box<str>,
    kind: EntryKind,
    points_to_dir: bool,
    size: u64,
    modified: Option<SystemTime>,
    symlink_target: Option<PathBuf>,
    permissions: Option<u32>,
    degraded: bool,
}

impl DirectoryEntry {
    pub fn new(path: PathBuf, kind: EntryKind, size: u64, modified: Option<SystemTime>) -> Self {
        let name: OsString = path.file_name().map(OsStr::to_os_string).unwrap_or_default();
        let lowercase_name = name.to_string_lossy().to_lowercase().into_boxed_str();
        Self {
            path,
            name: name.into_boxed_os_str(),
            lowercase_name,
            kind,
            points_to_dir: kind == EntryKind::Directory,
            size,
            modified,
            symlink_target: None,
            permissions: None,
            degraded: false,
        }
    }

    /// Entry whose metadata could not be read. Shown by name only.
    pub fn placeholder(path: PathBuf, kind: EntryKind) -> Self {
        let mut entry = Self::new(path, kind, 0, None);
        entry.degraded = true;
        entry
    }

    fn with_symlink_target(mut self, target: Option<PathBuf>) -> Self {
        self.symlink_target = target;
        self
    }

    fn with_permissions(mut self, mode: Option<u32>) -> Self {
        self.permissions = mode;
        self
    }

    // Accessors

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    #[inline]
    pub fn name_str(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    #[inline]
    pub fn lowercase_name(&self) -> &str {
        &self.lowercase_name
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// True for directories and for symlinks resolving to a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.points_to_dir
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.lowercase_name.starts_with('.')
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    #[inline]
    pub fn symlink_target(&self) -> Option<&Path> {
        self.symlink_target.as_deref()
    }

    #[inline]
    pub fn permissions(&self) -> Option<u32> {
        self.permissions
    }

    /// Metadata could not be read (broken symlink, vanished file, ...).
    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Lists the immediate children of `dir`, filtered and sorted according to `options`.
///
/// Only a failure to open the directory itself is an error. Per-entry metadata failures
/// degrade that entry to a placeholder.
pub fn scan_dir(dir: &Path, options: ScanOptions) -> io::Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::with_capacity(256);

    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        let scanned = read_entry(&entry);
        if !options.show_hidden && scanned.is_hidden() {
            continue;
        }
        entries.push(scanned);
    }

    sort_entries(&mut entries, options);
    Ok(entries)
}

fn read_entry(entry: &DirEntry) -> DirectoryEntry {
    let path = entry.path();
    let Ok(file_type) = entry.file_type() else {
        return DirectoryEntry::placeholder(path, EntryKind::File);
    };

    if file_type.is_symlink() {
        let target = fs::read_link(&path).ok();
        // Follow one hop for kind and size only, never recurse.
        return match fs::metadata(&path) {
            Ok(md) => {
                let mut scanned = from_metadata(path, EntryKind::Symlink, &md);
                scanned.points_to_dir = md.is_dir();
                scanned.with_symlink_target(target)
            }
            Err(_) => {
                DirectoryEntry::placeholder(path, EntryKind::Symlink).with_symlink_target(target)
            }
        };
    }

    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    match entry.metadata() {
        Ok(md) => from_metadata(path, kind, &md),
        Err(_) => DirectoryEntry::placeholder(path, kind),
    }
}

fn from_metadata(path: PathBuf, kind: EntryKind, md: &Metadata) -> DirectoryEntry {
    // Directory sizes are filesystem block noise, so they sort as empty.
    let size = if md.is_dir() { 0 } else { md.len() };
    DirectoryEntry::new(path, kind, size, md.modified().ok()).with_permissions(mode_bits(md))
}

#[cfg(unix)]
fn mode_bits(md: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(md.permissions().mode())
}

#[cfg(not(unix))]
fn mode_bits(_md: &Metadata) -> Option<u32> {
    None
}

/// Sorts entries in place. Name order is case-insensitive; size and modified are
/// descending with the name order as tiebreak.
pub fn sort_entries(entries: &mut [DirectoryEntry], options: ScanOptions) {
    entries.sort_by(|a, b| {
        if options.dirs_first {
            match (a.is_dir(), b.is_dir()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }
        let primary = match options.sort {
            SortKey::Name => Ordering::Equal,
            SortKey::Size => b.size.cmp(&a.size),
            // None sorts last
            SortKey::Modified => b.modified.cmp(&a.modified),
        };
        primary.then_with(|| compare_names(a, b))
    });
}

fn compare_names(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    a.lowercase_name
        .cmp(&b.lowercase_name)
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::tempdir;

    fn names(entries: &[DirectoryEntry]) -> Vec<String> {
        entries.iter().map(|e| e.name_str().into_owned()).collect()
    }

    #[test]
    fn scan_sorts_by_name_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("b.txt"))?;
        File::create(dir.path().join("A.txt"))?;
        fs::create_dir(dir.path().join("c"))?;

        let opts = ScanOptions::default();
        let entries = scan_dir(dir.path(), opts)?;
        assert_eq!(names(&entries), vec!["A.txt", "b.txt", "c"]);

        let by_size = scan_dir(
            dir.path(),
            ScanOptions {
                sort: SortKey::Size,
                ..opts
            },
        )?;
        assert_eq!(names(&by_size), vec!["A.txt", "b.txt", "c"]);
        Ok(())
    }

    #[test]
    fn scan_sorts_by_size_descending() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("small.txt"), "a")?;
        fs::write(dir.path().join("big.txt"), "aaaaaaaaaa")?;
        fs::write(dir.path().join("mid.txt"), "aaaaa")?;

        let entries = scan_dir(
            dir.path(),
            ScanOptions {
                sort: SortKey::Size,
                ..ScanOptions::default()
            },
        )?;
        assert_eq!(names(&entries), vec!["big.txt", "mid.txt", "small.txt"]);
        Ok(())
    }

    #[test]
    fn sort_by_modified_newest_first() {
        let now = SystemTime::now();
        let mut entries = vec![
            DirectoryEntry::new(PathBuf::from("/d/old"), EntryKind::File, 1, Some(now)),
            DirectoryEntry::new(
                PathBuf::from("/d/new"),
                EntryKind::File,
                1,
                Some(now + Duration::from_secs(60)),
            ),
            DirectoryEntry::placeholder(PathBuf::from("/d/broken"), EntryKind::Symlink),
        ];
        sort_entries(
            &mut entries,
            ScanOptions {
                sort: SortKey::Modified,
                ..ScanOptions::default()
            },
        );
        assert_eq!(names(&entries), vec!["new", "old", "broken"]);
    }

    #[test]
    fn scan_filters_hidden() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join(".secret"))?;
        File::create(dir.path().join("visible"))?;

        let hidden_off = scan_dir(dir.path(), ScanOptions::default())?;
        assert_eq!(names(&hidden_off), vec!["visible"]);

        let hidden_on = scan_dir(
            dir.path(),
            ScanOptions {
                show_hidden: true,
                ..ScanOptions::default()
            },
        )?;
        assert_eq!(names(&hidden_on), vec![".secret", "visible"]);
        Ok(())
    }

    #[test]
    fn dirs_first_groups_directories() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("a.txt"))?;
        fs::create_dir(dir.path().join("zdir"))?;

        let entries = scan_dir(
            dir.path(),
            ScanOptions {
                dirs_first: true,
                ..ScanOptions::default()
            },
        )?;
        assert_eq!(names(&entries), vec!["zdir", "a.txt"]);
        assert!(entries[0].is_dir());
        Ok(())
    }

    #[test]
    fn scan_records_size_and_metadata() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut file = File::create(dir.path().join("data.csv"))?;
        writeln!(file, "a,b,c")?;

        let entries = scan_dir(dir.path(), ScanOptions::default())?;
        let entry = &entries[0];
        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.size(), 6);
        assert!(entry.modified().is_some());
        assert_eq!(entry.path(), dir.path().join("data.csv"));
        assert!(!entry.is_degraded());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_degrades_to_placeholder() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("real.txt"))?;
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling"))?;
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link"))?;

        let entries = scan_dir(dir.path(), ScanOptions::default())?;
        assert_eq!(names(&entries), vec!["dangling", "link", "real.txt"]);

        let dangling = &entries[0];
        assert!(dangling.is_symlink());
        assert!(dangling.is_degraded());
        assert_eq!(dangling.symlink_target(), Some(dir.path().join("missing").as_path()));

        let link = &entries[1];
        assert!(link.is_symlink());
        assert!(!link.is_degraded());
        assert!(!link.is_dir());
        Ok(())
    }

    #[test]
    fn scan_nonexistent_is_error() {
        let result = scan_dir(Path::new("/path/does/not/exist"), ScanOptions::default());
        assert!(result.is_err());
    }
}
