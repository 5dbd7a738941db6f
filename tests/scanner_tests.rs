use ncview_tui::core::{EntryKind, ScanOptions, SortKey, scan_dir};
use std::fs;
use tempfile::tempdir;

fn names(entries: &[ncview_tui::core::DirectoryEntry]) -> Vec<String> {
    entries.iter().map(|e| e.name_str().into_owned()).collect()
}

#[test]
fn mixed_case_listing_sorts_by_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("b.txt"), "bb")?;
    fs::write(dir.path().join("A.txt"), "a")?;
    fs::create_dir(dir.path().join("c"))?;

    let entries = scan_dir(dir.path(), ScanOptions::default())?;
    assert_eq!(names(&entries), ["A.txt", "b.txt", "c"]);
    assert_eq!(entries[2].kind(), EntryKind::Directory);
    Ok(())
}

#[test]
fn dirs_first_groups_directories() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("b.txt"), "bb")?;
    fs::write(dir.path().join("A.txt"), "a")?;
    fs::create_dir(dir.path().join("c"))?;

    let options = ScanOptions {
        dirs_first: true,
        ..ScanOptions::default()
    };
    let entries = scan_dir(dir.path(), options)?;
    assert_eq!(names(&entries), ["c", "A.txt", "b.txt"]);
    Ok(())
}

#[test]
fn size_sort_is_descending() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("small"), "1")?;
    fs::write(dir.path().join("large"), "1".repeat(100))?;
    fs::write(dir.path().join("medium"), "1".repeat(10))?;

    let options = ScanOptions {
        sort: SortKey::Size,
        ..ScanOptions::default()
    };
    let entries = scan_dir(dir.path(), options)?;
    assert_eq!(names(&entries), ["large", "medium", "small"]);
    Ok(())
}

#[test]
fn hidden_entries_follow_the_toggle() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join(".secret"), "")?;
    fs::write(dir.path().join("visible"), "")?;

    let hidden_off = scan_dir(dir.path(), ScanOptions::default())?;
    assert_eq!(names(&hidden_off), ["visible"]);

    let options = ScanOptions {
        show_hidden: true,
        ..ScanOptions::default()
    };
    let hidden_on = scan_dir(dir.path(), options)?;
    assert_eq!(hidden_on.len(), 2);
    Ok(())
}

#[test]
fn missing_directory_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    assert!(scan_dir(&dir.path().join("gone"), ScanOptions::default()).is_err());
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinks_keep_their_target() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("real"))?;
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link"))?;
    std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("broken"))?;

    let entries = scan_dir(dir.path(), ScanOptions::default())?;
    let link = entries
        .iter()
        .find(|e| e.name_str() == "link")
        .ok_or("link missing")?;
    assert!(link.is_symlink());
    assert!(link.is_dir());
    assert_eq!(link.symlink_target(), Some(dir.path().join("real").as_path()));

    let broken = entries
        .iter()
        .find(|e| e.name_str() == "broken")
        .ok_or("broken link missing")?;
    assert!(broken.is_degraded());
    Ok(())
}
