//! Helpers for ncview.
//!
//! - Resolving the config directory used for `ncview.toml`, session files and the log
//! - Opening paths/files in the user's chosen editor
//! - Generating unused filenames to prevent accidental overwrite
//! - Displaying home directories as "~" in file paths
//! - Resolving the directory ncview starts in

use crate::config::Editor;
use crate::error::{NcviewError, Result};

use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Directory holding `ncview.toml`, `pins.json`, `history.json`, `last_dir` and `ncview.log`.
///
/// Resolution order: `NCVIEW_CONFIG_DIR`, `$XDG_CONFIG_HOME/ncview`, `~/.config/ncview`.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NCVIEW_CONFIG_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg).join("ncview");
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join("ncview"))
        .unwrap_or_else(|| PathBuf::from(".ncview"))
}

/// Opens a path/file in the configured editor ("nvim", "code --wait", ...).
///
/// Temporarily disables raw mode and leaves the alternate screen while the editor runs.
/// On return, restores raw mode and the alternate screen.
pub fn open_in_editor(editor: &Editor, file_path: &Path) -> io::Result<()> {
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };

    let mut parts = editor.cmd().split_whitespace();
    let program = parts.next().unwrap_or("vim");

    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    let status = std::process::Command::new(program)
        .args(parts)
        .arg(file_path)
        .status();

    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => Err(io::Error::other(format!("{program} exited with {s}"))),
        Err(e) => Err(e),
    }
}

/// Finds the next available filename by appending _1, _2, etc. if the target exists
///
/// Example: "notes.txt" -> "notes_1.txt"
pub fn get_unused_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name = path.file_name().unwrap_or_default();
    let stem = Path::new(name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let ext = Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| parent.join(format!("{stem}_{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Shortens the home directory prefix to "~" for display.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }
        let mut short = stripped.display().to_string();
        if short.starts_with(MAIN_SEPARATOR) {
            short.remove(0);
        }
        return format!("~{MAIN_SEPARATOR}{short}");
    }
    path.display().to_string()
}

/// Resolves the startup directory: `arg` if given, else the current directory.
/// The result is absolute and must be an existing directory.
pub fn resolve_start_dir(arg: Option<&str>) -> Result<PathBuf> {
    let raw = match arg {
        Some(a) => PathBuf::from(a),
        None => std::env::current_dir()?,
    };
    let abs = std::path::absolute(&raw)?;
    if !abs.exists() {
        return Err(NcviewError::startup_path(&abs, "no such directory"));
    }
    if !abs.is_dir() {
        return Err(NcviewError::startup_path(&abs, "not a directory"));
    }
    Ok(abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::error;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_path_collision_increments() -> std::result::Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("data.csv");

        assert_eq!(get_unused_path(&path), path);

        File::create(&path)?;
        assert_eq!(get_unused_path(&path), dir.path().join("data_1.csv"));

        File::create(dir.path().join("data_1.csv"))?;
        assert_eq!(get_unused_path(&path), dir.path().join("data_2.csv"));
        Ok(())
    }

    #[test]
    fn test_hidden_file_collision() -> std::result::Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join(".gitignore");

        File::create(&path)?;
        assert_eq!(get_unused_path(&path), dir.path().join(".gitignore_1"));
        Ok(())
    }

    #[test]
    fn test_get_unused_path_no_extension() -> std::result::Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let folder_path = dir.path().join("my_folder");

        File::create(&folder_path)?;
        let fname = get_unused_path(&folder_path)
            .file_name()
            .ok_or("No file name in path")?
            .to_string_lossy()
            .into_owned();
        assert_eq!(fname, "my_folder_1");
        Ok(())
    }

    #[test]
    fn test_get_unused_path_complex_extension() -> std::result::Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let tar_gz = dir.path().join("archive.tar.gz");

        File::create(&tar_gz)?;
        let name = get_unused_path(&tar_gz)
            .file_name()
            .ok_or("No file name in path")?
            .to_string_lossy()
            .into_owned();
        assert!(name.contains("_1"), "Suffix missing: got {:?}", name);
        Ok(())
    }

    #[test]
    fn test_resolve_start_dir() -> std::result::Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("plain.txt");
        File::create(&file)?;

        let resolved = resolve_start_dir(dir.path().to_str())?;
        assert!(resolved.is_absolute());
        assert!(resolved.is_dir());

        let err = resolve_start_dir(file.to_str());
        assert!(matches!(err, Err(NcviewError::StartupPath { .. })));

        let missing = dir.path().join("missing");
        let err = resolve_start_dir(missing.to_str());
        assert!(matches!(err, Err(NcviewError::StartupPath { .. })));
        Ok(())
    }

    #[test]
    fn test_shorten_home_path_outside_home() {
        let path = Path::new("/definitely/not/home");
        if dirs::home_dir().is_none_or(|h| !path.starts_with(h)) {
            assert_eq!(shorten_home_path(path), "/definitely/not/home");
        }
    }
}
