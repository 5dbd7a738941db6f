//! File operation worker for ncview.
//!
//! Rename, mkdir, touch, delete and shell commands run on their own thread so the
//! coordinating thread never blocks on them. Each [FileOperation] produces exactly one
//! [FileOpResult] carrying a status message and, where it makes sense, the name the
//! listing should focus after the rescan.

use crate::utils::get_unused_path;

use crossbeam_channel::{Receiver, Sender, unbounded};

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::thread;

/// Supported file system operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    Rename { old: PathBuf, new: PathBuf },
    Create { path: PathBuf, is_dir: bool },
    /// Moves the paths to the system trash.
    Delete(Vec<PathBuf>),
    /// Runs `command` through `sh -c` inside `cwd`.
    Shell { command: String, cwd: PathBuf },
}

/// Completion of one [FileOperation].
#[derive(Debug)]
pub struct FileOpResult {
    pub outcome: Result<String, String>,
    pub focus: Option<OsString>,
}

/// Handle to the file operation worker thread.
pub struct FileOps {
    task_tx: Sender<FileOperation>,
    result_rx: Receiver<FileOpResult>,
}

impl FileOps {
    pub fn spawn() -> Self {
        let (task_tx, task_rx) = unbounded::<FileOperation>();
        let (res_tx, result_rx) = unbounded::<FileOpResult>();
        start_fileop_worker(task_rx, res_tx);
        Self { task_tx, result_rx }
    }

    pub fn submit(&self, op: FileOperation) {
        tracing::debug!(?op, "file operation");
        if self.task_tx.send(op).is_err() {
            tracing::warn!("file operation worker is gone");
        }
    }

    pub fn results(&self) -> &Receiver<FileOpResult> {
        &self.result_rx
    }
}

/// File operations are never coalesced: every queued task runs in order.
fn start_fileop_worker(task_rx: Receiver<FileOperation>, res_tx: Sender<FileOpResult>) {
    thread::spawn(move || {
        while let Ok(op) = task_rx.recv() {
            let result = run_operation(op);
            if let Err(e) = &result.outcome {
                tracing::warn!(error = %e, "file operation failed");
            }
            if res_tx.send(result).is_err() {
                break;
            }
        }
    });
}

/// Executes one operation synchronously.
pub fn run_operation(op: FileOperation) -> FileOpResult {
    let mut focus = None;
    let outcome = match op {
        FileOperation::Rename { old, new } => {
            if new.exists() {
                Err(format!(
                    "Rename failed: '{}' already exists",
                    new.file_name().unwrap_or_default().to_string_lossy()
                ))
            } else {
                focus = new.file_name().map(|n| n.to_os_string());
                fs::rename(&old, &new)
                    .map(|_| "Renamed".to_string())
                    .map_err(|e| format!("Rename failed: {e}"))
            }
        }
        FileOperation::Create { path, is_dir } => {
            let target = get_unused_path(&path);
            focus = target.file_name().map(|n| n.to_os_string());
            let res = if is_dir {
                fs::create_dir_all(&target)
            } else {
                fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&target)
                    .map(|_| ())
            };
            res.map(|_| "Created".to_string())
                .map_err(|e| format!("Create failed: {e}"))
        }
        FileOperation::Delete(paths) => {
            let count = paths.len();
            trash::delete_all(&paths)
                .map(|_| format!("Moved {count} item(s) to trash"))
                .map_err(|e| format!("Delete failed: {e}"))
        }
        FileOperation::Shell { command, cwd } => run_shell(&command, cwd),
    };
    FileOpResult { outcome, focus }
}

fn run_shell(command: &str, cwd: PathBuf) -> Result<String, String> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .output()
        .map_err(|e| format!("Shell failed: {e}"))?;

    let last_line = |bytes: &[u8]| {
        String::from_utf8_lossy(bytes)
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
    };

    if output.status.success() {
        Ok(last_line(&output.stdout).unwrap_or_else(|| "Command finished".to_string()))
    } else {
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let detail = last_line(&output.stderr).or_else(|| last_line(&output.stdout));
        Err(match detail {
            Some(d) => format!("Command failed ({code}): {d}"),
            None => format!("Command failed ({code})"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn create_file_and_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("touch.txt");

        let res = run_operation(FileOperation::Create {
            path: file.clone(),
            is_dir: false,
        });
        assert_eq!(res.outcome, Ok("Created".to_string()));
        assert!(file.is_file());

        // second create picks an unused name
        let res = run_operation(FileOperation::Create {
            path: file.clone(),
            is_dir: false,
        });
        assert_eq!(res.focus, Some(OsString::from("touch_1.txt")));

        let res = run_operation(FileOperation::Create {
            path: dir.path().join("sub"),
            is_dir: true,
        });
        assert!(res.outcome.is_ok());
        assert!(dir.path().join("sub").is_dir());
        Ok(())
    }

    #[test]
    fn rename_refuses_to_overwrite() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "a")?;
        fs::write(&b, "b")?;

        let res = run_operation(FileOperation::Rename {
            old: a.clone(),
            new: b.clone(),
        });
        assert!(res.outcome.is_err());
        assert_eq!(fs::read_to_string(&b)?, "b");

        let c = dir.path().join("c.txt");
        let res = run_operation(FileOperation::Rename {
            old: a.clone(),
            new: c.clone(),
        });
        assert!(res.outcome.is_ok());
        assert_eq!(res.focus, Some(OsString::from("c.txt")));
        assert!(!a.exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn shell_reports_last_line() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let res = run_operation(FileOperation::Shell {
            command: "echo one; echo two; touch made.txt".into(),
            cwd: dir.path().to_path_buf(),
        });
        assert_eq!(res.outcome, Ok("two".to_string()));
        assert!(dir.path().join("made.txt").exists());

        let res = run_operation(FileOperation::Shell {
            command: "echo broken >&2; exit 3".into(),
            cwd: dir.path().to_path_buf(),
        });
        assert_eq!(res.outcome, Err("Command failed (3): broken".to_string()));
        Ok(())
    }

    #[test]
    fn worker_runs_operations_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let ops = FileOps::spawn();
        ops.submit(FileOperation::Create {
            path: dir.path().join("first"),
            is_dir: true,
        });
        ops.submit(FileOperation::Create {
            path: dir.path().join("second.txt"),
            is_dir: false,
        });

        let first = ops.results().recv_timeout(Duration::from_secs(2))?;
        let second = ops.results().recv_timeout(Duration::from_secs(2))?;
        assert_eq!(first.focus, Some(OsString::from("first")));
        assert_eq!(second.focus, Some(OsString::from("second.txt")));
        Ok(())
    }
}
