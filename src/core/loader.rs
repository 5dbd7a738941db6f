//! Background loading for ncview.
//!
//! The [Loader] owns the scan and read worker threads. Every submitted request is stamped
//! with a generation from the epoch guard of its class, and every result travels back over
//! a channel to the coordinating thread, which calls [Loader::accept] before applying it.
//! Only a result whose generation still equals the current one for its class is accepted.
//!
//! Requests of the same class supersede each other regardless of path: submitting a new
//! scan makes every earlier scan stale, and likewise for reads. Superseded requests also
//! have their cancel flag raised so a worker that has not started them yet can skip them.
//!
//! # Caution:
//! Workers never touch visible state. Failures are carried back as [LoadError] values
//! inside a [LoadResult]; nothing is allowed to panic across the thread boundary.

use crate::core::scan::{DirectoryEntry, ScanOptions, scan_dir};
use crate::error::LoadError;

use crossbeam_channel::{Receiver, Sender, unbounded};

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::SystemTime;

/// Default cap on the number of bytes a single read loads.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Bytes kept from the end of a truncated file, enough for formats with a trailing footer.
pub const TAIL_BYTES: u64 = 1024 * 1024;

/// Class of a request. Each class has its own generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Scan,
    Read,
}

/// A unit of background work.
#[derive(Debug, Clone)]
pub enum LoadRequest {
    Scan { path: PathBuf, options: ScanOptions },
    Read { path: PathBuf },
}

impl LoadRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            LoadRequest::Scan { .. } => RequestKind::Scan,
            LoadRequest::Read { .. } => RequestKind::Read,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            LoadRequest::Scan { path, .. } | LoadRequest::Read { path } => path,
        }
    }
}

/// Returned by [Loader::submit]. Identifies the request and allows explicit cancellation.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    kind: RequestKind,
    generation: u64,
    cancel: Arc<AtomicBool>,
}

impl LoadHandle {
    #[inline]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

/// Metadata captured next to the bytes of a read.
#[derive(Debug, Clone, Default)]
pub struct FileMeta {
    pub modified: Option<SystemTime>,
    pub permissions: Option<u32>,
    pub is_symlink: bool,
    pub symlink_target: Option<PathBuf>,
    /// Not a regular file (FIFO, socket, device). Its contents are never read.
    pub special: bool,
}

/// Payload of a successful read: the first `max_bytes` of the file plus its metadata.
///
/// When the file is truncated, `tail` holds up to [TAIL_BYTES] from its end and the
/// region between the two is not loaded.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub tail: Vec<u8>,
    pub total_size: u64,
    pub truncated: bool,
    pub meta: FileMeta,
}

impl FileContent {
    /// In-memory content, used by handlers and tests that have no file on disk.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            path: path.into(),
            total_size: bytes.len() as u64,
            bytes,
            tail: Vec::new(),
            truncated: false,
            meta: FileMeta::default(),
        }
    }

    /// File offset of the first byte of `tail`.
    #[inline]
    pub fn tail_offset(&self) -> u64 {
        self.total_size.saturating_sub(self.tail.len() as u64)
    }

    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

#[derive(Debug)]
pub enum LoadPayload {
    Entries(Vec<DirectoryEntry>),
    File(FileContent),
}

/// Completion of a [LoadRequest], consumed exactly once by the coordinating thread.
#[derive(Debug)]
pub struct LoadResult {
    pub kind: RequestKind,
    pub generation: u64,
    pub path: PathBuf,
    pub outcome: Result<LoadPayload, LoadError>,
}

struct Job {
    request: LoadRequest,
    generation: u64,
    cancel: Arc<AtomicBool>,
}

/// Monotonic generation counter for one request class.
#[derive(Debug, Default)]
struct EpochGuard {
    current: u64,
    cancel: Option<Arc<AtomicBool>>,
}

impl EpochGuard {
    /// Moves to the next generation and raises the cancel flag of the previous one.
    fn advance(&mut self) -> (u64, Arc<AtomicBool>) {
        if let Some(prev) = self.cancel.take() {
            prev.store(true, Ordering::Release);
        }
        self.current = self.current.wrapping_add(1);
        let flag = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&flag));
        (self.current, flag)
    }
}

/// Owner of the scan and read workers and of both epoch guards.
pub struct Loader {
    scan_tx: Sender<Job>,
    read_tx: Sender<Job>,
    result_rx: Receiver<LoadResult>,
    scan_epoch: EpochGuard,
    read_epoch: EpochGuard,
}

impl Loader {
    /// Spawns one scan worker and one read worker.
    pub fn spawn(max_bytes: u64) -> Self {
        let (scan_tx, scan_rx) = unbounded::<Job>();
        let (read_tx, read_rx) = unbounded::<Job>();
        let (res_tx, result_rx) = unbounded::<LoadResult>();

        start_worker(scan_rx, res_tx.clone(), run_scan);
        start_worker(read_rx, res_tx, move |job| run_read(job, max_bytes));

        Self {
            scan_tx,
            read_tx,
            result_rx,
            scan_epoch: EpochGuard::default(),
            read_epoch: EpochGuard::default(),
        }
    }

    /// Stamps `request` with a fresh generation and hands it to the worker of its class.
    pub fn submit(&mut self, request: LoadRequest) -> LoadHandle {
        let kind = request.kind();
        let (generation, cancel) = self.epoch_mut(kind).advance();
        let tx = match kind {
            RequestKind::Scan => &self.scan_tx,
            RequestKind::Read => &self.read_tx,
        };
        tracing::debug!(?kind, generation, path = %request.path().display(), "submit");

        let job = Job {
            request,
            generation,
            cancel: Arc::clone(&cancel),
        };
        if tx.send(job).is_err() {
            tracing::warn!(?kind, "load worker is gone, request dropped");
        }
        LoadHandle {
            kind,
            generation,
            cancel,
        }
    }

    /// Makes every in-flight request of `kind` stale without issuing a new one.
    pub fn invalidate(&mut self, kind: RequestKind) -> u64 {
        self.epoch_mut(kind).advance().0
    }

    #[inline]
    pub fn current_generation(&self, kind: RequestKind) -> u64 {
        self.epoch(kind).current
    }

    #[inline]
    pub fn is_current(&self, kind: RequestKind, generation: u64) -> bool {
        self.epoch(kind).current == generation
    }

    /// Receiver of raw worker results. Pass each one through [Loader::accept].
    pub fn results(&self) -> &Receiver<LoadResult> {
        &self.result_rx
    }

    /// Returns the result if it belongs to the current generation of its class.
    /// Stale results are dropped without any user-visible trace.
    pub fn accept(&self, result: LoadResult) -> Option<LoadResult> {
        if self.is_current(result.kind, result.generation) {
            Some(result)
        } else {
            tracing::debug!(
                kind = ?result.kind,
                generation = result.generation,
                current = self.current_generation(result.kind),
                "dropping superseded result"
            );
            None
        }
    }

    /// Drains every pending result and keeps only the accepted ones.
    pub fn drain_accepted(&self) -> Vec<LoadResult> {
        let mut accepted = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            if let Some(result) = self.accept(result) {
                accepted.push(result);
            }
        }
        accepted
    }

    fn epoch(&self, kind: RequestKind) -> &EpochGuard {
        match kind {
            RequestKind::Scan => &self.scan_epoch,
            RequestKind::Read => &self.read_epoch,
        }
    }

    fn epoch_mut(&mut self, kind: RequestKind) -> &mut EpochGuard {
        match kind {
            RequestKind::Scan => &mut self.scan_epoch,
            RequestKind::Read => &mut self.read_epoch,
        }
    }
}

/// Starts a worker thread that always processes the latest queued job only.
fn start_worker<F>(job_rx: Receiver<Job>, res_tx: Sender<LoadResult>, run: F)
where
    F: Fn(&Job) -> Result<LoadPayload, LoadError> + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(mut job) = job_rx.recv() {
            // Coalesce: everything still queued is older than the newest job.
            while let Ok(next) = job_rx.try_recv() {
                job = next;
            }
            if job.cancel.load(Ordering::Acquire) {
                continue;
            }

            let outcome = run(&job);
            let result = LoadResult {
                kind: job.request.kind(),
                generation: job.generation,
                path: job.request.path().to_path_buf(),
                outcome,
            };
            if res_tx.send(result).is_err() {
                break;
            }
        }
    });
}

fn run_scan(job: &Job) -> Result<LoadPayload, LoadError> {
    let LoadRequest::Scan { path, options } = &job.request else {
        return Err(LoadError::from_io(
            job.request.path(),
            std::io::Error::other("read request on scan worker"),
        ));
    };
    scan_dir(path, *options)
        .map(LoadPayload::Entries)
        .map_err(|e| LoadError::from_io(path, e))
}

fn run_read(job: &Job, max_bytes: u64) -> Result<LoadPayload, LoadError> {
    read_file(job.request.path(), max_bytes).map(LoadPayload::File)
}

/// Reads at most `max_bytes` of `path` together with its metadata.
///
/// Only regular files are opened. Anything else comes back with empty bytes and
/// [FileMeta::special] set, since opening a FIFO would block the worker.
pub fn read_file(path: &Path, max_bytes: u64) -> Result<FileContent, LoadError> {
    let to_err = |e| LoadError::from_io(path, e);

    let link_md = fs::symlink_metadata(path).map_err(to_err)?;
    let is_symlink = link_md.file_type().is_symlink();
    let symlink_target = if is_symlink {
        fs::read_link(path).ok()
    } else {
        None
    };

    let md = fs::metadata(path).map_err(to_err)?;
    if md.is_dir() {
        return Err(LoadError::from_io(path, io::Error::other("is a directory")));
    }
    let meta = FileMeta {
        modified: md.modified().ok(),
        permissions: mode_bits(&md),
        is_symlink,
        symlink_target,
        special: !md.is_file(),
    };

    if meta.special {
        tracing::debug!(path = %path.display(), "not a regular file, contents skipped");
        return Ok(FileContent {
            path: path.to_path_buf(),
            bytes: Vec::new(),
            tail: Vec::new(),
            total_size: 0,
            truncated: false,
            meta,
        });
    }

    let file = File::open(path).map_err(to_err)?;
    let total_size = md.len();
    let mut bytes = Vec::with_capacity(total_size.min(max_bytes) as usize);
    (&file)
        .take(max_bytes)
        .read_to_end(&mut bytes)
        .map_err(to_err)?;

    let truncated = total_size > bytes.len() as u64;
    let tail = if truncated {
        read_tail(&file, total_size, bytes.len() as u64).map_err(to_err)?
    } else {
        Vec::new()
    };

    Ok(FileContent {
        path: path.to_path_buf(),
        truncated,
        total_size,
        bytes,
        tail,
        meta,
    })
}

/// Reads the last [TAIL_BYTES] of the file, never overlapping the loaded head.
fn read_tail(mut file: &File, total_size: u64, head_len: u64) -> io::Result<Vec<u8>> {
    let start = total_size.saturating_sub(TAIL_BYTES).max(head_len);
    file.seek(SeekFrom::Start(start))?;
    let mut tail = Vec::with_capacity((total_size - start) as usize);
    file.take(total_size - start).read_to_end(&mut tail)?;
    Ok(tail)
}

#[cfg(unix)]
fn mode_bits(md: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(md.permissions().mode())
}

#[cfg(not(unix))]
fn mode_bits(_md: &fs::Metadata) -> Option<u32> {
    None
}
