//! Core runtime logic for ncview.
//!
//! This module contains the non-UI "engine" pieces used by the application:
//! - [scan]: directory listing, entry metadata and ordering (see [scan_dir], [DirectoryEntry]).
//! - [loader]: background scan/read workers guarded by per-class generations.
//! - [registry]: extension and content based handler resolution.
//! - [handlers]: the built-in preview renderers.
//! - [columnar]: the Parquet renderer, fed from the loaded head and tail of the file.
//! - [fileop]: rename, create, delete and shell commands off the main thread.
//! - [formatter]: size, time, permission and line sanitizing helpers.
//! - [terminal]: terminal setup/teardown and the main crossterm/ratatui event loop.

pub mod columnar;
pub mod fileop;
pub mod formatter;
pub mod handlers;
pub mod loader;
pub mod registry;
pub mod scan;
pub mod terminal;

pub use fileop::{FileOpResult, FileOperation, FileOps};
pub use formatter::{
    format_byte_count, format_file_size, format_file_time, format_permissions, sanitize_line,
    sanitize_to_exact_width,
};
pub use handlers::{PreviewView, RenderOptions};
pub use loader::{
    FileContent, FileMeta, LoadHandle, LoadPayload, LoadRequest, LoadResult, Loader, RequestKind,
    read_file,
};
pub use registry::{CapabilityRegistry, ContentClass, HandlerDescriptor, RegistryBuilder};
pub use scan::{DirectoryEntry, EntryKind, ScanOptions, SortKey, scan_dir, sort_entries};
