//! Preview capability registry for ncview.
//!
//! Every preview handler is described by a [HandlerDescriptor]: the extensions it
//! claims, a priority and the render function. The [CapabilityRegistry] picks exactly one
//! descriptor for a path with a ranked extension match, falling back to a null-byte
//! heuristic over the file's first bytes when nothing claims the extension.
//!
//! The registry is built once through [RegistryBuilder] and has no mutating methods
//! afterwards, so workers and the coordinating thread can read it without locking.

use crate::core::handlers::{self, PreviewView, RenderOptions};
use crate::core::loader::FileContent;
use crate::error::{NcviewError, Result};

use once_cell::sync::OnceCell;
use std::fmt;
use std::path::Path;

/// Default number of leading bytes inspected for null bytes.
pub const DEFAULT_PEEK_BYTES: usize = 512;

/// Render contract of a handler. Pure: no I/O, the payload is already read.
pub type RenderFn = fn(&FileContent, &RenderOptions) -> PreviewView;

static GLOBAL: OnceCell<CapabilityRegistry> = OnceCell::new();

/// Static metadata for one preview handler.
#[derive(Clone)]
pub struct HandlerDescriptor {
    name: &'static str,
    extensions: Vec<String>,
    priority: i32,
    render: RenderFn,
}

impl HandlerDescriptor {
    /// Extensions are accepted with or without the leading dot and in any case.
    /// An extension containing an inner dot (`tar.gz`) is a compound extension.
    pub fn new(name: &'static str, extensions: &[&str], priority: i32, render: RenderFn) -> Self {
        let extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            name,
            extensions,
            priority,
            render,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn render(&self, content: &FileContent, options: &RenderOptions) -> PreviewView {
        (self.render)(content, options)
    }

    fn claims_trailing(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| !e.contains('.') && e == ext)
    }

    fn claims_compound(&self, lower_name: &str) -> bool {
        self.extensions.iter().any(|e| {
            e.contains('.')
                && lower_name.len() > e.len() + 1
                && lower_name.ends_with(e.as_str())
                && lower_name.as_bytes()[lower_name.len() - e.len() - 1] == b'.'
        })
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("priority", &self.priority)
            .finish()
    }
}

impl PartialEq for HandlerDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.priority == other.priority
            && self.extensions == other.extensions
    }
}

/// Result of the null-byte heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Text,
    Binary,
}

/// Classifies a byte prefix: any null byte within the first `peek` bytes means binary.
pub fn classify_prefix(bytes: &[u8], peek: usize) -> ContentClass {
    let window = &bytes[..bytes.len().min(peek)];
    if window.contains(&0) {
        ContentClass::Binary
    } else {
        ContentClass::Text
    }
}

/// Collects descriptors before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    descriptors: Vec<HandlerDescriptor>,
    text_default: Option<usize>,
    binary_default: Option<usize>,
    peek_bytes: Option<usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, descriptor: HandlerDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Registers the descriptor used for unmatched text content.
    pub fn text_default(mut self, descriptor: HandlerDescriptor) -> Self {
        self.text_default = Some(self.descriptors.len());
        self.descriptors.push(descriptor);
        self
    }

    /// Registers the descriptor used for unmatched binary content.
    pub fn binary_default(mut self, descriptor: HandlerDescriptor) -> Self {
        self.binary_default = Some(self.descriptors.len());
        self.descriptors.push(descriptor);
        self
    }

    pub fn peek_bytes(mut self, peek: usize) -> Self {
        self.peek_bytes = Some(peek);
        self
    }

    pub fn build(self) -> CapabilityRegistry {
        CapabilityRegistry {
            descriptors: self.descriptors,
            text_default: self.text_default,
            binary_default: self.binary_default,
            peek_bytes: self.peek_bytes.unwrap_or(DEFAULT_PEEK_BYTES),
        }
    }
}

/// Frozen set of handler descriptors plus the pure selection function.
#[derive(Debug)]
pub struct CapabilityRegistry {
    descriptors: Vec<HandlerDescriptor>,
    text_default: Option<usize>,
    binary_default: Option<usize>,
    peek_bytes: usize,
}

impl CapabilityRegistry {
    /// Registry with every built-in handler and the text/fallback defaults.
    pub fn builtin(peek_bytes: usize) -> Self {
        handlers::builtin_descriptors()
            .into_iter()
            .fold(RegistryBuilder::new(), RegistryBuilder::register)
            .text_default(handlers::text_descriptor())
            .binary_default(handlers::fallback_descriptor())
            .peek_bytes(peek_bytes)
            .build()
    }

    /// Installs the process-wide registry. Only the first call wins.
    pub fn install(registry: CapabilityRegistry) -> std::result::Result<(), CapabilityRegistry> {
        GLOBAL.set(registry)
    }

    /// The process-wide registry, built with defaults if nothing was installed.
    pub fn global() -> &'static CapabilityRegistry {
        GLOBAL.get_or_init(|| Self::builtin(DEFAULT_PEEK_BYTES))
    }

    #[inline]
    pub fn descriptors(&self) -> &[HandlerDescriptor] {
        &self.descriptors
    }

    #[inline]
    pub fn peek_bytes(&self) -> usize {
        self.peek_bytes
    }

    /// Ranked extension match only.
    ///
    /// Compound extensions (`tar.gz`) are more specific than trailing ones and win when
    /// any descriptor claims them. Within a tier the highest priority wins; ties go to
    /// the first registered descriptor.
    pub fn resolve_extension(&self, path: &Path) -> Option<&HandlerDescriptor> {
        let lower_name = path.file_name()?.to_string_lossy().to_lowercase();

        let compound = self.best_by(|d| d.claims_compound(&lower_name));
        if compound.is_some() {
            return compound;
        }

        let ext = path.extension()?.to_string_lossy().to_lowercase();
        self.best_by(|d| d.claims_trailing(&ext))
    }

    /// Resolves `path` to exactly one descriptor. `prefix` is the start of the file's
    /// content and is only inspected when no extension matches.
    pub fn resolve(&self, path: &Path, prefix: &[u8]) -> Result<&HandlerDescriptor> {
        if let Some(found) = self.resolve_extension(path) {
            return Ok(found);
        }
        let slot = match classify_prefix(prefix, self.peek_bytes) {
            ContentClass::Text => self.text_default,
            ContentClass::Binary => self.binary_default,
        };
        slot.and_then(|idx| self.descriptors.get(idx))
            .ok_or_else(|| NcviewError::NoHandlerAvailable {
                path: path.to_path_buf(),
            })
    }

    /// Resolves a loaded file. Special files (FIFOs, sockets, devices) carry no bytes and
    /// always go to the binary default, whatever their name.
    pub fn resolve_content(&self, content: &FileContent) -> Result<&HandlerDescriptor> {
        if !content.meta.special {
            return self.resolve(&content.path, &content.bytes);
        }
        self.binary_default
            .and_then(|idx| self.descriptors.get(idx))
            .ok_or_else(|| NcviewError::NoHandlerAvailable {
                path: content.path.clone(),
            })
    }

    fn best_by<F>(&self, mut claims: F) -> Option<&HandlerDescriptor>
    where
        F: FnMut(&HandlerDescriptor) -> bool,
    {
        let mut best: Option<&HandlerDescriptor> = None;
        for descriptor in self.descriptors.iter().filter(|d| claims(d)) {
            // strictly greater keeps the first registered on ties
            if best.is_none_or(|b| descriptor.priority > b.priority) {
                best = Some(descriptor);
            }
        }
        best
    }
}
