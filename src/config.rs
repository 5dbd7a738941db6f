//! Configuration module for ncview.
//!
//! Loads `ncview.toml` and exposes the processed settings through [Config].
//! - [general]: listing behaviour (hidden files, sort key, directories first, editor).
//! - [preview]: pane mode, debounce window and read/render limits.
//! - [input]: key bindings.

pub mod general;
pub mod input;
pub mod load;
pub mod preview;

pub use general::{General, InternalGeneral};
pub use input::{Editor, Keys};
pub use load::{Config, RawConfig};
pub use preview::{PaneSetting, Preview, PreviewSettings};
