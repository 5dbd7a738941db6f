//! Miscellaneous utility functions for ncview.
//!
//! Holds the [helpers] submodule (config directory lookup, editor launching, unused path
//! generation, home path shortening) and the [cli] argument handling.

pub mod cli;
pub mod helpers;

pub use helpers::{
    config_dir, get_unused_path, open_in_editor, resolve_start_dir, shorten_home_path,
};
