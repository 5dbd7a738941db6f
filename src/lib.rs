//! Internal library crate for ncview.
//!
//! The shipped application is the `ncview` binary (`src/main.rs`).
//!
//! The library exists so the binary and the integration tests share one module tree.
//! It is not meant as a public API.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod ui;
pub mod utils;
