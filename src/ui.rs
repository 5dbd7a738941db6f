//! Terminal UI for ncview.
//!
//! [render] draws one frame from the [crate::app::AppState]. It only reads state; every
//! mutation happens in the app layer.

pub mod icons;
pub mod overlays;
pub mod render;
pub mod widgets;

pub use render::render;
