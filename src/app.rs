//! Application state and coordination for ncview.
//!
//! - [state]: [AppState], the coordinator ticked by the terminal loop
//! - [handlers]: key routing for prompts, overlays, full-screen preview and the keymap
//! - [input]: the modal input state machine
//! - [preview]: debounce and pane state for the preview
//! - [nav]: the entry listing and selection
//! - [events]: inbound navigation events and outbound UI updates
//! - [keymap]: key parsing and bindings

pub mod events;
pub mod handlers;
pub mod input;
pub mod keymap;
pub mod nav;
pub mod preview;
pub mod state;

pub use events::{EventBus, NavEvent, StatusKind, StatusMessage, UiUpdate};
pub use input::{InputMode, InputModeController, PromptOutcome};
pub use nav::NavState;
pub use preview::{Debouncer, PaneMode, PreviewCoordinator, PreviewSession};
pub use state::{AppState, KeypressResult};
