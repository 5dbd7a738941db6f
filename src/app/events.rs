//! Event channels between the input side and the coordinating side of ncview.
//!
//! Navigation produces [NavEvent]s on the inbound channel. The coordinator turns loader
//! results into [UiUpdate]s on the outbound channel, which the terminal loop drains
//! before drawing. Neither side mutates the other's state directly.

use crate::app::preview::PaneMode;

use crossbeam_channel::{Receiver, Sender, unbounded};

use std::path::PathBuf;

/// Inbound navigation events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    FileHighlighted(PathBuf),
    FileSelected(PathBuf),
    DirectoryChanged(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// One line of status text for the bottom bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Outbound notifications that rendered state changed.
///
/// The renderer reads the state itself from the coordinator; these tell the terminal
/// loop what changed and carry the status text that has no other home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// A scan was accepted and installed as the listing of `dir`.
    Listing { dir: PathBuf, selected: usize },
    Selection(usize),
    PreviewMounted { path: PathBuf, handler: &'static str },
    PreviewCleared,
    Pane(PaneMode),
    Status(StatusMessage),
}

/// Both channels, owned by the coordinating thread.
pub struct EventBus {
    nav_tx: Sender<NavEvent>,
    nav_rx: Receiver<NavEvent>,
    ui_tx: Sender<UiUpdate>,
    ui_rx: Receiver<UiUpdate>,
}

impl EventBus {
    pub fn new() -> Self {
        let (nav_tx, nav_rx) = unbounded();
        let (ui_tx, ui_rx) = unbounded();
        Self {
            nav_tx,
            nav_rx,
            ui_tx,
            ui_rx,
        }
    }

    /// Sender half for producers that live outside the coordinator.
    pub fn nav_sender(&self) -> Sender<NavEvent> {
        self.nav_tx.clone()
    }

    pub fn post(&self, event: NavEvent) {
        // Both halves live in self, so the send cannot fail.
        let _ = self.nav_tx.send(event);
    }

    pub fn drain_nav(&self) -> Vec<NavEvent> {
        self.nav_rx.try_iter().collect()
    }

    pub fn emit(&self, update: UiUpdate) {
        let _ = self.ui_tx.send(update);
    }

    pub fn drain_updates(&self) -> Vec<UiUpdate> {
        self.ui_rx.try_iter().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_drain_in_order() {
        let bus = EventBus::new();
        bus.post(NavEvent::DirectoryChanged("/a".into()));
        bus.nav_sender()
            .send(NavEvent::FileHighlighted("/a/x".into()))
            .ok();

        assert_eq!(
            bus.drain_nav(),
            vec![
                NavEvent::DirectoryChanged("/a".into()),
                NavEvent::FileHighlighted("/a/x".into()),
            ]
        );
        assert!(bus.drain_nav().is_empty());

        bus.emit(UiUpdate::Status(StatusMessage::error("boom")));
        let updates = bus.drain_updates();
        assert!(matches!(&updates[..], [UiUpdate::Status(s)] if s.is_error()));
    }
}
