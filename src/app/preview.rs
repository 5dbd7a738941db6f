//! Preview pane coordination for ncview.
//!
//! Owns the debounce timer, the pane mode and the currently mounted preview. Everything
//! here runs on the coordinating thread and works with caller supplied timestamps, so
//! timing is driven entirely by [PreviewCoordinator::poll].

use crate::config::PaneSetting;
use crate::core::PreviewView;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Trailing-edge debounce over a single pending path.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<(PathBuf, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// (Re)arms the timer for `path`, replacing any pending path.
    pub fn arm(&mut self, path: PathBuf, now: Instant) {
        self.pending = Some((path, now));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Fires once the window elapsed since the last arm.
    pub fn poll(&mut self, now: Instant) -> Option<PathBuf> {
        match &self.pending {
            Some((_, armed_at)) if now.saturating_duration_since(*armed_at) >= self.window => {
                self.pending.take().map(|(path, _)| path)
            }
            _ => None,
        }
    }
}

/// Visibility of the preview pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneMode {
    Hidden,
    #[default]
    Split,
    /// Preview only. The entry listing is not drawn.
    FullScreen,
}

impl From<PaneSetting> for PaneMode {
    fn from(setting: PaneSetting) -> Self {
        match setting {
            PaneSetting::Split => PaneMode::Split,
            PaneSetting::Hidden => PaneMode::Hidden,
        }
    }
}

/// The mounted preview.
#[derive(Debug)]
pub struct PreviewSession {
    path: PathBuf,
    handler: &'static str,
    view: PreviewView,
    scroll: usize,
}

impl PreviewSession {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn handler(&self) -> &'static str {
        self.handler
    }

    #[inline]
    pub fn view(&self) -> &PreviewView {
        &self.view
    }

    #[inline]
    pub fn scroll(&self) -> usize {
        self.scroll
    }
}

#[derive(Debug)]
pub struct PreviewCoordinator {
    pane: PaneMode,
    debouncer: Debouncer,
    highlighted: Option<PathBuf>,
    loading: Option<PathBuf>,
    session: Option<PreviewSession>,
}

impl PreviewCoordinator {
    pub fn new(debounce: Duration, pane: PaneMode) -> Self {
        Self {
            pane,
            debouncer: Debouncer::new(debounce),
            highlighted: None,
            loading: None,
            session: None,
        }
    }

    // Getters

    #[inline]
    pub fn pane(&self) -> PaneMode {
        self.pane
    }

    #[inline]
    pub fn session(&self) -> Option<&PreviewSession> {
        self.session.as_ref()
    }

    #[inline]
    pub fn highlighted(&self) -> Option<&Path> {
        self.highlighted.as_deref()
    }

    /// True between a submitted read and its mounted result.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_armed()
    }

    #[inline]
    fn is_visible(&self) -> bool {
        self.pane != PaneMode::Hidden
    }

    // Transitions

    /// Records the highlight and re-arms the debounce timer. Nothing is armed while
    /// the pane is hidden.
    pub fn on_highlight_changed(&mut self, path: PathBuf, now: Instant) {
        if self.is_visible() {
            self.debouncer.arm(path.clone(), now);
        }
        self.highlighted = Some(path);
    }

    /// Returns the path whose read must be submitted now, if the debounce window elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<PathBuf> {
        let path = self.debouncer.poll(now)?;
        self.loading = Some(path.clone());
        Some(path)
    }

    /// Bypasses the debounce and opens the preview full-screen.
    /// Returns the path to read immediately.
    pub fn on_selection_confirmed(&mut self, path: PathBuf) -> PathBuf {
        self.debouncer.cancel();
        self.pane = PaneMode::FullScreen;
        self.highlighted = Some(path.clone());
        self.loading = Some(path.clone());
        path
    }

    /// Cycles `Hidden -> Split -> FullScreen -> Split`.
    ///
    /// When the pane becomes visible with nothing mounted for the highlighted path, that
    /// path is returned so the caller can load it right away.
    pub fn toggle_pane(&mut self) -> Option<PathBuf> {
        self.pane = match self.pane {
            PaneMode::Hidden => PaneMode::Split,
            PaneMode::Split => PaneMode::FullScreen,
            PaneMode::FullScreen => PaneMode::Split,
        };
        self.reload_target()
    }

    pub fn hide_pane(&mut self) {
        self.pane = PaneMode::Hidden;
        self.debouncer.cancel();
        self.loading = None;
        self.release();
    }

    /// Leaves full-screen for the split view.
    pub fn exit_fullscreen(&mut self) {
        if self.pane == PaneMode::FullScreen {
            self.pane = PaneMode::Split;
        }
    }

    /// Cancels any pending debounce and clears the preview session.
    pub fn on_directory_changed(&mut self) {
        self.debouncer.cancel();
        self.highlighted = None;
        self.loading = None;
        self.release();
        if self.pane == PaneMode::FullScreen {
            self.pane = PaneMode::Split;
        }
    }

    /// Drops whatever the pending read would have shown, e.g. after a failed load.
    pub fn abandon_load(&mut self) {
        self.loading = None;
    }

    /// Mounts a new view for `path`. The old view is dropped before `build` runs.
    ///
    /// Ignored (returns false) when `path` is no longer the highlighted one.
    pub fn mount_with<F>(&mut self, path: &Path, handler: &'static str, build: F) -> bool
    where
        F: FnOnce() -> PreviewView,
    {
        if self.highlighted.as_deref() != Some(path) || !self.is_visible() {
            return false;
        }
        self.release();
        let view = build();
        self.loading = None;
        self.session = Some(PreviewSession {
            path: path.to_path_buf(),
            handler,
            view,
            scroll: 0,
        });
        true
    }

    /// Shows a one line message for `path` instead of a loaded preview.
    pub fn show_message(&mut self, path: PathBuf, handler: &'static str, msg: &str) {
        self.debouncer.cancel();
        self.highlighted = Some(path.clone());
        self.mount_with(&path, handler, || PreviewView::message(handler, msg));
    }

    /// Scrolls the mounted view by `delta` lines, clamped to its content.
    pub fn scroll_by(&mut self, delta: isize) {
        if let Some(session) = &mut self.session {
            let max = session.view.lines.len().saturating_sub(1);
            session.scroll = session.scroll.saturating_add_signed(delta).min(max);
        }
    }

    pub fn scroll_to(&mut self, line: usize) {
        if let Some(session) = &mut self.session {
            session.scroll = line.min(session.view.lines.len().saturating_sub(1));
        }
    }

    fn release(&mut self) {
        if let Some(old) = self.session.take() {
            tracing::trace!(path = %old.path.display(), handler = old.handler, "releasing preview");
        }
    }

    fn reload_target(&mut self) -> Option<PathBuf> {
        if !self.is_visible() {
            return None;
        }
        let path = self.highlighted.clone()?;
        let mounted = self.session.as_ref().is_some_and(|s| s.path == path);
        if mounted || self.loading.as_ref() == Some(&path) {
            return None;
        }
        self.debouncer.cancel();
        self.loading = Some(path.clone());
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn debounce_submits_only_last_highlight() {
        let t = Instant::now();
        let mut pc = PreviewCoordinator::new(WINDOW, PaneMode::Split);

        pc.on_highlight_changed(PathBuf::from("/a"), t);
        pc.on_highlight_changed(PathBuf::from("/b"), t + ms(40));
        assert_eq!(pc.poll(t + ms(120)), None);
        pc.on_highlight_changed(PathBuf::from("/c"), t + ms(140));
        assert_eq!(pc.poll(t + ms(200)), None);

        assert_eq!(pc.poll(t + ms(240)), Some(PathBuf::from("/c")));
        assert_eq!(pc.poll(t + ms(400)), None);
        assert!(pc.is_loading());
    }

    #[test]
    fn selection_bypasses_debounce() {
        let t = Instant::now();
        let mut pc = PreviewCoordinator::new(WINDOW, PaneMode::Split);
        pc.on_highlight_changed(PathBuf::from("/a"), t);

        let path = pc.on_selection_confirmed(PathBuf::from("/a"));
        assert_eq!(path, PathBuf::from("/a"));
        assert_eq!(pc.pane(), PaneMode::FullScreen);
        assert_eq!(pc.poll(t + ms(500)), None);
    }

    #[test]
    fn pane_cycle() {
        let mut pc = PreviewCoordinator::new(WINDOW, PaneMode::Hidden);
        pc.toggle_pane();
        assert_eq!(pc.pane(), PaneMode::Split);
        pc.toggle_pane();
        assert_eq!(pc.pane(), PaneMode::FullScreen);
        pc.toggle_pane();
        assert_eq!(pc.pane(), PaneMode::Split);
        pc.hide_pane();
        assert_eq!(pc.pane(), PaneMode::Hidden);
    }

    #[test]
    fn hidden_pane_loads_on_show() {
        let t = Instant::now();
        let mut pc = PreviewCoordinator::new(WINDOW, PaneMode::Hidden);
        pc.on_highlight_changed(PathBuf::from("/a"), t);
        assert_eq!(pc.poll(t + ms(500)), None);

        assert_eq!(pc.toggle_pane(), Some(PathBuf::from("/a")));
        assert!(pc.is_loading());
    }

    #[test]
    fn directory_change_clears_session() {
        let t = Instant::now();
        let mut pc = PreviewCoordinator::new(WINDOW, PaneMode::Split);
        let path = PathBuf::from("/a");
        pc.on_highlight_changed(path.clone(), t);
        assert!(pc.mount_with(&path, "text", || PreviewView::message("text", "hi")));
        assert!(pc.session().is_some());

        pc.on_highlight_changed(PathBuf::from("/b"), t + ms(10));
        pc.on_directory_changed();
        assert!(pc.session().is_none());
        assert!(!pc.is_pending());
        assert_eq!(pc.poll(t + ms(500)), None);
    }

    #[test]
    fn mount_ignores_paths_no_longer_highlighted() {
        let t = Instant::now();
        let mut pc = PreviewCoordinator::new(WINDOW, PaneMode::Split);
        pc.on_highlight_changed(PathBuf::from("/new"), t);
        let mounted = pc.mount_with(Path::new("/old"), "text", PreviewView::default);
        assert!(!mounted);
        assert!(pc.session().is_none());
    }

    #[test]
    fn scroll_is_clamped() {
        let t = Instant::now();
        let mut pc = PreviewCoordinator::new(WINDOW, PaneMode::Split);
        let path = PathBuf::from("/a");
        pc.on_highlight_changed(path.clone(), t);
        pc.mount_with(&path, "text", || PreviewView {
            handler: "text",
            header: Vec::new(),
            lines: (0..10).map(|i| i.to_string()).collect(),
        });
        pc.scroll_by(25);
        assert_eq!(pc.session().map(PreviewSession::scroll), Some(9));
        pc.scroll_by(-4);
        assert_eq!(pc.session().map(PreviewSession::scroll), Some(5));
        pc.scroll_by(-40);
        assert_eq!(pc.session().map(PreviewSession::scroll), Some(0));
    }
}
