//! Application state and main coordinator for ncview.
//!
//! [AppState] lives on the coordinating thread and is the only owner of visible state:
//! - the configuration and the keymap
//! - the navigation listing ([NavState]) and the modal input ([InputModeController])
//! - the preview pane ([PreviewCoordinator])
//! - the [Loader] and [FileOps] workers, talked to only through channels
//! - the [EventBus] carrying inbound navigation events and outbound UI updates
//!
//! [AppState::tick] is called once per frame by the terminal loop. It drains navigation
//! events, fires the preview debounce, applies accepted loader results and file
//! operation completions, and reports whether anything visible changed.

use crate::app::events::{EventBus, NavEvent, StatusMessage, UiUpdate};
use crate::app::input::InputModeController;
use crate::app::keymap::Keymap;
use crate::app::nav::NavState;
use crate::app::preview::{PaneMode, PreviewCoordinator};
use crate::config::Config;
use crate::core::{
    CapabilityRegistry, FileContent, FileOps, LoadPayload, LoadRequest, LoadResult, Loader,
    RequestKind, ScanOptions,
};
use crate::session::SessionStore;
use crate::ui::overlays::Overlay;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Enumeration for each individual keypress result processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypressResult {
    Continue,
    Consumed,
    Quit,
    OpenedEditor,
}

pub struct AppState<'a> {
    pub(super) config: &'a Config,
    pub(super) keymap: Keymap,

    pub(super) nav: NavState,
    pub(super) input: InputModeController,
    pub(super) preview: PreviewCoordinator,
    pub(super) overlay: Option<Overlay>,

    pub(super) loader: Loader,
    pub(super) fileops: FileOps,
    pub(super) bus: EventBus,
    pub(super) registry: &'static CapabilityRegistry,
    pub(super) session: Option<SessionStore>,

    pub(super) scan_options: ScanOptions,
}

impl<'a> AppState<'a> {
    /// Builds the app on `initial_path` using the process-wide handler registry.
    pub fn from_dir(config: &'a Config, initial_path: &Path, session: Option<SessionStore>) -> Self {
        Self::with_registry(config, initial_path, session, CapabilityRegistry::global())
    }

    pub fn with_registry(
        config: &'a Config,
        initial_path: &Path,
        session: Option<SessionStore>,
        registry: &'static CapabilityRegistry,
    ) -> Self {
        let preview_cfg = config.preview();
        let mut app = Self {
            config,
            keymap: Keymap::from_config(config),
            nav: NavState::new(initial_path.to_path_buf()),
            input: InputModeController::new(),
            preview: PreviewCoordinator::new(preview_cfg.debounce(), preview_cfg.pane().into()),
            overlay: None,
            loader: Loader::spawn(preview_cfg.max_bytes()),
            fileops: FileOps::spawn(),
            bus: EventBus::new(),
            registry,
            session,
            scan_options: config.general().scan_options(),
        };
        app.request_dir_change(initial_path.to_path_buf(), None);
        app
    }

    // Getters / accessors

    #[inline]
    pub fn config(&self) -> &Config {
        self.config
    }

    #[inline]
    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    #[inline]
    pub fn input(&self) -> &InputModeController {
        &self.input
    }

    #[inline]
    pub fn preview(&self) -> &PreviewCoordinator {
        &self.preview
    }

    #[inline]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    #[inline]
    pub fn scan_options(&self) -> ScanOptions {
        self.scan_options
    }

    #[inline]
    pub fn is_scanning(&self) -> bool {
        self.nav.pending_dir().is_some()
    }

    #[inline]
    pub fn session(&self) -> Option<&SessionStore> {
        self.session.as_ref()
    }

    /// Outbound updates produced since the last call.
    pub fn drain_updates(&self) -> Vec<UiUpdate> {
        self.bus.drain_updates()
    }

    /// Queues an inbound navigation event for the next [AppState::tick].
    pub fn post(&self, event: NavEvent) {
        self.bus.post(event);
    }

    // Main loop

    /// Runs one coordination step. Returns true if visible state may have changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        for event in self.bus.drain_nav() {
            self.handle_nav_event(event, now);
            changed = true;
        }

        if let Some(path) = self.preview.poll(now) {
            self.loader.submit(LoadRequest::Read { path });
            changed = true;
        }

        for result in self.loader.drain_accepted() {
            changed |= self.apply_if_current(result);
        }

        while let Ok(done) = self.fileops.results().try_recv() {
            match done.outcome {
                Ok(msg) => self.status(StatusMessage::info(msg)),
                Err(msg) => self.status(StatusMessage::error(msg)),
            }
            self.request_rescan(done.focus);
            changed = true;
        }

        changed
    }

    fn handle_nav_event(&mut self, event: NavEvent, now: Instant) {
        match event {
            NavEvent::DirectoryChanged(dir) => {
                if self.nav.pending_dir() != Some(dir.as_path()) {
                    self.nav.begin_change(dir.clone(), None);
                }
                self.loader.invalidate(RequestKind::Read);
                self.preview.on_directory_changed();
                self.bus.emit(UiUpdate::PreviewCleared);
                self.loader.submit(LoadRequest::Scan {
                    path: dir,
                    options: self.scan_options,
                });
            }
            NavEvent::FileHighlighted(path) => {
                self.loader.invalidate(RequestKind::Read);
                let is_dir = self
                    .nav
                    .selected_entry()
                    .is_some_and(|e| e.path() == path && e.is_dir());
                if is_dir {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.preview
                        .show_message(path, "directory", &format!("{name}/  directory"));
                } else {
                    self.preview.on_highlight_changed(path, now);
                }
            }
            NavEvent::FileSelected(path) => {
                let path = self.preview.on_selection_confirmed(path);
                self.bus.emit(UiUpdate::Pane(self.preview.pane()));
                self.loader.submit(LoadRequest::Read { path });
            }
        }
    }

    /// Applies `result` unless a result applied earlier in the same batch superseded it.
    fn apply_if_current(&mut self, result: LoadResult) -> bool {
        if !self.loader.is_current(result.kind, result.generation) {
            tracing::debug!(
                kind = ?result.kind,
                generation = result.generation,
                "dropping result superseded within the batch"
            );
            return false;
        }
        self.apply_load_result(result);
        true
    }

    fn apply_load_result(&mut self, result: LoadResult) {
        let LoadResult {
            kind, path, outcome, ..
        } = result;

        match (kind, outcome) {
            (RequestKind::Scan, Ok(LoadPayload::Entries(entries))) => {
                self.nav.apply_scan(path.clone(), entries);
                if let Some(store) = &self.session
                    && let Err(e) = store.append_history(&path)
                {
                    tracing::warn!(error = %e, "could not record history");
                }
                self.bus.emit(UiUpdate::Listing {
                    dir: path,
                    selected: self.nav.selected_idx(),
                });
                self.highlight_selected();
            }
            (RequestKind::Scan, Err(e)) => {
                self.nav.fail_pending();
                tracing::warn!(error = %e, "scan failed");
                self.status(StatusMessage::error(e.to_string()));
                // the listing is unchanged, so bring its preview back
                self.highlight_selected();
            }
            (RequestKind::Read, Ok(LoadPayload::File(content))) => self.mount_preview(content),
            (RequestKind::Read, Err(e)) => {
                self.preview.abandon_load();
                tracing::warn!(error = %e, "read failed");
                self.status(StatusMessage::error(e.to_string()));
            }
            (kind, Ok(_)) => {
                tracing::warn!(?kind, path = %path.display(), "payload does not match request kind");
            }
        }
    }

    /// Resolves a handler for the read payload and mounts its rendered view.
    fn mount_preview(&mut self, content: FileContent) {
        let descriptor = match self.registry.resolve_content(&content) {
            Ok(d) => d,
            Err(e) => {
                self.preview.abandon_load();
                self.status(StatusMessage::error(e.to_string()));
                return;
            }
        };
        let options = self.config.preview().render_options();
        let path = content.path.clone();
        let handler = descriptor.name();

        if self
            .preview
            .mount_with(&path, handler, || descriptor.render(&content, &options))
        {
            tracing::debug!(path = %path.display(), handler, "preview mounted");
            self.bus.emit(UiUpdate::PreviewMounted { path, handler });
        }
    }

    // Requests

    /// Starts loading `dir`. The current listing stays visible until the scan is accepted.
    pub(crate) fn request_dir_change(&mut self, dir: PathBuf, focus: Option<OsString>) {
        self.nav.begin_change(dir.clone(), focus);
        self.bus.post(NavEvent::DirectoryChanged(dir));
    }

    /// Rescans the current directory, focusing `focus` or else the highlighted entry.
    pub(crate) fn request_rescan(&mut self, focus: Option<OsString>) {
        let focus = focus.or_else(|| self.nav.selected_entry().map(|e| e.name().to_os_string()));
        let dir = self.nav.current_dir().to_path_buf();
        self.request_dir_change(dir, focus);
    }

    /// Posts a highlight event for the selected entry, or clears the preview on an
    /// empty listing.
    pub(crate) fn highlight_selected(&mut self) {
        self.bus.emit(UiUpdate::Selection(self.nav.selected_idx()));
        match self.nav.selected_path() {
            Some(path) => self.bus.post(NavEvent::FileHighlighted(path)),
            None => {
                self.loader.invalidate(RequestKind::Read);
                self.preview.on_directory_changed();
                self.bus.emit(UiUpdate::PreviewCleared);
            }
        }
    }

    pub(crate) fn set_pane(&mut self, reload: Option<PathBuf>) {
        if let Some(path) = reload {
            self.loader.submit(LoadRequest::Read { path });
        }
        self.bus.emit(UiUpdate::Pane(self.preview.pane()));
    }

    pub(crate) fn status(&self, msg: StatusMessage) {
        self.bus.emit(UiUpdate::Status(msg));
    }

    /// Status summary for the bottom bar: "N dirs, M files | sort:... | hidden:...".
    pub fn summary(&self) -> String {
        let (dirs, files) = self.nav.counts();
        format!(
            "{dirs} dirs, {files} files | sort:{} | hidden:{}",
            self.scan_options.sort.label(),
            if self.scan_options.show_hidden { "on" } else { "off" }
        )
    }

    /// Persists the current directory as the last visited one.
    pub(crate) fn save_last_dir(&self) {
        if let Some(store) = &self.session
            && let Err(e) = store.save_last_dir(self.nav.current_dir())
        {
            tracing::warn!(error = %e, "could not save last directory");
        }
    }

    #[inline]
    pub fn pane(&self) -> PaneMode {
        self.preview.pane()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Ticks until `done` holds or two seconds pass.
    fn tick_until<F>(app: &mut AppState, mut done: F) -> bool
    where
        F: FnMut(&AppState) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            app.tick(Instant::now());
            if done(&*app) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn startup_scan_and_debounced_preview() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.csv"), "x,y\n1,2\n")?;
        fs::write(dir.path().join("b.txt"), "hello")?;
        let config = Config::default();
        let mut app = AppState::from_dir(&config, dir.path(), None);

        assert!(tick_until(&mut app, |a| a.nav().entries().len() == 2));
        assert!(tick_until(&mut app, |a| a.preview().session().is_some()));

        let session = app.preview().session().ok_or("no preview")?;
        assert_eq!(session.path(), dir.path().join("a.csv"));
        assert_eq!(session.handler(), "csv");
        assert!(app.summary().starts_with("0 dirs, 2 files | sort:name"));
        Ok(())
    }

    #[test]
    fn result_superseded_earlier_in_batch_is_not_applied() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        fs::write(dir.path().join("gone.txt"), "x")?;
        let config = Config::default();
        let mut app = AppState::from_dir(&config, dir.path(), None);
        assert!(tick_until(&mut app, |a| a.nav().entries().len() == 1));
        assert!(tick_until(&mut app, |a| a.preview().session().is_some()));
        app.drain_updates();

        // both results were current when drained; the empty listing invalidates reads
        let read_generation = app.loader.invalidate(RequestKind::Read);
        let scan_generation = app.loader.invalidate(RequestKind::Scan);
        let batch = vec![
            LoadResult {
                kind: RequestKind::Scan,
                generation: scan_generation,
                path: dir.path().to_path_buf(),
                outcome: Ok(LoadPayload::Entries(Vec::new())),
            },
            LoadResult {
                kind: RequestKind::Read,
                generation: read_generation,
                path: dir.path().join("gone.txt"),
                outcome: Err(crate::error::LoadError::from_io(
                    &dir.path().join("gone.txt"),
                    std::io::Error::other("late failure"),
                )),
            },
        ];

        let applied: Vec<bool> = batch.into_iter().map(|r| app.apply_if_current(r)).collect();
        assert_eq!(applied, vec![true, false]);
        assert!(app.nav().entries().is_empty());
        assert!(
            !app.drain_updates()
                .iter()
                .any(|u| matches!(u, UiUpdate::Status(s) if s.is_error())),
            "superseded read failure must not reach the status line"
        );
        Ok(())
    }

    #[test]
    fn failed_directory_change_keeps_listing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("keep.txt"), "x")?;
        let config = Config::default();
        let mut app = AppState::from_dir(&config, dir.path(), None);
        assert!(tick_until(&mut app, |a| a.nav().entries().len() == 1));
        app.drain_updates();

        app.request_dir_change(dir.path().join("missing"), None);
        assert!(tick_until(&mut app, |a| !a.is_scanning()));

        assert_eq!(app.nav().current_dir(), dir.path());
        assert_eq!(app.nav().entries().len(), 1);
        let errors: Vec<_> = app
            .drain_updates()
            .into_iter()
            .filter(|u| matches!(u, UiUpdate::Status(s) if s.is_error()))
            .collect();
        assert_eq!(errors.len(), 1);
        Ok(())
    }

    #[test]
    fn selection_opens_fullscreen_without_debounce() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("data.json");
        fs::write(&file, r#"{"a": 1}"#)?;
        let config = Config::default();
        let mut app = AppState::from_dir(&config, dir.path(), None);
        assert!(tick_until(&mut app, |a| a.nav().entries().len() == 1));

        app.post(NavEvent::FileSelected(file.clone()));
        app.tick(Instant::now());
        assert_eq!(app.pane(), PaneMode::FullScreen);
        assert!(tick_until(&mut app, |a| a
            .preview()
            .session()
            .is_some_and(|s| s.handler() == "json")));
        Ok(())
    }
}
