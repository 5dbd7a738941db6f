//! Input action handler methods for ncview.
//!
//! This module implements the [AppState] methods that route key events: an open prompt
//! first, then overlays, then full-screen preview keys, and finally the keymap. Prompts
//! come before overlays because the pins overlay stays open while a pin is being edited.

use crate::app::events::{NavEvent, StatusMessage};
use crate::app::input::{InputMode, PromptOutcome};
use crate::app::keymap::{
    Action, FileAction, NavAction, SessionAction, SystemAction, ViewAction,
};
use crate::app::preview::PaneMode;
use crate::app::state::{AppState, KeypressResult};
use crate::core::{FileOperation, RequestKind};
use crate::session::{Pin, resolve_path};
use crate::ui::overlays::{Overlay, Picker};
use crate::utils::open_in_editor;

use crossterm::event::{KeyCode::*, KeyEvent, KeyModifiers};

use std::path::{Path, PathBuf};

/// Lines moved by the half-page scroll keys.
const SCROLL_STEP: isize = 20;

impl<'a> AppState<'a> {
    /// Entry point for every key press.
    pub fn handle_keypress(&mut self, key: KeyEvent) -> KeypressResult {
        if !self.input.is_navigation() {
            return self.handle_input_mode(key);
        }
        if self.overlay.is_some() {
            return self.handle_overlay_key(key);
        }

        let action = self.keymap.lookup(key);
        if self.preview.pane() == PaneMode::FullScreen
            && let Some(result) = self.handle_fullscreen_key(key, action)
        {
            return result;
        }

        match action {
            Some(Action::Nav(a)) => self.handle_nav_action(a),
            Some(Action::File(a)) => self.handle_file_action(a),
            Some(Action::View(a)) => self.handle_view_action(a),
            Some(Action::Session(a)) => self.handle_session_action(a),
            Some(Action::System(SystemAction::Quit)) => {
                self.save_last_dir();
                KeypressResult::Quit
            }
            None => KeypressResult::Continue,
        }
    }

    // Input mode

    /// Handles key events while a prompt is open.
    /// Consumes every key; Enter confirms and Esc cancels.
    fn handle_input_mode(&mut self, key: KeyEvent) -> KeypressResult {
        match key.code {
            Enter => {
                if let Some(outcome) = self.input.confirm() {
                    return self.dispatch_prompt(outcome);
                }
            }
            Esc => self.input.cancel(),
            Left => self.input.cursor_left(),
            Right => self.input.cursor_right(),
            Home => self.input.cursor_home(),
            End => self.input.cursor_end(),
            Backspace => self.input.backspace(),
            Delete => self.input.delete(),
            Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.input.cancel(),
            Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.input.insert(c);
                if let InputMode::Search { prompt } = self.input.mode() {
                    let query = prompt.text().to_string();
                    if self.nav.jump_to_match(&query) {
                        self.highlight_selected();
                    }
                }
            }
            _ => {}
        }
        KeypressResult::Consumed
    }

    /// Routes confirmed prompt text back to the command that opened the prompt.
    fn dispatch_prompt(&mut self, outcome: PromptOutcome) -> KeypressResult {
        let cwd = self.nav.current_dir().to_path_buf();
        match outcome {
            PromptOutcome::Search(query) => {
                if query.is_empty() {
                    return KeypressResult::Consumed;
                }
                if self.nav.jump_to_match(&query) {
                    self.highlight_selected();
                } else {
                    self.status(StatusMessage::error(format!("No match for '{query}'")));
                }
            }
            PromptOutcome::Rename { target, new_name } => {
                if let Some(name) = self.valid_name(&new_name) {
                    self.fileops.submit(FileOperation::Rename {
                        new: target.with_file_name(name),
                        old: target,
                    });
                }
            }
            PromptOutcome::Mkdir(name) => {
                if let Some(name) = self.valid_name(&name) {
                    self.fileops.submit(FileOperation::Create {
                        path: cwd.join(name),
                        is_dir: true,
                    });
                }
            }
            PromptOutcome::Touch(name) => {
                if let Some(name) = self.valid_name(&name) {
                    self.fileops.submit(FileOperation::Create {
                        path: cwd.join(name),
                        is_dir: false,
                    });
                }
            }
            PromptOutcome::Shell(command) => {
                if !command.trim().is_empty() {
                    self.fileops.submit(FileOperation::Shell { command, cwd });
                }
            }
            PromptOutcome::EditorPath(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return KeypressResult::Consumed;
                }
                let path = cwd.join(trimmed);
                if path.is_dir() {
                    self.status(StatusMessage::error(format!(
                        "'{trimmed}' is a directory"
                    )));
                    return KeypressResult::Consumed;
                }
                return self.open_editor(&path);
            }
            PromptOutcome::PinPath { path, original } => {
                let trimmed = path.trim();
                if trimmed.is_empty() {
                    return KeypressResult::Consumed;
                }
                let dir = cwd.join(trimmed);
                if !dir.is_dir() {
                    self.status(StatusMessage::error(format!(
                        "Not a directory: {}",
                        dir.display()
                    )));
                    return KeypressResult::Consumed;
                }
                self.input.enter(InputMode::pin_name(dir, original));
            }
            PromptOutcome::PinName {
                path,
                name,
                original,
            } => self.save_pin(&path, name, original),
        }
        KeypressResult::Consumed
    }

    fn valid_name<'n>(&self, name: &'n str) -> Option<&'n str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if name.contains(std::path::MAIN_SEPARATOR) || name == "." || name == ".." {
            self.status(StatusMessage::error(format!("Invalid name: '{name}'")));
            return None;
        }
        Some(name)
    }

    // Overlays

    fn handle_overlay_key(&mut self, key: KeyEvent) -> KeypressResult {
        let Some(overlay) = self.overlay.as_mut() else {
            return KeypressResult::Continue;
        };

        match overlay {
            Overlay::ConfirmDelete { targets } => match key.code {
                Char('y') | Char('Y') => {
                    let targets = std::mem::take(targets);
                    self.overlay = None;
                    self.fileops.submit(FileOperation::Delete(targets));
                }
                Char('n') | Char('N') | Esc | Char('q') => self.overlay = None,
                _ => {}
            },
            Overlay::ConfirmUnpin { pin, picker } => match key.code {
                Char('y') | Char('Y') => {
                    let path = pin.path.clone();
                    let mut picker = std::mem::take(picker);
                    if self.unpin(&path) {
                        picker.remove_selected();
                    }
                    self.overlay = (!picker.items().is_empty()).then_some(Overlay::Pins(picker));
                }
                Char('n') | Char('N') | Esc | Char('q') => {
                    let picker = std::mem::take(picker);
                    self.overlay = Some(Overlay::Pins(picker));
                }
                _ => {}
            },
            Overlay::Pins(_) | Overlay::History(_) => {
                let is_pins = matches!(overlay, Overlay::Pins(_));
                let Some(picker) = overlay.picker_mut() else {
                    return KeypressResult::Consumed;
                };
                match key.code {
                    Down | Char('j') => picker.select_next(),
                    Up | Char('k') => picker.select_prev(),
                    Enter | Char('l') => {
                        let target = picker.selected_path().map(Path::to_path_buf);
                        self.overlay = None;
                        if let Some(dir) = target {
                            self.jump_to_dir(dir);
                        }
                    }
                    Char('a') if is_pins => {
                        let cwd = self.nav.current_dir().to_string_lossy().into_owned();
                        self.input.enter(InputMode::pin_path(cwd, None));
                    }
                    Char('e') if is_pins => {
                        let selected = picker.selected_path().map(Path::to_path_buf);
                        if let Some(pin) = selected.and_then(|p| self.find_pin(&p)) {
                            self.input.enter(InputMode::pin_path("", Some(pin)));
                        }
                    }
                    Char('d') if is_pins => {
                        let picker = picker.clone();
                        let selected = picker.selected_path().map(Path::to_path_buf);
                        if let Some(pin) = selected.and_then(|p| self.find_pin(&p)) {
                            self.overlay = Some(Overlay::ConfirmUnpin { pin, picker });
                        }
                    }
                    Esc | Char('q') => self.overlay = None,
                    _ => {}
                }
            }
        }
        KeypressResult::Consumed
    }

    // Full screen preview

    /// Keys that mean something different while the preview fills the screen.
    /// Returns `None` to fall through to the normal handlers.
    fn handle_fullscreen_key(
        &mut self,
        key: KeyEvent,
        action: Option<Action>,
    ) -> Option<KeypressResult> {
        if key.code == Esc {
            self.preview.exit_fullscreen();
            self.set_pane(None);
            return Some(KeypressResult::Consumed);
        }
        match action? {
            Action::Nav(NavAction::GoDown) => self.preview.scroll_by(1),
            Action::Nav(NavAction::GoUp) => self.preview.scroll_by(-1),
            Action::Nav(NavAction::ScrollDown) => self.preview.scroll_by(SCROLL_STEP),
            Action::Nav(NavAction::ScrollUp) => self.preview.scroll_by(-SCROLL_STEP),
            Action::Nav(NavAction::GoToTop) => self.preview.scroll_to(0),
            Action::Nav(NavAction::GoToBottom) => self.preview.scroll_to(usize::MAX),
            Action::Nav(NavAction::GoParent) => {
                self.preview.exit_fullscreen();
                self.set_pane(None);
            }
            Action::Nav(NavAction::GoIntoDir) => {}
            _ => return None,
        }
        Some(KeypressResult::Consumed)
    }

    // Keymap actions

    fn handle_nav_action(&mut self, action: NavAction) -> KeypressResult {
        let moved = match action {
            NavAction::GoUp => self.nav.move_up(),
            NavAction::GoDown => self.nav.move_down(),
            NavAction::GoToTop => self.nav.move_to_top(),
            NavAction::GoToBottom => self.nav.move_to_bottom(),
            NavAction::GoParent => {
                if let Some(parent) = self.nav.current_dir().parent() {
                    let parent = parent.to_path_buf();
                    let child = self.nav.current_dir().file_name().map(|n| n.to_os_string());
                    self.request_dir_change(parent, child);
                }
                false
            }
            NavAction::GoIntoDir => {
                if let Some(entry) = self.nav.selected_entry() {
                    let path = entry.path().to_path_buf();
                    if entry.is_dir() {
                        self.request_dir_change(path, None);
                    } else {
                        self.bus.post(NavEvent::FileSelected(path));
                    }
                }
                false
            }
            NavAction::ScrollDown => {
                self.preview.scroll_by(SCROLL_STEP);
                false
            }
            NavAction::ScrollUp => {
                self.preview.scroll_by(-SCROLL_STEP);
                false
            }
        };
        if moved {
            self.highlight_selected();
        }
        KeypressResult::Continue
    }

    fn handle_file_action(&mut self, action: FileAction) -> KeypressResult {
        let selected = self.nav.selected_path();
        let mode = match action {
            FileAction::Search => InputMode::search(),
            FileAction::Rename => match selected {
                Some(path) => InputMode::rename(path),
                None => return KeypressResult::Continue,
            },
            FileAction::Create => InputMode::touch(),
            FileAction::CreateDirectory => InputMode::mkdir(),
            FileAction::Shell => InputMode::shell(),
            FileAction::EditorPath => {
                let initial = self
                    .nav
                    .selected_entry()
                    .filter(|e| !e.is_dir())
                    .map(|e| e.name_str().into_owned())
                    .unwrap_or_default();
                InputMode::editor_path(initial)
            }
            FileAction::OpenEditor => {
                return match self.nav.selected_entry() {
                    Some(entry) if !entry.is_dir() => {
                        let path = entry.path().to_path_buf();
                        self.open_editor(&path)
                    }
                    _ => KeypressResult::Continue,
                };
            }
            FileAction::Delete => {
                if let Some(path) = selected {
                    self.overlay = Some(Overlay::ConfirmDelete {
                        targets: vec![path],
                    });
                }
                return KeypressResult::Consumed;
            }
        };
        self.input.enter(mode);
        KeypressResult::Consumed
    }

    fn handle_view_action(&mut self, action: ViewAction) -> KeypressResult {
        match action {
            ViewAction::TogglePane => {
                let reload = self.preview.toggle_pane();
                self.set_pane(reload);
            }
            ViewAction::HidePane => {
                self.loader.invalidate(RequestKind::Read);
                self.preview.hide_pane();
                self.set_pane(None);
            }
            ViewAction::ToggleHidden => {
                self.scan_options.show_hidden = !self.scan_options.show_hidden;
                self.request_rescan(None);
            }
            ViewAction::CycleSort => {
                self.scan_options.sort = self.scan_options.sort.next();
                self.request_rescan(None);
            }
        }
        KeypressResult::Consumed
    }

    fn handle_session_action(&mut self, action: SessionAction) -> KeypressResult {
        let Some(store) = &self.session else {
            self.status(StatusMessage::error("Session storage unavailable"));
            return KeypressResult::Consumed;
        };
        match action {
            SessionAction::TogglePin => {
                let dir = self.nav.current_dir().to_path_buf();
                let result = if store.is_pinned(&dir) {
                    store.remove_pin(&dir).map(|_| "Unpinned")
                } else {
                    store.add_pin(&dir, None).map(|_| "Pinned")
                };
                match result {
                    Ok(msg) => self.status(StatusMessage::info(format!("{msg} {}", dir.display()))),
                    Err(e) => self.status(StatusMessage::error(e.to_string())),
                }
            }
            SessionAction::ShowPins => {
                self.overlay = Some(Overlay::Pins(Picker::from_pins(&store.load_pins())));
            }
            SessionAction::ShowHistory => {
                self.overlay = Some(Overlay::History(Picker::from_history(
                    &store.load_history(),
                )));
            }
        }
        KeypressResult::Consumed
    }

    // Helpers

    fn jump_to_dir(&mut self, dir: PathBuf) {
        if dir.is_dir() {
            self.request_dir_change(dir, None);
        } else {
            self.status(StatusMessage::error(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }
    }

    /// Removes the pin for `path`. Returns true if it was removed.
    fn unpin(&self, path: &Path) -> bool {
        let Some(store) = &self.session else {
            return false;
        };
        match store.remove_pin(path) {
            Ok(removed) => removed,
            Err(e) => {
                self.status(StatusMessage::error(e.to_string()));
                false
            }
        }
    }

    fn find_pin(&self, path: &Path) -> Option<Pin> {
        self.session
            .as_ref()?
            .load_pins()
            .into_iter()
            .find(|p| p.path == path)
    }

    /// Stores the pin for `path`, dropping `original` first when the edit moved it
    /// to another directory, then refreshes an open pins overlay.
    fn save_pin(&mut self, path: &Path, name: String, original: Option<Pin>) {
        let Some(store) = &self.session else {
            self.status(StatusMessage::error("Session storage unavailable"));
            return;
        };
        let resolved = resolve_path(path);
        let moved = original
            .as_ref()
            .filter(|old| resolve_path(&old.path) != resolved);
        let result = match moved {
            Some(old) => store
                .remove_pin(&old.path)
                .and_then(|_| store.add_pin(path, Some(name))),
            None => store.add_pin(path, Some(name)),
        };
        let pins = store.load_pins();

        match result {
            Ok(_) => {
                let verb = if original.is_some() { "Updated pin" } else { "Pinned" };
                self.status(StatusMessage::info(format!("{verb} {}", resolved.display())));
            }
            Err(e) => self.status(StatusMessage::error(e.to_string())),
        }
        if matches!(self.overlay, Some(Overlay::Pins(_))) {
            let mut picker = Picker::from_pins(&pins);
            picker.select_path(&resolved);
            self.overlay = Some(Overlay::Pins(picker));
        }
    }

    fn open_editor(&mut self, path: &Path) -> KeypressResult {
        let editor = self.config.general().editor();
        if !editor.exists() {
            self.status(StatusMessage::error(format!(
                "Editor '{}' not found",
                editor.cmd()
            )));
            return KeypressResult::Consumed;
        }
        if let Err(e) = open_in_editor(editor, path) {
            tracing::warn!(error = %e, path = %path.display(), "editor failed");
            self.status(StatusMessage::error(format!("Editor failed: {e}")));
        }
        // the file may have changed on disk
        let focus = path.file_name().map(|n| n.to_os_string());
        self.request_rescan(focus);
        KeypressResult::OpenedEditor
    }
}
