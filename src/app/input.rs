//! Modal input for ncview.
//!
//! [InputModeController] is the only place that knows which prompt is open. Every
//! non-navigation [InputMode] is entered from [InputMode::Navigation] and leaves back to
//! it through [InputModeController::confirm] or [InputModeController::cancel], both of
//! which end in the same teardown.

use crate::session::Pin;

use std::path::PathBuf;

/// Text buffer with a char-based cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    cursor: usize,
}

impl Prompt {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

/// Mutually exclusive input modes. Every modal variant carries its own buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Navigation,
    Search { prompt: Prompt },
    RenamePrompt { prompt: Prompt, target: PathBuf },
    MkdirPrompt { prompt: Prompt },
    TouchPrompt { prompt: Prompt },
    ShellCommand { prompt: Prompt },
    EditorPath { prompt: Prompt },
    /// First step of adding (`original` is None) or editing a pin.
    PinPath { prompt: Prompt, original: Option<Pin> },
    /// Second step: the display name for the already chosen `path`.
    PinName {
        prompt: Prompt,
        path: PathBuf,
        original: Option<Pin>,
    },
}

impl InputMode {
    pub fn search() -> Self {
        Self::Search {
            prompt: Prompt::default(),
        }
    }

    /// Rename prompt prefilled with the current file name.
    pub fn rename(target: PathBuf) -> Self {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::RenamePrompt {
            prompt: Prompt::with_text(name),
            target,
        }
    }

    pub fn mkdir() -> Self {
        Self::MkdirPrompt {
            prompt: Prompt::default(),
        }
    }

    pub fn touch() -> Self {
        Self::TouchPrompt {
            prompt: Prompt::default(),
        }
    }

    pub fn shell() -> Self {
        Self::ShellCommand {
            prompt: Prompt::default(),
        }
    }

    /// Editor path prompt prefilled with `initial` (usually the highlighted file).
    pub fn editor_path(initial: impl Into<String>) -> Self {
        Self::EditorPath {
            prompt: Prompt::with_text(initial),
        }
    }

    /// Pin path prompt. Prefilled with `initial` when adding, with the pin's path when editing.
    pub fn pin_path(initial: impl Into<String>, original: Option<Pin>) -> Self {
        let text = match &original {
            Some(pin) => pin.path.to_string_lossy().into_owned(),
            None => initial.into(),
        };
        Self::PinPath {
            prompt: Prompt::with_text(text),
            original,
        }
    }

    pub fn pin_name(path: PathBuf, original: Option<Pin>) -> Self {
        let name = original.as_ref().map(|p| p.name.clone()).unwrap_or_default();
        Self::PinName {
            prompt: Prompt::with_text(name),
            path,
            original,
        }
    }

    fn prompt(&self) -> Option<&Prompt> {
        match self {
            Self::Navigation => None,
            Self::Search { prompt }
            | Self::RenamePrompt { prompt, .. }
            | Self::MkdirPrompt { prompt }
            | Self::TouchPrompt { prompt }
            | Self::ShellCommand { prompt }
            | Self::EditorPath { prompt }
            | Self::PinPath { prompt, .. }
            | Self::PinName { prompt, .. } => Some(prompt),
        }
    }

    fn prompt_mut(&mut self) -> Option<&mut Prompt> {
        match self {
            Self::Navigation => None,
            Self::Search { prompt }
            | Self::RenamePrompt { prompt, .. }
            | Self::MkdirPrompt { prompt }
            | Self::TouchPrompt { prompt }
            | Self::ShellCommand { prompt }
            | Self::EditorPath { prompt }
            | Self::PinPath { prompt, .. }
            | Self::PinName { prompt, .. } => Some(prompt),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Navigation => "",
            Self::Search { .. } => "/",
            Self::RenamePrompt { .. } => "Rename: ",
            Self::MkdirPrompt { .. } => "New directory: ",
            Self::TouchPrompt { .. } => "New file: ",
            Self::ShellCommand { .. } => "!",
            Self::EditorPath { .. } => "Edit: ",
            Self::PinPath { .. } => "Pin path: ",
            Self::PinName { .. } => "Pin name: ",
        }
    }
}

/// Confirmed input, routed back to the command that opened the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Search(String),
    Rename { target: PathBuf, new_name: String },
    Mkdir(String),
    Touch(String),
    Shell(String),
    EditorPath(String),
    PinPath {
        path: String,
        original: Option<Pin>,
    },
    PinName {
        path: PathBuf,
        name: String,
        original: Option<Pin>,
    },
}

#[derive(Debug, Default)]
pub struct InputModeController {
    mode: InputMode,
}

impl InputModeController {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    #[inline]
    pub fn is_navigation(&self) -> bool {
        self.mode == InputMode::Navigation
    }

    /// Opens `mode`. Refused (returns false) unless currently in Navigation.
    pub fn enter(&mut self, mode: InputMode) -> bool {
        if !self.is_navigation() {
            tracing::debug!(current = ?self.mode, "refusing nested input mode");
            return false;
        }
        self.mode = mode;
        true
    }

    #[inline]
    pub fn prompt(&self) -> Option<&Prompt> {
        self.mode.prompt()
    }

    pub fn insert(&mut self, c: char) {
        if let Some(p) = self.mode.prompt_mut() {
            p.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(p) = self.mode.prompt_mut() {
            p.backspace();
        }
    }

    pub fn delete(&mut self) {
        if let Some(p) = self.mode.prompt_mut() {
            p.delete();
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some(p) = self.mode.prompt_mut() {
            p.left();
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(p) = self.mode.prompt_mut() {
            p.right();
        }
    }

    pub fn cursor_home(&mut self) {
        if let Some(p) = self.mode.prompt_mut() {
            p.home();
        }
    }

    pub fn cursor_end(&mut self) {
        if let Some(p) = self.mode.prompt_mut() {
            p.end();
        }
    }

    /// Leaves the current mode and hands back the buffered input.
    /// Returns `None` in Navigation.
    pub fn confirm(&mut self) -> Option<PromptOutcome> {
        let outcome = match self.teardown() {
            InputMode::Navigation => return None,
            InputMode::Search { prompt } => PromptOutcome::Search(prompt.text),
            InputMode::RenamePrompt { prompt, target } => PromptOutcome::Rename {
                target,
                new_name: prompt.text,
            },
            InputMode::MkdirPrompt { prompt } => PromptOutcome::Mkdir(prompt.text),
            InputMode::TouchPrompt { prompt } => PromptOutcome::Touch(prompt.text),
            InputMode::ShellCommand { prompt } => PromptOutcome::Shell(prompt.text),
            InputMode::EditorPath { prompt } => PromptOutcome::EditorPath(prompt.text),
            InputMode::PinPath { prompt, original } => PromptOutcome::PinPath {
                path: prompt.text,
                original,
            },
            InputMode::PinName {
                prompt,
                path,
                original,
            } => PromptOutcome::PinName {
                path,
                name: prompt.text,
                original,
            },
        };
        Some(outcome)
    }

    /// Leaves the current mode and discards the buffer.
    pub fn cancel(&mut self) {
        self.teardown();
    }

    /// The single exit path: resets to Navigation and returns the closed mode.
    fn teardown(&mut self) -> InputMode {
        std::mem::take(&mut self.mode)
    }
}
