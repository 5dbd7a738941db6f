//! Key mapping and action dispatch system for ncview
//!
//! Maps keys to actions, parses key strings from the config, and defines the enum
//! variants for all navigation, file, view, session and system actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Represents any action in the app.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Nav(NavAction),
    File(FileAction),
    View(ViewAction),
    Session(SessionAction),
    System(SystemAction),
}

/// Navigation actions (move, into_parent, scroll etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NavAction {
    GoParent,
    GoIntoDir,
    GoUp,
    GoDown,
    GoToTop,
    GoToBottom,
    ScrollDown,
    ScrollUp,
}

/// File actions, mostly opening one of the input prompts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileAction {
    Search,
    Rename,
    Create,
    CreateDirectory,
    Shell,
    EditorPath,
    OpenEditor,
    Delete,
}

/// Pane and listing toggles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewAction {
    TogglePane,
    HidePane,
    ToggleHidden,
    CycleSort,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    TogglePin,
    ShowPins,
    ShowHistory,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SystemAction {
    Quit,
}

/// Key + modifiers as used in keybind/keymap
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    /// Shift is folded into the character itself, since terminals disagree on whether
    /// `G` or `!` arrive with the SHIFT modifier.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Key {
                code: self.code,
                modifiers: self.modifiers - KeyModifiers::SHIFT,
            },
            _ => self,
        }
    }
}

/// Stores the mapping from Key to action, which is built from the config
pub struct Keymap {
    map: HashMap<Key, Action>,
}

impl Keymap {
    /// Builds the keymap from the config
    #[rustfmt::skip]
    pub fn from_config(config: &crate::config::Config) -> Self {
        let mut map = HashMap::new();
        let keys = config.keys();

        macro_rules! bind {
            ($keys:expr, $action:expr) => {
                bind($keys, $action, &mut map);
            };
        }

        use NavAction as N;
        use FileAction as F;
        use ViewAction as V;
        use SessionAction as S;

        // NavActions
        bind!(keys.go_parent(),         Action::Nav(N::GoParent));
        bind!(keys.go_into_dir(),       Action::Nav(N::GoIntoDir));
        bind!(keys.go_up(),             Action::Nav(N::GoUp));
        bind!(keys.go_down(),           Action::Nav(N::GoDown));
        bind!(keys.go_to_top(),         Action::Nav(N::GoToTop));
        bind!(keys.go_to_bottom(),      Action::Nav(N::GoToBottom));
        bind!(keys.scroll_down(),       Action::Nav(N::ScrollDown));
        bind!(keys.scroll_up(),         Action::Nav(N::ScrollUp));

        // FileActions
        bind!(keys.search(),            Action::File(F::Search));
        bind!(keys.rename(),            Action::File(F::Rename));
        bind!(keys.create(),            Action::File(F::Create));
        bind!(keys.create_directory(),  Action::File(F::CreateDirectory));
        bind!(keys.shell(),             Action::File(F::Shell));
        bind!(keys.editor_path(),       Action::File(F::EditorPath));
        bind!(keys.open_editor(),       Action::File(F::OpenEditor));
        bind!(keys.delete(),            Action::File(F::Delete));

        // ViewActions
        bind!(keys.toggle_pane(),       Action::View(V::TogglePane));
        bind!(keys.hide_pane(),         Action::View(V::HidePane));
        bind!(keys.toggle_hidden(),     Action::View(V::ToggleHidden));
        bind!(keys.cycle_sort(),        Action::View(V::CycleSort));

        // SessionActions
        bind!(keys.toggle_pin(),        Action::Session(S::TogglePin));
        bind!(keys.show_pins(),         Action::Session(S::ShowPins));
        bind!(keys.show_history(),      Action::Session(S::ShowHistory));

        // SystemActions
        bind!(keys.quit(),              Action::System(SystemAction::Quit));

        Keymap { map }
    }

    /// Looks up the action for a given key event
    pub fn lookup(&self, key: KeyEvent) -> Option<Action> {
        let k = Key {
            code: key.code,
            modifiers: key.modifiers,
        };
        self.map.get(&k.normalized()).copied()
    }
}

/// Parses a key string from the config.
///
/// Accepts `"k"`, `"Shift+g"`, `"ctrl+d"`, `"<c-d>"`, `"space"`, `"enter"`, `"F5"` ...
pub fn parse_key(s: &str) -> Option<Key> {
    let mut modifiers = KeyModifiers::NONE;
    let mut code: Option<KeyCode> = None;

    // single character keys are taken literally so "+" and "-" stay bindable
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key {
            code: KeyCode::Char(c),
            modifiers,
        });
    }

    let is_bracketed = s.starts_with('<') && s.ends_with('>');
    let mut input = s.trim_start_matches('<').trim_end_matches('>').to_string();

    if is_bracketed && input.contains('-') {
        let parts: Vec<&str> = input.split('-').collect();

        for &prefix in parts.iter().take(parts.len().saturating_sub(1)) {
            match prefix.to_lowercase().as_str() {
                "c" | "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "a" | "m" | "alt" => modifiers |= KeyModifiers::ALT,
                "s" | "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }
        input = parts.last()?.to_string();
    }

    let normalized = input.replace('-', "+");
    for part in normalized.split('+') {
        let p_low = part.to_lowercase();
        match p_low.as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" | "meta" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,

            "up" => code = Some(KeyCode::Up),
            "down" => code = Some(KeyCode::Down),
            "left" => code = Some(KeyCode::Left),
            "right" => code = Some(KeyCode::Right),
            "home" => code = Some(KeyCode::Home),
            "end" => code = Some(KeyCode::End),
            "pageup" => code = Some(KeyCode::PageUp),
            "pagedown" => code = Some(KeyCode::PageDown),
            "enter" => code = Some(KeyCode::Enter),
            "esc" => code = Some(KeyCode::Esc),
            "backspace" | "back" => code = Some(KeyCode::Backspace),
            "tab" => code = Some(KeyCode::Tab),
            "space" | "spc" => code = Some(KeyCode::Char(' ')),

            _ => {
                if part.chars().count() == 1 {
                    let mut c = part.chars().next()?;
                    if modifiers.contains(KeyModifiers::SHIFT) {
                        c = c.to_ascii_uppercase();
                    }
                    code = Some(KeyCode::Char(c));
                } else if p_low.starts_with('f')
                    && p_low.len() > 1
                    && p_low[1..].chars().all(|c| c.is_ascii_digit())
                {
                    let n = p_low[1..].parse().ok()?;
                    code = Some(KeyCode::F(n));
                } else if part.is_empty() {
                    continue;
                } else {
                    return None;
                }
            }
        }
    }

    Some(
        Key {
            code: code?,
            modifiers,
        }
        .normalized(),
    )
}

fn bind(key_list: &[String], action: Action, map: &mut HashMap<Key, Action>) {
    for k in key_list {
        match parse_key(k) {
            Some(key) => {
                map.insert(key, action);
            }
            None => tracing::warn!(key = %k, ?action, "ignoring unparsable key binding"),
        }
    }
}
