//! Input configuration options for ncview.
//!
//! Defines the `[keys]` table and the editor command. Key strings use the same syntax
//! as the keymap parser: `"k"`, `"Shift+n"`, `"ctrl+d"`, `"<c-u>"`, `"space"`, `"enter"`.

use serde::Deserialize;

/// Key lists for every bindable action.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Keys {
    go_up: Vec<String>,
    go_down: Vec<String>,
    go_parent: Vec<String>,
    go_into_dir: Vec<String>,
    go_to_top: Vec<String>,
    go_to_bottom: Vec<String>,
    scroll_down: Vec<String>,
    scroll_up: Vec<String>,
    quit: Vec<String>,
    search: Vec<String>,
    rename: Vec<String>,
    create: Vec<String>,
    create_directory: Vec<String>,
    shell: Vec<String>,
    editor_path: Vec<String>,
    open_editor: Vec<String>,
    delete: Vec<String>,
    toggle_pane: Vec<String>,
    hide_pane: Vec<String>,
    toggle_hidden: Vec<String>,
    cycle_sort: Vec<String>,
    toggle_pin: Vec<String>,
    show_pins: Vec<String>,
    show_history: Vec<String>,
}

macro_rules! accessor {
    ($($name:ident),+ $(,)?) => {
        impl Keys {
            $(
                #[inline]
                pub fn $name(&self) -> &[String] {
                    &self.$name
                }
            )+
        }
    };
}

accessor!(
    go_up,
    go_down,
    go_parent,
    go_into_dir,
    go_to_top,
    go_to_bottom,
    scroll_down,
    scroll_up,
    quit,
    search,
    rename,
    create,
    create_directory,
    shell,
    editor_path,
    open_editor,
    delete,
    toggle_pane,
    hide_pane,
    toggle_hidden,
    cycle_sort,
    toggle_pin,
    show_pins,
    show_history,
);

impl Default for Keys {
    fn default() -> Self {
        Keys {
            go_up: vec!["k".into(), "Up".into()],
            go_down: vec!["j".into(), "Down".into()],
            go_parent: vec!["h".into(), "Left".into(), "Backspace".into()],
            go_into_dir: vec!["l".into(), "Right".into(), "Enter".into()],
            go_to_top: vec!["g".into(), "Home".into()],
            go_to_bottom: vec!["Shift+g".into(), "End".into()],
            scroll_down: vec!["Ctrl+d".into()],
            scroll_up: vec!["Ctrl+u".into()],

            quit: vec!["q".into(), "Ctrl+c".into()],

            search: vec!["/".into()],
            rename: vec!["r".into()],
            create: vec!["n".into()],
            create_directory: vec!["Shift+n".into()],
            shell: vec!["!".into()],
            editor_path: vec!["Shift+e".into()],
            open_editor: vec!["e".into()],
            delete: vec!["d".into()],

            toggle_pane: vec!["w".into(), "Tab".into()],
            hide_pane: vec!["z".into()],
            toggle_hidden: vec![".".into()],
            cycle_sort: vec!["s".into()],
            toggle_pin: vec!["p".into()],
            show_pins: vec!["Shift+p".into()],
            show_history: vec!["Shift+h".into()],
        }
    }
}

/// Editor command used for "open in editor".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    cmd: String,
}

impl Editor {
    pub fn new(cmd: impl Into<String>) -> Self {
        Editor { cmd: cmd.into() }
    }

    #[inline]
    pub fn cmd(&self) -> &str {
        let trimmed = self.cmd.trim();
        if trimmed.is_empty() { "vim" } else { trimmed }
    }

    /// Checks that the command resolves on `PATH`.
    pub fn exists(&self) -> bool {
        let program = self.cmd().split_whitespace().next().unwrap_or("vim");
        which::which(program).is_ok()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Editor { cmd: "vim".into() }
    }
}
