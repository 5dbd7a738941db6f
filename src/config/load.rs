//! The main config loading module for ncview.
//!
//! Handles loading and deserializing settings from `ncview.toml`.
//!
//! Provides the main [Config] struct, as well as the internal [RawConfig] used for parsing.
//! Also implements default config generation for `ncview --init`.

use crate::config::{General, InternalGeneral, Keys, Preview, PreviewSettings};
use crate::error::{NcviewError, Result};
use crate::utils::config_dir;

use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf};

pub const CONFIG_FILE: &str = "ncview.toml";

/// Raw configuration as read from the toml file.
/// Converted into [Config] right after parsing.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
    preview: Preview,
    keys: Keys,
}

/// Processed configuration used by ncview.
#[derive(Debug)]
pub struct Config {
    general: InternalGeneral,
    preview: PreviewSettings,
    keys: Keys,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            preview: PreviewSettings::from(raw.preview),
            keys: raw.keys,
        }
    }
}

impl Config {
    /// Loads the configuration from [Config::default_path].
    ///
    /// A missing file silently yields the defaults. A file that cannot be read or parsed
    /// also yields the defaults, with the error logged.
    pub fn load() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Parses a config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str::<RawConfig>(content)
            .map(Config::from)
            .map_err(|e| NcviewError::config(e.to_string()))
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn preview(&self) -> &PreviewSettings {
        &self.preview
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Determines the configuration file path.
    /// `NCVIEW_CONFIG` names the file directly, otherwise `ncview.toml` in [config_dir].
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("NCVIEW_CONFIG")
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        config_dir().join(CONFIG_FILE)
    }

    /// Writes the default configuration file. Fails if the file already exists.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_TOML)
    }
}

impl Default for Config {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

const DEFAULT_TOML: &str = r##"# ncview.toml - default configuration for ncview
# Commented values are the internal defaults.

[general]
# show_hidden = false
# sort = "name"            # "name", "size" or "modified"
# dirs_first = false
# editor = "vim"           # falls back to $EDITOR, then vim

[preview]
# pane = "split"           # "split" or "hidden"
# debounce_ms = 100
# binary_peek_bytes = 512
# max_bytes = 10485760
# max_lines = 10000
# csv_rows = 1000

# [keys]
# go_up = ["k", "Up"]
# go_down = ["j", "Down"]
# go_parent = ["h", "Left", "Backspace"]
# go_into_dir = ["l", "Right", "Enter"]
# go_to_top = ["g", "Home"]
# go_to_bottom = ["Shift+g", "End"]
# scroll_down = ["Ctrl+d"]
# scroll_up = ["Ctrl+u"]
# quit = ["q", "Ctrl+c"]
# search = ["/"]
# rename = ["r"]
# create = ["n"]
# create_directory = ["Shift+n"]
# shell = ["!"]
# editor_path = ["Shift+e"]
# open_editor = ["e"]
# delete = ["d"]
# toggle_pane = ["w", "Tab"]
# hide_pane = ["z"]
# toggle_hidden = ["."]
# cycle_sort = ["s"]
# toggle_pin = ["p"]
# show_pins = ["Shift+p"]
# show_history = ["Shift+h"]
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaneSetting;
    use crate::core::SortKey;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert!(!config.general().show_hidden());
        assert!(!config.general().dirs_first());
        assert_eq!(config.general().sort(), SortKey::Name);
        assert_eq!(config.preview().debounce(), Duration::from_millis(100));
        assert_eq!(config.preview().peek_bytes(), 512);
        assert_eq!(config.preview().pane(), PaneSetting::Split);
        assert_eq!(config.preview().render_options().max_lines, 10_000);
        assert_eq!(config.preview().render_options().csv_rows, 1_000);
    }

    #[test]
    fn parse_partial_config() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let config = Config::parse(
            r#"
            [general]
            show_hidden = true
            sort = "modified"

            [preview]
            pane = "hidden"
            debounce_ms = 250

            [keys]
            quit = ["x"]
            "#,
        )?;
        assert!(config.general().show_hidden());
        assert_eq!(config.general().sort(), SortKey::Modified);
        assert_eq!(config.preview().pane(), PaneSetting::Hidden);
        assert_eq!(config.preview().debounce(), Duration::from_millis(250));
        assert_eq!(config.keys().quit(), ["x".to_string()]);
        // untouched tables keep their defaults
        assert_eq!(config.keys().go_up(), ["k".to_string(), "Up".to_string()]);
        Ok(())
    }

    #[test]
    fn invalid_sort_is_a_config_error() {
        let err = Config::parse("[general]\nsort = \"color\"\n");
        assert!(matches!(err, Err(NcviewError::Config(_))));
    }

    #[test]
    fn generated_default_parses() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        Config::generate_default(&path)?;
        let config = Config::load_from(&path)?;
        assert_eq!(config.general().sort(), SortKey::Name);

        let again = Config::generate_default(&path);
        assert!(again.is_err());
        Ok(())
    }
}
