//! Nerd Font icons for the entry listing.
//!
//! Icons are grouped by what ncview can preview: tabular, structured and markup files
//! get their own glyphs, everything else falls back to a generic file icon.

use crate::core::DirectoryEntry;

use phf::phf_map;

const DIR: &str = "\u{e5ff}";
const DIR_LINK: &str = "\u{f482}";
const FILE_LINK: &str = "\u{f481}";
const FILE: &str = "\u{f0f6}";

const TABLE: &str = "\u{f0ce}";
const BRACES: &str = "\u{e60b}";
const GEAR: &str = "\u{e615}";
const MARKDOWN: &str = "\u{f48a}";
const ARCHIVE: &str = "\u{f1c6}";
const IMAGE: &str = "\u{f03e}";
const CODE: &str = "\u{f121}";
const DATABASE: &str = "\u{f1c0}";

/// Lowercase extension to icon.
static EXT_ICONS: phf::Map<&'static str, &'static str> = phf_map! {
    "csv" => TABLE,
    "tsv" => TABLE,
    "tab" => TABLE,
    "xls" => TABLE,
    "xlsx" => TABLE,
    "parquet" => DATABASE,
    "sqlite" => DATABASE,
    "db" => DATABASE,
    "json" => BRACES,
    "jsonl" => BRACES,
    "geojson" => BRACES,
    "toml" => GEAR,
    "yaml" => GEAR,
    "yml" => GEAR,
    "ini" => GEAR,
    "cfg" => GEAR,
    "md" => MARKDOWN,
    "markdown" => MARKDOWN,
    "mdx" => MARKDOWN,
    "zip" => ARCHIVE,
    "tar" => ARCHIVE,
    "gz" => ARCHIVE,
    "xz" => ARCHIVE,
    "zst" => ARCHIVE,
    "png" => IMAGE,
    "jpg" => IMAGE,
    "jpeg" => IMAGE,
    "gif" => IMAGE,
    "svg" => IMAGE,
    "rs" => CODE,
    "py" => CODE,
    "js" => CODE,
    "ts" => CODE,
    "go" => CODE,
    "c" => CODE,
    "h" => CODE,
    "sh" => CODE,
    "sql" => CODE,
};

/// Whole file names that say more than their extension.
static NAME_ICONS: phf::Map<&'static str, &'static str> = phf_map! {
    "cargo.toml" => GEAR,
    "cargo.lock" => GEAR,
    "makefile" => GEAR,
    "dockerfile" => GEAR,
    "readme" => MARKDOWN,
    "license" => FILE,
};

pub fn entry_icon(entry: &DirectoryEntry) -> &'static str {
    if entry.is_symlink() {
        return if entry.is_dir() { DIR_LINK } else { FILE_LINK };
    }
    if entry.is_dir() {
        return DIR;
    }

    let name = entry.lowercase_name();
    if let Some(icon) = NAME_ICONS.get(name) {
        return icon;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => EXT_ICONS.get(ext).copied().unwrap_or(FILE),
        _ => FILE,
    }
}
