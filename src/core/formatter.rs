//! Display formatting helpers for ncview.
//!
//! Formats sizes, timestamps and permission bits for the listing and the metadata
//! preview, and cleans raw text lines so they can be drawn safely in a pane.

use chrono::{DateTime, Local};
use humansize::{BINARY, format_size};
use unicode_width::UnicodeWidthChar;

use std::time::SystemTime;

const TAB_WIDTH: usize = 4;

/// Formats a byte count into a human-readable string.
/// Directories show "-".
pub fn format_file_size(size: u64, is_dir: bool) -> String {
    if is_dir {
        "-".into()
    } else {
        format_size(size, BINARY)
    }
}

/// Formats a byte count with thousands separators, e.g. `1,048,576`.
pub fn format_byte_count(size: u64) -> String {
    let digits = size.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats the modification time, or "-" if unknown.
pub fn format_file_time(modified: Option<SystemTime>) -> String {
    modified
        .map(|mtime| {
            let dt: DateTime<Local> = DateTime::from(mtime);
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

/// Formats unix permission bits in `ls -l` style, e.g. `drwxr-xr-x`.
pub fn format_permissions(mode: Option<u32>, kind_char: char) -> String {
    let Some(mode) = mode else {
        return format!("{kind_char}?????????");
    };
    let mut chars = [kind_char, '-', '-', '-', '-', '-', '-', '-', '-', '-'];
    for (i, shift) in [6u32, 3, 0].iter().enumerate() {
        let base = 1 + i * 3;
        if (mode >> (shift + 2)) & 1 != 0 {
            chars[base] = 'r';
        }
        if (mode >> (shift + 1)) & 1 != 0 {
            chars[base + 1] = 'w';
        }
        if (mode >> shift) & 1 != 0 {
            chars[base + 2] = 'x';
        }
    }
    chars.iter().collect()
}

/// Expands tabs and drops control characters so a line renders predictably.
pub fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let spaces = TAB_WIDTH - (col % TAB_WIDTH);
            out.extend(std::iter::repeat_n(' ', spaces));
            col += spaces;
            continue;
        }
        if ch.is_control() {
            continue;
        }
        out.push(ch);
        col += ch.width().unwrap_or(0);
    }
    out
}

/// Truncates or pads a string so it occupies exactly `pane_width` terminal cells.
pub fn sanitize_to_exact_width(line: &str, pane_width: usize) -> String {
    let mut out = String::with_capacity(pane_width);
    let mut current_w = 0;

    for ch in sanitize_line(line).chars() {
        let w = ch.width().unwrap_or(0);
        if current_w + w > pane_width {
            break;
        }
        out.push(ch);
        current_w += w;
    }

    if current_w < pane_width {
        out.push_str(&" ".repeat(pane_width - current_w));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_width_truncates_and_pads() {
        let pane_width = 10;
        let cases = ["short.txt", "very_long_filename.txt", "🦀_crab.rs", "\t_tab"];

        for input in cases {
            let result = sanitize_to_exact_width(input, pane_width);
            let actual = unicode_width::UnicodeWidthStr::width(result.as_str());
            assert_eq!(actual, pane_width, "bad width for {input:?}: {result:?}");
            assert!(!result.chars().any(|c| c.is_control()));
        }
    }

    #[test]
    fn sanitize_expands_tabs_to_stops() {
        assert_eq!(sanitize_line("a\tb"), "a   b");
        assert_eq!(sanitize_line("\tx"), "    x");
        assert_eq!(sanitize_line("bell\u{7}!"), "bell!");
    }

    #[test]
    fn byte_count_groups_thousands() {
        assert_eq!(format_byte_count(0), "0");
        assert_eq!(format_byte_count(999), "999");
        assert_eq!(format_byte_count(1000), "1,000");
        assert_eq!(format_byte_count(1048576), "1,048,576");
    }

    #[test]
    fn permissions_render_like_ls() {
        assert_eq!(format_permissions(Some(0o755), 'd'), "drwxr-xr-x");
        assert_eq!(format_permissions(Some(0o644), '-'), "-rw-r--r--");
        assert_eq!(format_permissions(None, 'l'), "l?????????");
    }

    #[test]
    fn size_for_directory_is_dash() {
        assert_eq!(format_file_size(4096, true), "-");
        assert_eq!(format_file_size(0, false), "0 B");
    }
}
