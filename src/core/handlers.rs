//! Built-in preview handlers for ncview.
//!
//! A handler is a pure render function over a [FileContent] payload that the read worker
//! already loaded. It produces a [PreviewView]: a few header lines (summary, parse errors)
//! and the body lines shown in the preview pane. Handlers never touch the filesystem.

use crate::core::columnar::render_parquet;
use crate::core::formatter::{
    format_byte_count, format_file_size, format_file_time, format_permissions, sanitize_line,
};
use crate::core::loader::FileContent;
use crate::core::registry::HandlerDescriptor;

use unicode_width::UnicodeWidthStr;

pub const TEXT_PRIORITY: i32 = -1;
pub const FALLBACK_PRIORITY: i32 = -100;
pub const TABULAR_PRIORITY: i32 = 10;
pub const STRUCTURED_PRIORITY: i32 = 5;

/// Default line cap for text bodies.
pub const DEFAULT_MAX_LINES: usize = 10_000;
/// Default number of data rows shown for delimited files.
pub const DEFAULT_CSV_ROWS: usize = 1_000;

const MAX_COLUMN_WIDTH: usize = 40;
const MAX_OUTLINE: usize = 20;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "log", "rs", "py", "js", "ts", "tsx", "jsx", "c", "h", "cpp", "hpp", "go", "java",
    "kt", "rb", "lua", "sh", "bash", "zsh", "fish", "ini", "cfg", "conf", "env", "xml",
    "html", "css", "scss", "sql", "r", "jl", "swift", "zig", "nix", "lock", "diff", "patch",
];

/// Limits applied while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub max_lines: usize,
    pub csv_rows: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            csv_rows: DEFAULT_CSV_ROWS,
        }
    }
}

/// Rendered preview, owned by the preview session while mounted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewView {
    pub handler: &'static str,
    pub header: Vec<String>,
    pub lines: Vec<String>,
}

impl PreviewView {
    pub(crate) fn new(handler: &'static str) -> Self {
        Self {
            handler,
            ..Self::default()
        }
    }

    /// Single-line view used for directory summaries and inline errors.
    pub fn message(handler: &'static str, msg: impl Into<String>) -> Self {
        Self {
            handler,
            header: vec![msg.into()],
            lines: Vec::new(),
        }
    }
}

/// Descriptors registered by default, without the text and fallback pair.
pub fn builtin_descriptors() -> Vec<HandlerDescriptor> {
    vec![
        HandlerDescriptor::new("csv", &["csv", "tsv", "tab"], TABULAR_PRIORITY, render_csv),
        HandlerDescriptor::new("parquet", &["parquet", "pq"], TABULAR_PRIORITY, render_parquet),
        HandlerDescriptor::new(
            "json",
            &["json", "geojson", "jsonl"],
            STRUCTURED_PRIORITY,
            render_json,
        ),
        HandlerDescriptor::new(
            "markdown",
            &["md", "markdown", "mkd", "mdx"],
            STRUCTURED_PRIORITY,
            render_markdown,
        ),
        HandlerDescriptor::new("toml", &["toml"], STRUCTURED_PRIORITY, render_toml),
        HandlerDescriptor::new("yaml", &["yaml", "yml"], STRUCTURED_PRIORITY, render_yaml),
    ]
}

pub fn text_descriptor() -> HandlerDescriptor {
    HandlerDescriptor::new("text", TEXT_EXTENSIONS, TEXT_PRIORITY, render_text)
}

pub fn fallback_descriptor() -> HandlerDescriptor {
    HandlerDescriptor::new("fallback", &[], FALLBACK_PRIORITY, render_metadata)
}

pub(crate) fn truncation_note(content: &FileContent) -> Option<String> {
    content.truncated.then(|| {
        format!(
            "[showing first {} of {} bytes]",
            format_byte_count(content.bytes.len() as u64),
            format_byte_count(content.total_size)
        )
    })
}

/// Sanitized body lines capped at `max_lines`, with a notice when lines were cut.
fn body_lines(text: &str, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().take(max_lines).map(sanitize_line).collect();
    let total = text.lines().count();
    if total > max_lines {
        lines.push(format!("... truncated ({max_lines} of {total} lines shown)"));
    }
    lines
}

pub fn render_text(content: &FileContent, options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("text");
    view.header.extend(truncation_note(content));
    view.lines = body_lines(&content.text(), options.max_lines);
    view
}

fn delimiter_for(content: &FileContent) -> char {
    let ext = content
        .path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "tsv" | "tab" => '\t',
        _ => ',',
    }
}

/// Splits one record, honouring double-quoted fields and `""` escapes.
fn split_record(line: &str, delim: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn pad_cell(cell: &str, width: usize) -> String {
    let cell = sanitize_line(cell);
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in cell.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

/// Aligned table: the header row, a rule, then `rows`. Cells wider than
/// `MAX_COLUMN_WIDTH` are cut.
pub(crate) fn table_lines(head: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let columns = std::iter::once(head.len())
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for record in std::iter::once(head).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in record.iter().enumerate() {
            widths[i] = widths[i].max(sanitize_line(cell).width().min(MAX_COLUMN_WIDTH));
        }
    }

    let format_row = |record: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad_cell(record.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(head));
    lines.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    lines.extend(rows.iter().map(|r| format_row(r.as_slice())));
    lines
}

pub fn render_csv(content: &FileContent, options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("csv");
    let delim = delimiter_for(content);
    let text = content.text();

    let records: Vec<Vec<String>> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| split_record(l, delim))
        .collect();
    let Some((head, rows)) = records.split_first() else {
        view.header.push("Empty table".into());
        return view;
    };

    let columns = records.iter().map(Vec::len).max().unwrap_or(0);
    let prefix = if content.truncated { "at least " } else { "" };
    view.header.push(format!(
        "{prefix}{} rows × {columns} columns",
        format_byte_count(rows.len() as u64)
    ));
    view.header.extend(truncation_note(content));

    let shown = &rows[..rows.len().min(options.csv_rows)];
    view.lines = table_lines(head, shown);
    if rows.len() > shown.len() {
        view.lines.push(format!(
            "... {} more rows",
            format_byte_count((rows.len() - shown.len()) as u64)
        ));
    }
    view
}

fn describe_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => format!("object with {} keys", map.len()),
        serde_json::Value::Array(items) => format!("array with {} items", items.len()),
        serde_json::Value::String(_) => "string".into(),
        serde_json::Value::Number(_) => "number".into(),
        serde_json::Value::Bool(_) => "boolean".into(),
        serde_json::Value::Null => "null".into(),
    }
}

fn is_json_lines(content: &FileContent) -> bool {
    content
        .path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl"))
}

pub fn render_json(content: &FileContent, options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("json");
    let text = content.text();

    if is_json_lines(content) {
        let mut records = 0;
        let mut invalid = 0;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<serde_json::Value>(line) {
                Ok(value) => {
                    records += 1;
                    if view.lines.len() < options.max_lines {
                        view.lines.push(sanitize_line(&value.to_string()));
                    }
                }
                Err(_) => invalid += 1,
            }
        }
        view.header.push(format!("{records} records"));
        if invalid > 0 {
            view.header.push(format!("{invalid} invalid lines skipped"));
        }
        view.header.extend(truncation_note(content));
        return view;
    }

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => {
            view.header.push(describe_json(&value));
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string());
            view.lines = body_lines(&pretty, options.max_lines);
        }
        Err(e) => {
            view.header.push(format!("Invalid JSON: {e}"));
            view.lines = body_lines(&text, options.max_lines);
        }
    }
    view.header.extend(truncation_note(content));
    view
}

pub fn render_toml(content: &FileContent, options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("toml");
    let text = content.text();

    match toml::from_str::<toml::Table>(&text) {
        Ok(table) => {
            view.header.push(format!("{} top-level keys", table.len()));
            let pretty = toml::to_string_pretty(&table).unwrap_or_else(|_| text.to_string());
            view.lines = body_lines(&pretty, options.max_lines);
        }
        Err(e) => {
            let msg = e.message().to_string();
            view.header.push(format!("Invalid TOML: {msg}"));
            view.lines = body_lines(&text, options.max_lines);
        }
    }
    view.header.extend(truncation_note(content));
    view
}

pub fn render_markdown(content: &FileContent, options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("markdown");
    let text = content.text();

    let mut in_fence = false;
    let mut outline = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        if (1..=6).contains(&level) && trimmed[level..].starts_with(' ') {
            outline.push((level, trimmed[level..].trim().to_string()));
        }
    }

    view.header.push(format!("{} headings", outline.len()));
    view.header.extend(
        outline
            .iter()
            .take(MAX_OUTLINE)
            .map(|(level, title)| format!("{}- {}", "  ".repeat(level - 1), sanitize_line(title))),
    );
    view.header.extend(truncation_note(content));
    view.lines = body_lines(&text, options.max_lines);
    view
}

pub fn render_yaml(content: &FileContent, options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("yaml");
    let text = content.text();

    match serde_yaml::from_str::<serde_yaml::Value>(&text) {
        Ok(serde_yaml::Value::Mapping(map)) => {
            let keys: Vec<String> = map
                .keys()
                .filter_map(|k| match k {
                    serde_yaml::Value::String(s) => Some(s.clone()),
                    other => serde_yaml::to_string(other)
                        .ok()
                        .map(|s| s.trim().to_string()),
                })
                .collect();
            view.header.push(format!("{} top-level keys", keys.len()));
            if !keys.is_empty() {
                view.header
                    .push(sanitize_line(&format!("keys: {}", keys.join(", "))));
            }
        }
        Ok(serde_yaml::Value::Sequence(items)) => {
            view.header.push(format!("sequence with {} items", items.len()));
        }
        Ok(_) => view.header.push("scalar document".into()),
        Err(e) => view.header.push(format!("Invalid YAML: {e}")),
    }
    view.header.extend(truncation_note(content));
    view.lines = body_lines(&text, options.max_lines);
    view
}

/// Metadata table for binary or otherwise unpreviewable files.
pub fn render_metadata(content: &FileContent, _options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("fallback");
    view.header.push(if content.meta.special {
        "Not a regular file, no preview".into()
    } else {
        "Binary file, no preview".into()
    });

    let name = content
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind_char = if content.meta.is_symlink { 'l' } else { '-' };

    let mut rows = vec![
        ("Name", name),
        ("Path", content.path.display().to_string()),
        ("Size", format_file_size(content.total_size, false)),
        ("Size (bytes)", format_byte_count(content.total_size)),
        ("Modified", format_file_time(content.meta.modified)),
        (
            "Permissions",
            format_permissions(content.meta.permissions, kind_char),
        ),
    ];
    if let Some(target) = &content.meta.symlink_target {
        rows.push(("Link target", target.display().to_string()));
    }

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    view.lines = rows
        .into_iter()
        .map(|(label, value)| format!("{label:<label_width$}  {}", sanitize_line(&value)))
        .collect();
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::FileMeta;
    use std::path::PathBuf;

    fn content(name: &str, body: &str) -> FileContent {
        FileContent::from_bytes(PathBuf::from("/data").join(name), body.as_bytes())
    }

    #[test]
    fn text_caps_lines_with_notice() {
        let body = (1..=5).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let opts = RenderOptions {
            max_lines: 3,
            ..RenderOptions::default()
        };
        let view = render_text(&content("a.txt", &body), &opts);
        assert_eq!(view.lines.len(), 4);
        assert_eq!(view.lines[0], "line 1");
        assert_eq!(view.lines[3], "... truncated (3 of 5 lines shown)");
    }

    #[test]
    fn text_reports_byte_truncation() {
        let mut c = content("a.txt", "abc");
        c.total_size = 5000;
        c.truncated = true;
        let view = render_text(&c, &RenderOptions::default());
        assert_eq!(view.header, vec!["[showing first 3 of 5,000 bytes]"]);
    }

    #[test]
    fn csv_aligns_columns() {
        let view = render_csv(
            &content("t.csv", "name,age\nalice,30\n\"smith, bob\",4\n"),
            &RenderOptions::default(),
        );
        assert_eq!(view.header[0], "2 rows × 2 columns");
        assert_eq!(view.lines[0], "name       │ age");
        assert_eq!(view.lines[2], "alice      │ 30");
        assert_eq!(view.lines[3], "smith, bob │ 4");
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let view = render_csv(
            &content("t.tsv", "a\tb\tc\n1\t2\t3\n"),
            &RenderOptions::default(),
        );
        assert_eq!(view.header[0], "1 rows × 3 columns");
    }

    #[test]
    fn csv_limits_rows() {
        let body = std::iter::once("id".to_string())
            .chain((0..10).map(|i| i.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let opts = RenderOptions {
            csv_rows: 4,
            ..RenderOptions::default()
        };
        let view = render_csv(&content("t.csv", &body), &opts);
        // header + rule + 4 rows + notice
        assert_eq!(view.lines.len(), 7);
        assert_eq!(view.lines[6], "... 6 more rows");
    }

    #[test]
    fn split_record_handles_escaped_quotes() {
        assert_eq!(
            split_record(r#"a,"say ""hi""",c"#, ','),
            vec!["a", r#"say "hi""#, "c"]
        );
        assert_eq!(split_record("", ','), vec![""]);
    }

    #[test]
    fn json_pretty_prints() {
        let view = render_json(&content("a.json", r#"{"a":1,"b":[1,2]}"#), &RenderOptions::default());
        assert_eq!(view.header[0], "object with 2 keys");
        assert_eq!(view.lines[0], "{");
        assert!(view.lines.iter().any(|l| l.contains("\"a\": 1")));
    }

    #[test]
    fn invalid_json_falls_back_to_text() {
        let view = render_json(&content("a.json", "{oops"), &RenderOptions::default());
        assert!(view.header[0].starts_with("Invalid JSON"));
        assert_eq!(view.lines, vec!["{oops"]);
    }

    #[test]
    fn jsonl_counts_records() {
        let view = render_json(
            &content("a.jsonl", "{\"a\":1}\n{\"a\":2}\nnot json\n"),
            &RenderOptions::default(),
        );
        assert_eq!(view.header[0], "2 records");
        assert_eq!(view.header[1], "1 invalid lines skipped");
        assert_eq!(view.lines, vec![r#"{"a":1}"#, r#"{"a":2}"#]);
    }

    #[test]
    fn toml_summarises_keys() {
        let view = render_toml(
            &content("c.toml", "title = \"x\"\n[owner]\nname = \"y\"\n"),
            &RenderOptions::default(),
        );
        assert_eq!(view.header[0], "2 top-level keys");
        assert!(view.lines.iter().any(|l| l.contains("[owner]")));
    }

    #[test]
    fn markdown_outline_skips_code_fences() {
        let body = "# Title\n\n```sh\n# not a heading\n```\n## Usage\n#nospace\n";
        let view = render_markdown(&content("r.md", body), &RenderOptions::default());
        assert_eq!(view.header[0], "2 headings");
        assert_eq!(view.header[1], "- Title");
        assert_eq!(view.header[2], "  - Usage");
    }

    #[test]
    fn yaml_lists_top_level_keys() {
        let view = render_yaml(
            &content("c.yml", "name: ncview\nversion: 3\n"),
            &RenderOptions::default(),
        );
        assert_eq!(view.header[0], "2 top-level keys");
        assert_eq!(view.header[1], "keys: name, version");
        assert_eq!(view.lines.len(), 2);
    }

    #[test]
    fn metadata_table_lists_fields() {
        let mut c = FileContent::from_bytes("/bin/blob", vec![0u8; 2048]);
        c.meta = FileMeta {
            permissions: Some(0o755),
            ..FileMeta::default()
        };
        let view = render_metadata(&c, &RenderOptions::default());
        let joined = view.lines.join("\n");
        assert!(joined.contains("Name          blob"));
        assert!(joined.contains("Size (bytes)  2,048"));
        assert!(joined.contains("-rwxr-xr-x"));
        assert!(!joined.contains("Link target"));
    }

    #[test]
    fn special_file_is_labelled_as_such() {
        let mut c = FileContent::from_bytes("/run/feed", Vec::new());
        c.meta.special = true;
        let view = render_metadata(&c, &RenderOptions::default());
        assert_eq!(view.header, vec!["Not a regular file, no preview".to_string()]);
    }

    #[test]
    fn table_lines_pad_short_records() {
        let head = vec!["a".to_string(), "bb".to_string()];
        let rows = vec![vec!["1".to_string()], vec!["22".to_string(), "3".to_string()]];
        let lines = table_lines(&head, &rows);
        assert_eq!(lines[0], "a  │ bb");
        assert_eq!(lines[1], "───┼───");
        assert_eq!(lines[2], "1  │");
        assert_eq!(lines[3], "22 │ 3");
    }
}
