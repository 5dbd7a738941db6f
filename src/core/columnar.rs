//! Parquet preview.
//!
//! Parquet keeps its schema and row counts in a footer at the end of the file. For a file
//! larger than the read cap, the read worker hands over only the head and the tail, so
//! [SparseFile] serves the parquet reader from those two regions while reporting the full
//! file length. Rows whose column chunks fall in the gap are reported as not loaded.

use crate::core::formatter::{format_byte_count, sanitize_line};
use crate::core::handlers::{PreviewView, RenderOptions, table_lines, truncation_note};
use crate::core::loader::FileContent;

use bytes::{Buf, Bytes};
use parquet::errors::{ParquetError, Result as ParquetResult};
use parquet::file::reader::{ChunkReader, FileReader, Length, SerializedFileReader};
use parquet::record::Field;

/// Head and tail of a file with an unloaded gap between them.
struct SparseFile {
    head: Bytes,
    tail: Bytes,
    tail_start: u64,
    len: u64,
}

impl SparseFile {
    fn new(content: &FileContent) -> Self {
        Self {
            head: Bytes::copy_from_slice(&content.bytes),
            tail: Bytes::copy_from_slice(&content.tail),
            tail_start: content.tail_offset(),
            len: content.total_size,
        }
    }

    fn missing(start: u64, end: u64) -> ParquetError {
        ParquetError::General(format!("bytes {start}..{end} were not loaded"))
    }
}

impl Length for SparseFile {
    fn len(&self) -> u64 {
        self.len
    }
}

impl ChunkReader for SparseFile {
    type T = bytes::buf::Reader<Bytes>;

    /// Reader over the rest of whichever loaded region contains `start`.
    fn get_read(&self, start: u64) -> ParquetResult<Self::T> {
        if start < self.head.len() as u64 {
            return Ok(self.head.slice(start as usize..).reader());
        }
        if start >= self.tail_start && start < self.len {
            let from = (start - self.tail_start) as usize;
            return Ok(self.tail.slice(from..).reader());
        }
        Err(Self::missing(start, self.len))
    }

    fn get_bytes(&self, start: u64, length: usize) -> ParquetResult<Bytes> {
        let end = start.saturating_add(length as u64);
        if end > self.len {
            return Err(ParquetError::General(format!(
                "range {start}..{end} is past the end of the file"
            )));
        }
        if end <= self.head.len() as u64 {
            return Ok(self.head.slice(start as usize..end as usize));
        }
        if start >= self.tail_start {
            let from = (start - self.tail_start) as usize;
            return Ok(self.tail.slice(from..from + length));
        }
        Err(Self::missing(start, end))
    }
}

fn cell_text(field: &Field) -> String {
    match field {
        Field::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_parquet(content: &FileContent, options: &RenderOptions) -> PreviewView {
    let mut view = PreviewView::new("parquet");

    let reader = match SerializedFileReader::new(SparseFile::new(content)) {
        Ok(reader) => reader,
        Err(e) => {
            view.header.push(format!("Invalid Parquet: {e}"));
            view.header.extend(truncation_note(content));
            return view;
        }
    };

    let metadata = reader.metadata();
    let file_meta = metadata.file_metadata();
    let schema = file_meta.schema_descr();
    let fields = schema.root_schema().get_fields();
    let total_rows = file_meta.num_rows().max(0) as u64;

    view.header.push(format!(
        "{} rows × {} columns",
        format_byte_count(total_rows),
        fields.len()
    ));
    view.header.push(format!("{} row groups", metadata.num_row_groups()));
    view.header.extend(truncation_note(content));

    let leaves: Vec<(String, String)> = schema
        .columns()
        .iter()
        .map(|c| (c.path().string(), c.physical_type().to_string()))
        .collect();
    let name_width = leaves.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    view.lines.push("Schema".into());
    view.lines.extend(
        leaves
            .iter()
            .map(|(name, ty)| sanitize_line(&format!("  {name:<name_width$}  {ty}"))),
    );
    view.lines.push(String::new());

    let head: Vec<String> = fields.iter().map(|f| f.name().to_string()).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut unreadable = None;
    match reader.get_row_iter(None) {
        Ok(iter) => {
            for row in iter.take(options.csv_rows) {
                match row {
                    Ok(row) => rows.push(row.get_column_iter().map(|(_, f)| cell_text(f)).collect()),
                    Err(e) => {
                        unreadable = Some(e);
                        break;
                    }
                }
            }
        }
        Err(e) => unreadable = Some(e),
    }

    view.lines.extend(table_lines(&head, &rows));
    if let Some(e) = unreadable {
        tracing::debug!(path = %content.path.display(), error = %e, "parquet rows not readable");
        view.lines.push(format!(
            "... rows after the first {} are not loaded",
            format_byte_count(rows.len() as u64)
        ));
    } else if total_rows > rows.len() as u64 {
        view.lines.push(format!(
            "... {} more rows",
            format_byte_count(total_rows - rows.len() as u64)
        ));
    }
    view
}
