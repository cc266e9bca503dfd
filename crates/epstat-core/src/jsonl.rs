//! # JSONL Scanning
//!
//! Reads line-delimited JSON files one line at a time. Blank lines are
//! skipped, line numbers are 1-based and count blank lines too. A line that
//! is not UTF-8 or fails to parse is recorded as a [`LineError`], logged,
//! and the scan moves on.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{EpstatError, LineError, LineErrorKind};

/// One successfully parsed line.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonlRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    /// Parsed value.
    pub value: Value,
}

/// Result of scanning one file.
#[derive(Debug, Clone)]
pub struct JsonlScan {
    /// The scanned file.
    pub path: PathBuf,
    /// Parsed records in file order.
    pub records: Vec<JsonlRecord>,
    /// Lines that failed to decode or parse.
    pub errors: Vec<LineError>,
}

/// Raw lines of a file, numbered from 1, line terminator included.
struct RawLines<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R: BufRead> RawLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
        }
    }

    /// Read the next line into the buffer. `Ok(None)` at end of file.
    fn next_line(&mut self) -> std::io::Result<Option<(usize, &[u8])>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some((self.line, self.buf.as_slice())))
    }
}

/// True when the bytes are valid UTF-8 holding only whitespace.
fn is_blank(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok_and(|s| s.trim().is_empty())
}

/// Scan `path`, parsing every non-blank line.
///
/// With `limit = Some(n)` the scan stops once `n` records were parsed.
///
/// # Errors
///
/// Returns `EpstatError::Io` if the file cannot be opened or a read fails.
/// Invalid UTF-8 on a line is a line error, not a file error.
pub fn scan_file(path: &Path, limit: Option<usize>) -> Result<JsonlScan, EpstatError> {
    let file = File::open(path).map_err(|e| EpstatError::io(path, e))?;
    let mut lines = RawLines::new(BufReader::new(file));

    let mut scan = JsonlScan {
        path: path.to_path_buf(),
        records: Vec::new(),
        errors: Vec::new(),
    };

    loop {
        if limit.is_some_and(|n| scan.records.len() >= n) {
            break;
        }
        let Some((line_num, bytes)) = lines.next_line().map_err(|e| EpstatError::io(path, e))?
        else {
            break;
        };
        if is_blank(bytes) {
            continue;
        }

        let parsed = std::str::from_utf8(bytes)
            .map_err(|e| format!("invalid UTF-8: {e}"))
            .and_then(|text| serde_json::from_str::<Value>(text.trim()).map_err(|e| e.to_string()));
        match parsed {
            Ok(value) => scan.records.push(JsonlRecord {
                line: line_num,
                value,
            }),
            Err(message) => {
                let err = LineError {
                    path: path.to_path_buf(),
                    line: line_num,
                    kind: LineErrorKind::Parse,
                    message,
                };
                tracing::warn!(file = %path.display(), line = line_num, "{err}");
                scan.errors.push(err);
            }
        }
    }

    tracing::debug!(
        file = %path.display(),
        records = scan.records.len(),
        errors = scan.errors.len(),
        "scanned jsonl file"
    );
    Ok(scan)
}

/// Count the non-blank lines of `path`. Lines that are not UTF-8 count.
pub fn count_non_blank_lines(path: &Path) -> Result<usize, EpstatError> {
    let file = File::open(path).map_err(|e| EpstatError::io(path, e))?;
    let mut lines = RawLines::new(BufReader::new(file));
    let mut count = 0;
    while let Some((_, bytes)) = lines.next_line().map_err(|e| EpstatError::io(path, e))? {
        if !is_blank(bytes) {
            count += 1;
        }
    }
    Ok(count)
}
