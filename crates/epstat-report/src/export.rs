//! CSV reading and writing for the exported report tables.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use epstat_core::EpstatError;

/// Write `rows` to `path` with a header row taken from the field names.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), EpstatError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| EpstatError::io(path, e))?;
    tracing::info!(file = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

/// Read every row of a headed CSV file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EpstatError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    reader
        .deserialize()
        .enumerate()
        .map(|(idx, row)| {
            row.map_err(|e| EpstatError::Csv(format!("{} row {}: {e}", path.display(), idx + 1)))
        })
        .collect()
}

fn csv_error(path: &Path, err: csv::Error) -> EpstatError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => EpstatError::io(path, source),
        other => EpstatError::Csv(format!("{}: {other:?}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        value: f64,
    }

    #[test]
    fn header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let rows = vec![
            Row { name: "a".into(), value: 1.5 },
            Row { name: "b, c".into(), value: -2.0 },
        ];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("name,value\n"));
        assert!(text.contains("\"b, c\""));
        let back: Vec<Row> = read_csv(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn missing_file_is_io_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv::<Row>(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn bad_row_reports_row_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "name,value\na,1\nb,oops\n").unwrap();
        let err = read_csv::<Row>(&path).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }
}
