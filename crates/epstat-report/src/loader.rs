//! # Episode Loading
//!
//! Turns input paths into decoded episodes. A file that cannot be opened
//! is warned about and skipped; a line that does not parse or decode is
//! warned about with its line number and skipped. Nothing here is fatal.

use std::path::{Path, PathBuf};

use epstat_core::{scan_file, Episode, EpstatError, LineError, LineErrorKind};

/// One decoded episode with its origin.
#[derive(Debug, Clone)]
pub struct LoadedEpisode {
    /// Source file.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// The decoded record.
    pub episode: Episode,
}

impl LoadedEpisode {
    /// File name of the source, without directories.
    pub fn file_name(&self) -> String {
        file_name(&self.file)
    }
}

/// Everything decoded from one file.
#[derive(Debug, Clone)]
pub struct FileLoad {
    /// The file.
    pub path: PathBuf,
    /// File size on disk.
    pub size_bytes: u64,
    /// Episodes in file order.
    pub episodes: Vec<LoadedEpisode>,
    /// Lines that failed to parse or decode.
    pub errors: Vec<LineError>,
}

/// Episodes from a list of files.
#[derive(Debug, Clone, Default)]
pub struct EpisodeSet {
    /// Loaded files in argument order.
    pub files: Vec<FileLoad>,
    /// Files that could not be read.
    pub skipped: Vec<PathBuf>,
}

impl EpisodeSet {
    /// All episodes, file by file, in file order.
    pub fn episodes(&self) -> impl Iterator<Item = &LoadedEpisode> {
        self.files.iter().flat_map(|f| f.episodes.iter())
    }

    /// Total rejected lines across files.
    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }
}

/// Load and decode every episode in `path`.
pub fn load_file(path: &Path) -> Result<FileLoad, EpstatError> {
    let size_bytes = std::fs::metadata(path)
        .map_err(|e| EpstatError::io(path, e))?
        .len();
    let scan = scan_file(path, None)?;

    let mut episodes = Vec::with_capacity(scan.records.len());
    let mut errors = scan.errors;
    for record in scan.records {
        match Episode::from_value(record.value) {
            Ok(episode) => episodes.push(LoadedEpisode {
                file: path.to_path_buf(),
                line: record.line,
                episode,
            }),
            Err(e) => {
                let err = LineError {
                    path: path.to_path_buf(),
                    line: record.line,
                    kind: LineErrorKind::Processing,
                    message: e.to_string(),
                };
                tracing::warn!(file = %path.display(), line = record.line, "{err}");
                errors.push(err);
            }
        }
    }

    Ok(FileLoad {
        path: path.to_path_buf(),
        size_bytes,
        episodes,
        errors,
    })
}

/// Load every path in order, skipping unreadable files with a warning.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> EpisodeSet {
    let mut set = EpisodeSet::default();
    for path in paths {
        let path = path.as_ref();
        match load_file(path) {
            Ok(load) => {
                tracing::info!(
                    file = %path.display(),
                    episodes = load.episodes.len(),
                    rejected = load.errors.len(),
                    "loaded episode file"
                );
                set.files.push(load);
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("file not found: {}", path.display());
                set.skipped.push(path.to_path_buf());
            }
            Err(e) => {
                tracing::warn!("skipping {}: {e}", path.display());
                set.skipped.push(path.to_path_buf());
            }
        }
    }
    tracing::debug!(
        files = set.files.len(),
        skipped = set.skipped.len(),
        rejected_lines = set.error_count(),
        "loaded episode set"
    );
    set
}

/// File name component of `path`, or the whole path if it has none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_become_processing_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eps.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"trajectory":{"actions":[{"action_type":"A"}],"rewards":[1]}}"#,
                "\n",
                r#"{"trajectory":{"rewards":"oops"}}"#,
                "\n",
                "not json\n",
            ),
        )
        .unwrap();

        let load = load_file(&path).unwrap();
        assert_eq!(load.episodes.len(), 1);
        assert_eq!(load.errors.len(), 2);
        let kinds: Vec<_> = load.errors.iter().map(|e| (e.line, e.kind)).collect();
        assert!(kinds.contains(&(2, LineErrorKind::Processing)));
        assert!(kinds.contains(&(3, LineErrorKind::Parse)));
        assert!(load.size_bytes > 0);
    }

    #[test]
    fn invalid_utf8_line_keeps_the_rest_of_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eps.jsonl");
        let good = br#"{"trajectory":{"actions":[{"action_type":"A"}],"rewards":[99]}}"#;
        let mut bytes = good.to_vec();
        bytes.extend_from_slice(b"\n{\"agent_name\":\"\xff\xfe\"}\n");
        bytes.extend_from_slice(good);
        bytes.push(b'\n');
        std::fs::write(&path, bytes).unwrap();

        let set = load_files(&[&path]);
        assert!(set.skipped.is_empty());
        assert_eq!(set.episodes().count(), 2);
        assert_eq!(set.error_count(), 1);
        assert_eq!(set.files[0].errors[0].line, 2);
        assert_eq!(set.files[0].errors[0].kind, LineErrorKind::Parse);
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.jsonl");
        std::fs::write(&present, "{}\n").unwrap();
        let missing = dir.path().join("b.jsonl");

        let set = load_files(&[missing.clone(), present]);
        assert_eq!(set.files.len(), 1);
        assert_eq!(set.skipped, vec![missing]);
        assert_eq!(set.episodes().count(), 1);
        assert_eq!(set.error_count(), 0);
    }

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(file_name(Path::new("/tmp/runs/a.jsonl")), "a.jsonl");
    }
}
