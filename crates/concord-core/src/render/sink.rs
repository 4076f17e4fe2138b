use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ConcordError;

/// Destination for finished documents.
///
/// `commit` receives the complete document; implementations must not
/// leave a partial file behind if writing fails.
pub trait DocumentSink {
    fn commit(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ConcordError>;
}

/// Writes documents into a directory, atomically via a temp file + rename.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sink that writes to `path`'s directory. Returns the sink and file name.
    pub fn for_path(path: &Path) -> Result<(Self, String), ConcordError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ConcordError::RenderFailure(format!("invalid output path {}", path.display()))
            })?
            .to_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((Self::new(dir), filename))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSink for FileSink {
    fn commit(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ConcordError> {
        let target = self.dir.join(filename);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| ConcordError::Io(e.error))?;
        info!(path = %target.display(), bytes = bytes.len(), "wrote document");
        Ok(())
    }
}

/// Keeps committed documents in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub documents: Vec<(String, Vec<u8>)>,
}

impl DocumentSink for MemorySink {
    fn commit(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ConcordError> {
        self.documents.push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_writes_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path());
        sink.commit("report.pdf", b"%PDF-1.5 body").unwrap();
        let written = std::fs::read(dir.path().join("report.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.5 body");
        // Only the final file remains.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_sink_missing_dir_fails() {
        let mut sink = FileSink::new("/nonexistent/concord-out");
        assert!(sink.commit("report.pdf", b"x").is_err());
    }

    #[test]
    fn test_for_path_splits_dir_and_name() {
        let (sink, name) = FileSink::for_path(Path::new("out/report.pdf")).unwrap();
        assert_eq!(sink.dir(), Path::new("out"));
        assert_eq!(name, "report.pdf");

        let (sink, _) = FileSink::for_path(Path::new("report.pdf")).unwrap();
        assert_eq!(sink.dir(), Path::new("."));
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::default();
        sink.commit("a.pdf", b"1").unwrap();
        assert_eq!(sink.documents, vec![("a.pdf".to_string(), b"1".to_vec())]);
    }
}
