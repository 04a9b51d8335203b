use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::converter::ConversionError;

/// Line-oriented output labelled with the path used in diagnostics
pub struct Sink<W: Write> {
    path: PathBuf,
    writer: W,
}

impl Sink<BufWriter<File>> {
    /// Create (or truncate) the output file at `path`
    pub fn create(path: &Path) -> Result<Self, ConversionError> {
        let file = File::create(path).map_err(|source| ConversionError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, BufWriter::new(file)))
    }

    /// Flush buffered records and sync the file to disk.
    ///
    /// A failed sync happens after every record was handed to the OS, so it is
    /// only reported as a warning.
    pub fn close(self) -> Result<(), ConversionError> {
        let path = self.path.clone();
        let file = self
            .finish()?
            .into_inner()
            .map_err(|e| ConversionError::Write {
                path: path.clone(),
                source: e.into_error(),
            })?;

        if let Err(e) = file.sync_all() {
            warn!(path = %path.display(), error = %e, "could not sync output file");
        }
        Ok(())
    }
}

impl<W: Write> Sink<W> {
    pub fn new(path: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record followed by a newline
    pub fn write_line(&mut self, line: &str) -> Result<(), ConversionError> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|source| self.write_error(source))
    }

    pub fn flush(&mut self) -> Result<(), ConversionError> {
        self.writer.flush().map_err(|source| self.write_error(source))
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, ConversionError> {
        self.flush()?;
        Ok(self.writer)
    }

    fn write_error(&self, source: io::Error) -> ConversionError {
        ConversionError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_writes_lines() {
        let mut sink = Sink::new("entities.dat", Vec::new());
        sink.write_line("a\tb").unwrap();
        sink.write_line("c\td").unwrap();

        let bytes = sink.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a\tb\nc\td\n");
    }

    #[test]
    fn test_sink_create_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relations.dat");

        let mut sink = Sink::create(&path).unwrap();
        sink.write_line("rating.explicit\t1").unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "rating.explicit\t1\n");
    }

    #[test]
    fn test_sink_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("entities.dat");

        match Sink::create(&path) {
            Err(ConversionError::Write { path: failed, .. }) => assert_eq!(failed, path),
            _ => panic!("expected a write error"),
        }
    }
}
