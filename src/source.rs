//! Line-oriented reading of MovieLens source files.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::converter::ConversionError;

/// An input file (or any buffered reader) labelled with the path used in diagnostics
pub struct Source<R> {
    path: PathBuf,
    reader: R,
}

impl Source<BufReader<File>> {
    /// Open `path` for reading; a missing file is reported as `InputNotFound`
    pub fn open(path: &Path) -> Result<Self, ConversionError> {
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConversionError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => ConversionError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(Self::new(path, BufReader::new(file)))
    }
}

impl<R: BufRead> Source<R> {
    pub fn new(path: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            path: path.into(),
            reader,
        }
    }

    /// Decoded rows in file order; read failures carry the source path
    pub fn rows(self) -> impl Iterator<Item = Result<String, ConversionError>> {
        let path = self.path;
        SourceLines::new(self.reader).map(move |line| {
            line.map_err(|source| ConversionError::Read {
                path: path.clone(),
                source,
            })
        })
    }
}

/// Iterates the lines of a source file as owned strings.
///
/// Lines that are not valid UTF-8 are decoded as ISO-8859-1, which is how the
/// 1M dataset encodes accented titles. Line terminators (`\n`, `\r\n`) are removed.
pub struct SourceLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> SourceLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for SourceLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(decode_line(&self.buf))),
            Err(e) => Some(Err(e)),
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(line) => line.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Split a row on `delimiter`, dropping trailing empty fields.
///
/// `"1|2||"` has two fields and a blank line has none.
pub fn split_fields<'a>(line: &'a str, delimiter: &str) -> Vec<&'a str> {
    let mut fields: Vec<&str> = line.split(delimiter).collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_split_fields_drops_trailing_empties() {
        assert_eq!(split_fields("1|2||", "|"), vec!["1", "2"]);
        assert_eq!(split_fields("1||3", "|"), vec!["1", "", "3"]);
        assert!(split_fields("", "|").is_empty());
    }

    #[test]
    fn test_split_fields_multichar_delimiter() {
        assert_eq!(
            split_fields("1::Toy Story (1995)::Animation|Comedy", "::"),
            vec!["1", "Toy Story (1995)", "Animation|Comedy"]
        );
    }

    #[test]
    fn test_source_lines_strips_terminators() {
        let input = Cursor::new(b"a|b\r\nc|d\nlast".to_vec());
        let lines: Vec<String> = SourceLines::new(input).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["a|b", "c|d", "last"]);
    }

    #[test]
    fn test_source_lines_latin1_fallback() {
        // "Café" with a Latin-1 encoded e-acute
        let input = Cursor::new(vec![b'C', b'a', b'f', 0xE9, b'\n']);
        let lines: Vec<String> = SourceLines::new(input).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["Café"]);
    }

    #[test]
    fn test_source_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("u.user");
        match Source::open(&missing) {
            Err(ConversionError::InputNotFound { path }) => assert_eq!(path, missing),
            Err(other) => panic!("expected InputNotFound, got {:?}", other),
            Ok(_) => panic!("expected InputNotFound for a missing file"),
        }
    }

    #[test]
    fn test_source_rows() {
        let source = Source::new("ratings.dat", Cursor::new(b"1::2::3::4\n\n".to_vec()));
        let rows: Vec<String> = source.rows().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, vec!["1::2::3::4", ""]);
    }

    #[test]
    fn test_source_lines_keeps_utf8() {
        let input = Cursor::new("Amélie\n".as_bytes().to_vec());
        let lines: Vec<String> = SourceLines::new(input).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["Amélie"]);
    }
}
