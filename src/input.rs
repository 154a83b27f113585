use anyhow::{Context, Result};
use bstr::ByteSlice;
use camino::Utf8PathBuf;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

/// Represents one input row: a line of text read from a file or stdin.
pub struct Line<'a> {
    /// The content of the line, excluding the line terminator.
    content: &'a [u8],
}

impl<'a> Line<'a> {
    /// Create a new Line from a byte slice, expected to be a complete line.
    #[inline]
    pub fn new(full: &'a [u8]) -> Line<'a> {
        let content = full.strip_suffix(b"\n").unwrap_or(full);
        let content = content.strip_suffix(b"\r").unwrap_or(content);
        Line { content }
    }

    /// Get the content of the line, excluding the line terminator.
    #[inline]
    pub fn content(&self) -> &'a [u8] {
        self.content
    }

    /// The row value as text. Invalid UTF-8 is replaced, which later fails
    /// address validation like any other malformed value.
    pub fn to_value(&self) -> String {
        self.content.to_str_lossy().into_owned()
    }
}

/// A source that can be either a file or stdin.
#[derive(Default, Clone, Debug)]
pub enum FileOrStdin {
    /// Input from a file.
    File(Utf8PathBuf),
    /// Input from stdin.
    #[default]
    Stdin,
}

impl fmt::Display for FileOrStdin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrStdin::File(path) => write!(f, "{}", path),
            FileOrStdin::Stdin => write!(f, "<stdin>"),
        }
    }
}

impl FileOrStdin {
    /// Create a new FileOrStdin from a path.
    ///
    /// If the path is "-", stdin is used.
    pub fn from_path(path: Utf8PathBuf) -> Self {
        if path.as_str() == "-" {
            FileOrStdin::Stdin
        } else {
            FileOrStdin::File(path)
        }
    }

    /// Open the input source as a reader.
    pub fn reader(&self) -> Result<InputReader> {
        match self {
            FileOrStdin::File(path) => {
                let file =
                    File::open(path).with_context(|| format!("failed to open file: {}", path))?;
                Ok(InputReader::File(BufReader::new(file)))
            }
            FileOrStdin::Stdin => Ok(InputReader::Stdin(BufReader::new(io::stdin()))),
        }
    }
}

/// A reader for input from either a file or stdin.
pub enum InputReader {
    /// A reader for a file.
    File(BufReader<File>),
    /// A reader for stdin.
    Stdin(BufReader<io::Stdin>),
}

impl InputReader {
    /// Process each byte line from the input.
    ///
    /// The provided function is called for each line. If it returns `Ok(true)`,
    /// processing continues. If it returns `Ok(false)`, processing stops.
    /// If it returns an error, processing stops and the error is returned.
    pub fn for_byte_line<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(Line<'_>) -> Result<bool>,
    {
        let mut buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            let n = match self {
                InputReader::File(ref mut rdr) => rdr.read_until(b'\n', &mut buf),
                InputReader::Stdin(ref mut rdr) => rdr.read_until(b'\n', &mut buf),
            };
            let n = n.context("failed to read line")?;
            if n == 0 {
                break;
            }
            let line = Line::new(&buf);
            if !f(line)? {
                break;
            }
        }
        Ok(())
    }

    /// Read rows into `rows` until it holds `limit` values or the input ends.
    ///
    /// Returns `false` once the input is exhausted. `rows` is expected to
    /// start empty.
    pub fn fill_rows(&mut self, rows: &mut Vec<String>, limit: usize) -> Result<bool> {
        self.for_byte_line(|line| {
            rows.push(line.to_value());
            Ok(rows.len() < limit)
        })?;
        Ok(rows.len() >= limit)
    }
}
