use crate::combiner::encoding::LineEncoding;
use crate::combiner::header::Line;
use crate::error::{file_access, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads `\n`-terminated lines, keeping the terminator.
pub struct LineReader<R> {
    reader: R,
    encoding: LineEncoding,
    path: PathBuf,
    lines_read: usize,
}

impl LineReader<BufReader<File>> {
    pub fn open(path: &Path, encoding: LineEncoding, buffer_size: usize) -> Result<Self> {
        let file = File::open(path).map_err(file_access(path))?;
        Ok(Self::new(
            BufReader::with_capacity(buffer_size, file),
            encoding,
            path,
        ))
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new<P: Into<PathBuf>>(reader: R, encoding: LineEncoding, path: P) -> Self {
        Self {
            reader,
            encoding,
            path: path.into(),
            lines_read: 0,
        }
    }

    /// Next line, or `None` at end of file. A trailing line without a
    /// terminator is still returned.
    pub fn next_line(&mut self) -> Result<Option<Line>> {
        let mut raw = Vec::new();
        let bytes_read = self
            .reader
            .read_until(b'\n', &mut raw)
            .map_err(file_access(&self.path))?;

        if bytes_read == 0 {
            return Ok(None);
        }

        self.lines_read += 1;
        self.encoding
            .decode(raw, &self.path, self.lines_read)
            .map(Some)
    }

    /// Up to `count` lines; fewer if the input ends first.
    pub fn read_lines(&mut self, count: usize) -> Result<Vec<Line>> {
        let mut lines = Vec::with_capacity(count);
        while lines.len() < count {
            match self.next_line()? {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        Ok(lines)
    }
}
