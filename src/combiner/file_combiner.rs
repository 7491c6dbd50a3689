use crate::combiner::encoding::LineEncoding;
use crate::combiner::header::{
    assign_to_group, determine_header, HeaderGroup, HeaderMode, HeaderVariant,
};
use crate::combiner::line_reader::LineReader;
use crate::combiner::report::CombineResult;
use crate::error::{file_access, ReaderError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct FileCombiner {
    encoding: LineEncoding,
    header_mode: HeaderMode,
    buffer_size: usize,
}

impl FileCombiner {
    pub fn new() -> Self {
        Self {
            encoding: LineEncoding::Binary,
            header_mode: HeaderMode::Auto,
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }

    pub fn with_encoding(mut self, encoding: LineEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096); // Minimum 4KB buffer
        self
    }

    pub fn encoding(&self) -> LineEncoding {
        self.encoding
    }

    pub fn header_mode(&self) -> HeaderMode {
        self.header_mode
    }

    /// Reject runs that must not start. Nothing is opened for writing here.
    pub fn check_preconditions(&self, files: &[PathBuf], outfile: &Path) -> Result<()> {
        if names_any(outfile, files) {
            return Err(ReaderError::OutputIsInput {
                path: outfile.to_path_buf(),
            }
            .into());
        }

        if files.len() < 2 {
            return Err(ReaderError::NotEnoughFiles { found: files.len() }.into());
        }

        Ok(())
    }

    pub fn determine_header(&self, files: &[PathBuf]) -> Result<HeaderVariant> {
        let header = determine_header(files, self.header_mode, self.encoding, self.buffer_size)?;

        match self.header_mode {
            HeaderMode::Auto => {
                info!(
                    first = %files[0].display(),
                    second = %files[1].display(),
                    header_lines = header.len(),
                    "Got header comparing matching start lines"
                );
                if header.is_empty() {
                    info!("First lines differ, every line is treated as data");
                }
            }
            HeaderMode::Fixed(count) => {
                info!(
                    file = %files[0].display(),
                    header_lines = count,
                    "Using fixed header length"
                );
            }
        }
        debug!("Header is:\n{}", header.display_indented());

        Ok(header)
    }

    /// Concatenate `files` into `outfile`, writing the canonical header once.
    ///
    /// `progress_callback` is called with `(files_done, total_files)` after
    /// each file has been copied.
    pub fn combine(
        &self,
        files: &[PathBuf],
        outfile: &Path,
        progress_callback: Option<&dyn Fn(usize, usize)>,
    ) -> Result<CombineResult> {
        self.check_preconditions(files, outfile)?;

        let start_time = Instant::now();
        let canonical = self.determine_header(files)?;
        let header_length = match self.header_mode {
            HeaderMode::Fixed(count) => count,
            HeaderMode::Auto => canonical.len(),
        };

        let output = File::create(outfile).map_err(file_access(outfile))?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, output);

        for line in canonical.lines() {
            writer
                .write_all(&self.encoding.encode(line)?)
                .map_err(file_access(outfile))?;
        }

        let mut groups = match self.header_mode {
            HeaderMode::Auto => vec![HeaderGroup::with_files(canonical.clone(), &files[..2])],
            HeaderMode::Fixed(_) => vec![HeaderGroup::new(canonical.clone())],
        };

        let total_files = files.len();
        let mut lines_written = 0u64;

        for (index, path) in files.iter().enumerate() {
            let mut reader = LineReader::open(path, self.encoding, self.buffer_size)?;

            let candidate = HeaderVariant::new(reader.read_lines(header_length)?);
            self.log_header_mismatches(path, &candidate, &canonical, header_length);
            let group = assign_to_group(&mut groups, candidate, path);

            let mut file_lines = 0u64;
            while let Some(line) = reader.next_line()? {
                writer
                    .write_all(&self.encoding.encode(&line)?)
                    .map_err(file_access(outfile))?;
                file_lines += 1;
            }
            lines_written += file_lines;

            debug!(
                file = %path.display(),
                group,
                lines = file_lines,
                "Appended file"
            );

            if let Some(callback) = progress_callback {
                callback(index + 1, total_files);
            }
        }

        writer.flush().map_err(file_access(outfile))?;

        info!(
            files = total_files,
            lines = lines_written,
            variants = groups.len(),
            "Combined {} files with a total of {} lines.",
            total_files,
            lines_written
        );

        Ok(CombineResult {
            files_processed: total_files,
            lines_written,
            header_length,
            groups,
            elapsed: start_time.elapsed(),
        })
    }

    fn log_header_mismatches(
        &self,
        path: &Path,
        candidate: &HeaderVariant,
        canonical: &HeaderVariant,
        header_length: usize,
    ) {
        for index in 0..header_length {
            let got = candidate.get(index);
            let expected = canonical.get(index);
            if got != expected {
                warn!(
                    file = %path.display(),
                    line = index,
                    got = %got.map(|l| l.escaped()).unwrap_or_default(),
                    expected = %expected.map(|l| l.escaped()).unwrap_or_default(),
                    "Header line not matching, file was still included but header line was ignored"
                );
            }
        }
    }
}

/// True if `path` is one of `files`, literally or once both are resolved on
/// disk.
pub fn names_any(path: &Path, files: &[PathBuf]) -> bool {
    let canonical = fs::canonicalize(path).ok();
    files.iter().any(|file| {
        file == path
            || canonical
                .as_ref()
                .is_some_and(|target| fs::canonicalize(file).is_ok_and(|f| &f == target))
    })
}

impl Default for FileCombiner {
    fn default() -> Self {
        Self::new()
    }
}
