use crate::combiner::encoding::LineEncoding;
use crate::combiner::header::HeaderGroup;
use crate::error::{file_access, CombineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Counters and header groups of a finished run.
#[derive(Debug, Clone)]
pub struct CombineResult {
    pub files_processed: usize,
    pub lines_written: u64,
    pub header_length: usize,
    pub groups: Vec<HeaderGroup>,
    pub elapsed: Duration,
}

impl CombineResult {
    pub fn variant_count(&self) -> usize {
        self.groups.len()
    }

    pub fn to_report(&self, output_file: &Path, encoding: LineEncoding) -> CombineReport {
        CombineReport {
            output_file: output_file.display().to_string(),
            encoding: encoding.name().to_string(),
            summary: CombineSummary {
                files_processed: self.files_processed,
                lines_written: self.lines_written,
                header_length: self.header_length,
                variant_count: self.variant_count(),
                duration: self.elapsed,
            },
            groups: self
                .groups
                .iter()
                .enumerate()
                .map(|(index, group)| GroupInfo::new(index == 0, group))
                .collect(),
            combined_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineReport {
    pub output_file: String,
    pub encoding: String,
    pub summary: CombineSummary,
    pub groups: Vec<GroupInfo>,
    pub combined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineSummary {
    pub files_processed: usize,
    pub lines_written: u64,
    pub header_length: usize,
    pub variant_count: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub canonical: bool,
    pub header: Vec<String>,
    pub files: Vec<String>,
}

impl GroupInfo {
    fn new(canonical: bool, group: &HeaderGroup) -> Self {
        Self {
            canonical,
            header: group.variant().escaped_lines(),
            files: group
                .files()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}

impl CombineReport {
    pub fn has_mismatches(&self) -> bool {
        self.groups.len() > 1
    }

    /// Groups whose header differs from the one written to the output.
    pub fn mismatched_groups(&self) -> &[GroupInfo] {
        self.groups.get(1..).unwrap_or(&[])
    }

    /// Number of input files in [`Self::mismatched_groups`].
    pub fn mismatched_file_count(&self) -> usize {
        self.mismatched_groups().iter().map(|g| g.files.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CombineError::Config {
            message: format!("Failed to serialize report to JSON: {}", e),
        })
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = self.to_json()?;
        fs::write(path, content).map_err(file_access(path))
    }
}
