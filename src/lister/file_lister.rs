use glob::MatchOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A glob pattern or literal path, or a nested list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePattern {
    Glob(String),
    List(Vec<SourcePattern>),
}

impl From<&str> for SourcePattern {
    fn from(pattern: &str) -> Self {
        SourcePattern::Glob(pattern.to_string())
    }
}

impl From<String> for SourcePattern {
    fn from(pattern: String) -> Self {
        SourcePattern::Glob(pattern)
    }
}

impl From<&String> for SourcePattern {
    fn from(pattern: &String) -> Self {
        SourcePattern::Glob(pattern.clone())
    }
}

impl<T: Into<SourcePattern>> From<Vec<T>> for SourcePattern {
    fn from(patterns: Vec<T>) -> Self {
        SourcePattern::List(patterns.into_iter().map(Into::into).collect())
    }
}

pub struct FileLister {
    options: MatchOptions,
}

impl FileLister {
    pub fn new() -> Self {
        Self {
            options: MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: true,
            },
        }
    }

    /// Expand every pattern and return the matches sorted by their full
    /// path string.
    ///
    /// Patterns that match nothing contribute nothing; duplicates produced by
    /// overlapping patterns are kept.
    pub fn resolve<I, P>(&self, patterns: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: Into<SourcePattern>,
    {
        let mut files = Vec::new();
        for pattern in patterns {
            self.expand(&pattern.into(), &mut files);
        }
        // Byte order of the whole path, not component order
        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        files
    }

    fn expand(&self, pattern: &SourcePattern, files: &mut Vec<PathBuf>) {
        match pattern {
            SourcePattern::Glob(glob) => self.expand_glob(glob, files),
            SourcePattern::List(patterns) => {
                for nested in patterns {
                    self.expand(nested, files);
                }
            }
        }
    }

    fn expand_glob(&self, pattern: &str, files: &mut Vec<PathBuf>) {
        let paths = match glob::glob_with(pattern, self.options) {
            Ok(paths) => paths,
            Err(err) => {
                // Not a valid pattern: fall back to the literal path
                debug!(pattern, error = %err, "Invalid glob pattern, treating it as a path");
                let literal = Path::new(pattern);
                if literal.is_file() {
                    files.push(literal.to_path_buf());
                }
                return;
            }
        };

        let before = files.len();
        for entry in paths {
            match entry {
                Ok(path) if path.is_dir() => {
                    debug!(path = %path.display(), "Skipping directory");
                }
                Ok(path) => files.push(path),
                Err(err) => {
                    debug!(pattern, error = %err, "Unreadable glob entry");
                }
            }
        }

        if files.len() == before {
            debug!(pattern, "Pattern matched no files");
        }
    }
}

impl Default for FileLister {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand `patterns` with the default [`FileLister`].
pub fn resolve<I, P>(patterns: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<SourcePattern>,
{
    FileLister::new().resolve(patterns)
}
