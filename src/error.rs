use std::path::PathBuf;
use thiserror::Error;

/// Precondition violations detected before any output is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error(
        "You are trying to write into one of the source files ({}). This is not supported!",
        path.display()
    )]
    OutputIsInput { path: PathBuf },

    #[error("You need to combine at least two files! (got {found})")]
    NotEnoughFiles { found: usize },

    #[error(
        "The report file {} would overwrite the target or one of the source files",
        path.display()
    )]
    ReportCollision { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum CombineError {
    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error("Failed to access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode line {line} of {} as {encoding}", path.display())]
    Decode {
        path: PathBuf,
        line: usize,
        encoding: &'static str,
    },

    #[error("Line cannot be represented in {encoding}")]
    Encode { encoding: &'static str },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CombineError {
    /// True for user errors that should be reported without a fault trace.
    pub fn is_precondition(&self) -> bool {
        matches!(self, CombineError::Reader(_) | CombineError::Config { .. })
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CombineError {
    fn user_message(&self) -> String {
        match self {
            CombineError::Reader(err) => format!("Could not combine files: {}", err),
            CombineError::Decode {
                path,
                line,
                encoding,
            } => format!(
                "Line {} of '{}' is not valid {}",
                line,
                path.display(),
                encoding
            ),
            CombineError::FileAccess { path, source } => {
                format!("Failed to access '{}': {}", path.display(), source)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CombineError::Reader(ReaderError::OutputIsInput { .. }) => Some(
                "Choose a target file outside the source patterns, or narrow the patterns so they do not match it.".to_string()
            ),
            CombineError::Reader(ReaderError::NotEnoughFiles { .. }) => Some(
                "Pass at least two source files or a glob pattern (quoted, e.g. 'data/*.csv') matching several files.".to_string()
            ),
            CombineError::Decode { .. } => Some(
                "Pick the right text encoding with --encoding, or use --encoding bytes to copy lines verbatim.".to_string()
            ),
            CombineError::FileAccess { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                Some("Ensure you have read access to the sources and write access to the target.".to_string())
            }
            CombineError::Reader(ReaderError::ReportCollision { .. }) => Some(
                "Write the report to a path that is neither the target nor matched by the source patterns.".to_string()
            ),
            CombineError::Config { .. } => Some(
                "Check your configuration file syntax and the values passed on the command line.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CombineError {
    fn from(error: toml::de::Error) -> Self {
        CombineError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CombineError>;

/// Wrap an `io::Error` with the path it happened on.
pub(crate) fn file_access(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> CombineError + '_ {
    move |source| CombineError::FileAccess {
        path: path.to_path_buf(),
        source,
    }
}
