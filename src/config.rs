use crate::combiner::{HeaderMode, LineEncoding};
use crate::combiner::encoding::BINARY_LABEL;
use crate::error::{CombineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// `bytes` for verbatim lines, otherwise a text encoding label.
    pub encoding: String,
    /// Fixed number of header lines; auto-detected when unset.
    pub header_lines: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub buffer_size: usize,
    pub show_progress: bool,
    pub report_file: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            encoding: BINARY_LABEL.to_string(),
            header_lines: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024, // 64KB
            show_progress: true,
            report_file: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CombineError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CombineError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CombineError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["csv-combine.toml", ".csv-combine.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref encoding) = cli_args.encoding {
            self.input.encoding = encoding.clone();
        }

        if let Some(header_lines) = cli_args.header_lines {
            self.input.header_lines = Some(header_lines);
        }

        if let Some(show_progress) = cli_args.show_progress {
            self.output.show_progress = show_progress;
        }

        if let Some(ref report_file) = cli_args.report_file {
            self.output.report_file = Some(report_file.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.line_encoding()?;

        if self.output.buffer_size == 0 {
            return Err(CombineError::Config {
                message: "Buffer size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn line_encoding(&self) -> Result<LineEncoding> {
        LineEncoding::from_label(&self.input.encoding)
    }

    pub fn header_mode(&self) -> HeaderMode {
        HeaderMode::from_forced(self.input.header_lines)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub encoding: Option<String>,
    pub header_lines: Option<usize>,
    pub show_progress: Option<bool>,
    pub report_file: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_header_lines(mut self, header_lines: Option<usize>) -> Self {
        self.header_lines = header_lines;
        self
    }

    pub fn with_show_progress(mut self, show_progress: Option<bool>) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_report_file(mut self, report_file: Option<PathBuf>) -> Self {
        self.report_file = report_file;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.encoding, "bytes");
        assert_eq!(config.header_mode(), HeaderMode::Auto);
        assert_eq!(config.line_encoding().unwrap(), LineEncoding::Binary);
        assert!(config.output.show_progress);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.input.encoding = "utf-16".to_string();
        assert!(config.validate().is_err());

        config.input.encoding = "utf-8".to_string();
        config.output.buffer_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.input.header_lines = Some(2);
        let temp_file = NamedTempFile::new().unwrap();

        std::fs::write(temp_file.path(), toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.input.header_lines, Some(2));
        assert_eq!(loaded_config.header_mode(), HeaderMode::Fixed(2));
    }

    #[test]
    fn test_partial_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[input]\nencoding = \"latin1\"").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.input.encoding, "latin1");
        assert_eq!(config.output.buffer_size, 64 * 1024);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/missing/csv-combine.toml");
        assert!(matches!(result, Err(CombineError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_encoding(Some("utf-8".to_string()))
            .with_header_lines(Some(3))
            .with_show_progress(Some(false));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.input.encoding, "utf-8");
        assert_eq!(config.header_mode(), HeaderMode::Fixed(3));
        assert!(!config.output.show_progress);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[input]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("encoding = \"bytes\""));
    }
}
