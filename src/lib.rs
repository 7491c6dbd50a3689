pub mod cli;
pub mod combiner;
pub mod config;
pub mod error;
pub mod lister;
pub mod logging;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, InputConfig, OutputConfig};
pub use error::{CombineError, ReaderError, Result, UserFriendlyError};

// Core functionality re-exports
pub use combiner::{
    CombineReport, CombineResult, FileCombiner, HeaderGroup, HeaderMode, HeaderVariant, Line,
    LineEncoding,
};
pub use lister::{FileLister, SourcePattern};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use combiner::names_any;
use std::path::{Path, PathBuf};

/// Main library interface: resolves sources, runs the combiner and reports.
pub struct CsvCombine {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

/// What a run would do, computed without writing anything.
#[derive(Debug, Clone)]
pub struct CombinePlan {
    pub files: Vec<PathBuf>,
    pub header: HeaderVariant,
    pub header_mode: HeaderMode,
    pub encoding: LineEncoding,
}

impl CsvCombine {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let show_progress =
            config.output.show_progress && !quiet && output_mode == OutputMode::Human;
        let progress_manager = ProgressManager::new(show_progress);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// Combine every file matched by `sources` into `target`.
    pub fn combine_files(&self, sources: &[String], target: &Path) -> Result<CombineResult> {
        self.output_formatter.start_operation("Combining files");

        let files = self.resolve_sources(sources);
        let combiner = self.build_combiner()?;
        combiner.check_preconditions(&files, target)?;
        self.check_report_path(&files, target)?;

        let result = self.run_combiner(&combiner, &files, target)?;

        let report = self.create_report(&result, target)?;
        if let Some(ref report_path) = self.config.output.report_file {
            report.save_json(report_path)?;
            self.output_formatter
                .info(&format!("Wrote report to {}", report_path.display()));
        }

        self.output_formatter.print_combine_summary(&report);

        Ok(result)
    }

    /// Resolve sources and determine the header without opening the target.
    pub fn plan(&self, sources: &[String], target: &Path) -> Result<CombinePlan> {
        let files = self.resolve_sources(sources);
        let combiner = self.build_combiner()?;
        combiner.check_preconditions(&files, target)?;
        self.check_report_path(&files, target)?;
        let header = combiner.determine_header(&files)?;

        Ok(CombinePlan {
            files,
            header,
            header_mode: combiner.header_mode(),
            encoding: combiner.encoding(),
        })
    }

    /// The report may only create or replace a file of its own.
    fn check_report_path(&self, files: &[PathBuf], target: &Path) -> Result<()> {
        let Some(report_path) = self.config.output.report_file.as_deref() else {
            return Ok(());
        };

        if names_any(report_path, files) || names_any(report_path, &[target.to_path_buf()]) {
            return Err(ReaderError::ReportCollision {
                path: report_path.to_path_buf(),
            }
            .into());
        }
        Ok(())
    }

    fn resolve_sources(&self, sources: &[String]) -> Vec<PathBuf> {
        let files = lister::file_lister::resolve(sources);
        self.output_formatter
            .info(&format!("Found {} source files", files.len()));
        for file in &files {
            self.output_formatter.debug(&file.display().to_string());
        }
        files
    }

    fn build_combiner(&self) -> Result<FileCombiner> {
        Ok(FileCombiner::new()
            .with_encoding(self.config.line_encoding()?)
            .with_header_mode(self.config.header_mode())
            .with_buffer_size(self.config.output.buffer_size))
    }

    /// Run the combiner with a progress bar fed by its per-file callback.
    fn run_combiner(
        &self,
        combiner: &FileCombiner,
        files: &[PathBuf],
        target: &Path,
    ) -> Result<CombineResult> {
        let file_progress = self.progress_manager.create_file_progress(files.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |current: usize, total: usize| {
                ui::progress::update_file_progress(&pb, current, total);
            }
        };

        match combiner.combine(files, target, Some(&progress_callback)) {
            Ok(result) => {
                ui::progress::finish_progress_with_summary(
                    &file_progress,
                    &format!("Combined {} files", result.files_processed),
                    result.elapsed,
                );
                Ok(result)
            }
            Err(e) => {
                file_progress.abandon();
                Err(e)
            }
        }
    }

    pub fn create_report(&self, result: &CombineResult, target: &Path) -> Result<CombineReport> {
        Ok(result.to_report(target, self.config.line_encoding()?))
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let path = output_path.as_ref();
        let sample_config = Config::create_sample_config();
        std::fs::write(path, sample_config).map_err(error::file_access(path))?;
        Ok(())
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &CombineError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_app(config: Config) -> CsvCombine {
        CsvCombine::new(config, OutputMode::Plain, 0, true)
    }

    fn sources(dir: &TempDir) -> Vec<String> {
        vec![format!("{}/*.csv", dir.path().display())]
    }

    #[test]
    fn test_progress_hidden_outside_human_mode() {
        let app = CsvCombine::new(Config::default(), OutputMode::Json, 0, false);
        assert!(app.progress_manager.create_file_progress(2).is_hidden());

        let mut config = Config::default();
        config.output.show_progress = false;
        let app = CsvCombine::new(config, OutputMode::Human, 0, false);
        assert!(app.progress_manager.create_file_progress(2).is_hidden());
    }

    #[test]
    fn test_combine_files_from_glob() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "id,val\n3,z\n").unwrap();
        fs::write(dir.path().join("a.csv"), "id,val\n1,x\n2,y\n").unwrap();
        let target = dir.path().join("combined.txt");

        let result = quiet_app(Config::default())
            .combine_files(&sources(&dir), &target)
            .unwrap();

        assert_eq!(result.files_processed, 2);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "id,val\n1,x\n2,y\n3,z\n"
        );
    }

    #[test]
    fn test_combine_writes_report_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "h\n1\n").unwrap();
        fs::write(dir.path().join("b.csv"), "h\n2\n").unwrap();
        let target = dir.path().join("out.txt");
        let report_path = dir.path().join("report.json");

        let mut config = Config::default();
        config.output.report_file = Some(report_path.clone());
        quiet_app(config)
            .combine_files(&sources(&dir), &target)
            .unwrap();

        let report: CombineReport =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report.summary.lines_written, 2);
    }

    #[test]
    fn test_target_matched_by_sources_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "h\n1\n").unwrap();
        fs::write(dir.path().join("b.csv"), "h\n2\n").unwrap();
        let target = dir.path().join("b.csv");

        let err = quiet_app(Config::default())
            .combine_files(&sources(&dir), &target)
            .unwrap_err();

        assert!(matches!(
            err,
            CombineError::Reader(ReaderError::OutputIsInput { .. })
        ));
        assert_eq!(fs::read_to_string(&target).unwrap(), "h\n2\n");
    }

    #[test]
    fn test_report_cannot_overwrite_inputs_or_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "h\n1\n").unwrap();
        fs::write(dir.path().join("b.csv"), "h\n2\n").unwrap();
        let target = dir.path().join("out.txt");

        for report_path in [dir.path().join("a.csv"), target.clone()] {
            let mut config = Config::default();
            config.output.report_file = Some(report_path);

            let err = quiet_app(config)
                .combine_files(&sources(&dir), &target)
                .unwrap_err();
            assert!(matches!(
                err,
                CombineError::Reader(ReaderError::ReportCollision { .. })
            ));
        }

        assert_eq!(fs::read_to_string(dir.path().join("a.csv")).unwrap(), "h\n1\n");
        assert!(!target.exists());
    }

    #[test]
    fn test_plan_does_not_write() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "# v1\nid\n1\n").unwrap();
        fs::write(dir.path().join("b.csv"), "# v1\nid\n2\n").unwrap();
        let target = dir.path().join("out.txt");

        let mut config = Config::default();
        config.input.header_lines = Some(2);
        let plan = quiet_app(config).plan(&sources(&dir), &target).unwrap();

        assert_eq!(plan.files.len(), 2);
        assert_eq!(plan.header.len(), 2);
        assert_eq!(plan.header_mode, HeaderMode::Fixed(2));
        assert!(!target.exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        CsvCombine::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[input]"));
        assert!(content.contains("[output]"));
    }
}
