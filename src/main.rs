use clap::Parser;
use csv_combine::{
    logging, Cli, CombineError, CsvCombine, HeaderMode, OutputFormatter, OutputMode,
    ReaderError, UserFriendlyError,
};
use std::path::Path;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();
    logging::init_logging(cli.verbosity_level(), cli.quiet);

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let app = match CsvCombine::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code(&e);
        }
    };

    let Some(target) = cli.target_file.as_deref() else {
        app.output_formatter().error("No target file given");
        return 1;
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &app, target);
    }

    match app.combine_files(&cli.sources, target) {
        Ok(_) => 0,
        Err(e) => {
            app.handle_error(&e);
            exit_code(&e)
        }
    }
}

fn exit_code(error: &CombineError) -> i32 {
    match error {
        CombineError::Reader(ReaderError::OutputIsInput { .. })
        | CombineError::Reader(ReaderError::ReportCollision { .. }) => 2,
        CombineError::Reader(ReaderError::NotEnoughFiles { .. }) => 3,
        CombineError::Config { .. } => 4,
        CombineError::Decode { .. } | CombineError::Encode { .. } => 5,
        _ => 1, // I/O fault
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "csv-combine.toml".to_string());

    match CsvCombine::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  csv-combine <target> <sources>... --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, app: &CsvCombine, target: &Path) -> i32 {
    let formatter = app.output_formatter();

    formatter.warning("DRY RUN MODE - No output will be written");
    formatter.print_separator();

    let plan = match app.plan(&cli.sources, target) {
        Ok(plan) => plan,
        Err(e) => {
            app.handle_error(&e);
            return exit_code(&e);
        }
    };

    println!("  Target file: {}", target.display());
    println!("  Encoding: {}", plan.encoding);
    match plan.header_mode {
        HeaderMode::Auto => println!("  Header: auto-detected, {} line(s)", plan.header.len()),
        HeaderMode::Fixed(count) => println!("  Header: fixed, {} line(s)", count),
    }
    for line in plan.header.escaped_lines() {
        println!("    | {}", line);
    }

    println!("  Sources ({}):", plan.files.len());
    for file in &plan.files {
        println!("    - {}", file.display());
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to write the combined file");

    0
}

fn print_startup_error(error: &CombineError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("csv-combine").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        let config_arg = config_path.display().to_string();

        let exit = handle_generate_config(&cli(&["--generate-config", "--config", config_arg.as_str()]));
        assert_eq!(exit, 0);

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[input]"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.csv"), "id\n1\n").unwrap();
        fs::write(temp_dir.path().join("b.csv"), "id\n2\n").unwrap();
        let target = temp_dir.path().join("out.txt");
        let pattern = format!("{}/*.csv", temp_dir.path().display());
        let target_arg = target.display().to_string();

        let cli = cli(&[target_arg.as_str(), pattern.as_str(), "--dry-run", "-q"]);
        let app = CsvCombine::from_cli(&cli).unwrap();

        assert_eq!(handle_dry_run(&cli, &app, &target), 0);
        assert!(!target.exists());
    }

    #[test]
    fn test_dry_run_reports_precondition() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.csv"), "id\n1\n").unwrap();
        let target = temp_dir.path().join("out.txt");
        let pattern = format!("{}/*.csv", temp_dir.path().display());
        let target_arg = target.display().to_string();

        let cli = cli(&[target_arg.as_str(), pattern.as_str(), "--dry-run", "-q"]);
        let app = CsvCombine::from_cli(&cli).unwrap();

        assert_eq!(handle_dry_run(&cli, &app, &target), 3);
    }

    #[test]
    fn test_exit_codes() {
        let err = CombineError::from(ReaderError::OutputIsInput {
            path: "a.csv".into(),
        });
        assert_eq!(exit_code(&err), 2);

        let err = CombineError::FileAccess {
            path: "a.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        };
        assert_eq!(exit_code(&err), 1);
    }
}
