use crate::combiner::report::{CombineReport, GroupInfo};
use crate::error::{CombineError, UserFriendlyError};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::error::Error as _;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Precondition errors get a one-line message; faults also get their
    /// cause chain.
    pub fn print_user_friendly_error(&self, error: &CombineError) {
        self.error(&error.user_message());

        if !error.is_precondition() {
            let mut source = error.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
        }

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Counts line, plus a warning and per-group listing when the inputs
    /// carried more than one header variant.
    pub fn print_combine_summary(&self, report: &CombineReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &CombineReport) {
        let summary = &report.summary;
        println!();
        self.print_separator();

        let headline = format!(
            "Combined {} files with a total of {} lines.",
            summary.files_processed, summary.lines_written
        );
        if self.use_colors {
            println!("{} {}", style(&headline).green().bold(), CHECKMARK);
        } else {
            println!("✓ {}", headline);
        }

        println!();
        println!("  Output file:     {}", self.highlight(&report.output_file));
        println!(
            "  Header lines:    {}",
            self.highlight(&summary.header_length.to_string())
        );
        println!("  Encoding:        {}", report.encoding);
        println!(
            "  Time taken:      {}",
            self.highlight(&format_duration(summary.duration))
        );

        if report.has_mismatches() {
            println!();
            self.warning(&mismatch_warning(report));
            for (index, group) in report.groups.iter().enumerate() {
                self.print_group(index, group);
            }
        }

        self.print_separator();
    }

    fn print_group(&self, index: usize, group: &GroupInfo) {
        let title = if group.canonical {
            format!("Header variant {} (written to output):", index + 1)
        } else {
            format!("Header variant {}:", index + 1)
        };
        if self.use_colors {
            println!("  {}", style(title).bold());
        } else {
            println!("  {}", title);
        }

        if group.header.is_empty() {
            println!("      (no header lines)");
        }
        for line in &group.header {
            println!("      | {}", line);
        }
        println!("    Files ({}):", group.files.len());
        for file in &group.files {
            println!("      - {}", file);
        }
    }

    fn print_plain_summary(&self, report: &CombineReport) {
        let summary = &report.summary;
        println!(
            "COMPLETED: Combined {} files with a total of {} lines.",
            summary.files_processed, summary.lines_written
        );
        println!("Output: {}", report.output_file);
        println!("Header lines: {}", summary.header_length);
        println!("Header variants: {}", summary.variant_count);
        println!("Duration: {:?}", summary.duration);

        if report.has_mismatches() {
            println!("WARNING: {}", mismatch_warning(report));
            for (index, group) in report.groups.iter().enumerate() {
                println!("VARIANT {}: {}", index + 1, group.header.join(" | "));
                for file in &group.files {
                    println!("  FILE: {}", file);
                }
            }
        }
    }

    fn highlight(&self, text: &str) -> String {
        if self.use_colors {
            style(text).cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn mismatch_warning(report: &CombineReport) -> String {
    format!(
        "Found {} different headers; {} file(s) did not match the header written to the output. \
         Their data was still included, their header lines were dropped.",
        report.groups.len(),
        report.mismatched_file_count()
    )
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}
