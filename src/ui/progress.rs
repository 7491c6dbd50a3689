use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_file_progress(&self, total_files: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_files));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} files {msg}"
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        );
        pb.set_message("Combining files...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Progress callback body: `current` files of `total` are done.
pub fn update_file_progress(pb: &ProgressBar, current: usize, total: usize) {
    if pb.length() != Some(total as u64) {
        pb.set_length(total as u64);
    }
    pb.set_position(current as u64);
    pb.set_message(format!("{} of {} files appended", current, total));
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
