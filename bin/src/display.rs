//! Display utilities for the tubedrop CLI.

use indicatif::{ProgressBar, ProgressStyle};

/// Byte-based progress bar for an upload; hidden in quiet mode.
pub(crate) fn upload_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}")
            .expect("Invalid progress template")
            .progress_chars("=>-"),
    );
    pb
}
