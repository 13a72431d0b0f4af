//! CLI command implementations.

pub mod sample;
pub mod tomography;
pub mod version;
pub mod vqa;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Bar counting `len` units of work, drawn on stderr.
pub(crate) fn progress_bar(len: u64, unit: &str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let template = format!("{{spinner:.cyan}} [{{bar:30.cyan/blue}}] {{pos}}/{{len}} {unit} {{msg}}");
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
