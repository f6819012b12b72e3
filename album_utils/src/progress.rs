//! Progress bars and human-readable formatting.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub const PROGRESS_CHARS: &str = "█▓░";
pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
pub const BATCH_TEMPLATE: &str =
    "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {pos}/{len} • ⏱️ {elapsed_precise} • {msg}";

/// Progress bar for one album's conversions; hidden when `visible` is false.
pub fn create_progress_bar(total: u64, prefix: &str, visible: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }

    // Template is a constant; a bad one falls back to the default style.
    let style = ProgressStyle::default_bar()
        .template(BATCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS)
        .tick_chars(SPINNER_CHARS);
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Binary units, one decimal, e.g. `1.5 GB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} PB", value)
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
