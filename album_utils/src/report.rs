//! Report Module
//!
//! End-of-pass summary for album batches.

use crate::batch::BatchResult;
use crate::progress::format_duration;
use std::time::Duration;

const RULE: &str = "============================================================";

pub fn print_banner(title: &str) {
    println!("\n{}", RULE);
    println!("{}", title);
    println!("{}", RULE);
}

pub fn print_summary_report(
    files: &BatchResult,
    albums_succeeded: usize,
    albums_total: usize,
    duration: Duration,
) {
    print_banner("CONVERSION COMPLETE");
    println!(
        "Successfully processed: {}/{} albums",
        albums_succeeded, albums_total
    );
    println!(
        "Files: {} converted, {} failed, {} skipped ({:.1}% converted)",
        files.succeeded,
        files.failed,
        files.skipped,
        files.success_rate()
    );
    println!("Total time: {}", format_duration(duration));

    if albums_succeeded < albums_total {
        println!("Some albums had conversion errors. Check the output above for details.");
    }

    if !files.errors.is_empty() {
        println!();
        println!("❌ Errors encountered:");
        for (path, error) in &files.errors {
            println!("   {} → {}", path.display(), error);
        }
    }

    tracing::info!(
        albums_succeeded,
        albums_total,
        converted = files.succeeded,
        failed = files.failed,
        skipped = files.skipped,
        duration_secs = duration.as_secs_f64(),
        "Conversion pass complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_print_summary_report_no_panic() {
        let mut result = BatchResult::new();
        result.success();
        result.fail(PathBuf::from("02.flac"), "exit code 1".to_string());
        result.skip();

        print_summary_report(&result, 1, 2, Duration::from_secs(10));
    }

    #[test]
    fn test_print_summary_report_empty() {
        print_summary_report(&BatchResult::new(), 0, 0, Duration::ZERO);
    }
}
