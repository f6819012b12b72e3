//! Batch Processing Module
//!
//! File-level counters aggregated across a conversion pass.

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    /// Fold another batch into this one.
    pub fn merge(&mut self, other: &BatchResult) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.errors.extend(other.errors.iter().cloned());
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_result_new() {
        let result = BatchResult::new();
        assert_eq!(result.total, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 0);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_batch_result_mixed() {
        let mut result = BatchResult::new();
        result.success();
        result.success();
        result.fail(PathBuf::from("02.flac"), "exit code 1".to_string());
        result.skip();

        assert_eq!(result.total, 4);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors[0].1, "exit code 1");
    }

    #[test]
    fn test_merge() {
        let mut a = BatchResult::new();
        a.success();
        a.skip();
        let mut b = BatchResult::new();
        b.fail(PathBuf::from("x.flac"), "E".to_string());
        b.success();

        a.merge(&b);
        assert_eq!(a.total, 4);
        assert_eq!(a.succeeded, 2);
        assert_eq!(a.failed, 1);
        assert_eq!(a.skipped, 1);
        assert_eq!(a.errors.len(), 1);
    }

    #[test]
    fn test_success_rate_empty() {
        let result = BatchResult::new();
        assert!((result.success_rate() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_with_skipped() {
        let mut result = BatchResult::new();
        result.success();
        result.success();
        result.skip();
        result.skip();

        assert!(
            (result.success_rate() - 50.0).abs() < 0.01,
            "2 success, 2 skipped should be 50%, got {}",
            result.success_rate()
        );
    }

    #[test]
    fn test_total_equals_sum() {
        let mut result = BatchResult::new();
        result.success();
        result.fail(PathBuf::from("f1.flac"), "E".to_string());
        result.fail(PathBuf::from("f2.flac"), "E".to_string());
        result.skip();

        assert_eq!(
            result.total,
            result.succeeded + result.failed + result.skipped,
            "total must equal succeeded + failed + skipped"
        );
    }
}
