//! Source and sidecar deletion.
//!
//! Every deletion is attempted independently; a failure is reported and the
//! remaining files are still tried.

use crate::config::ConverterConfig;
use album_utils::{prefixed_sibling, AppError, Prompter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeletionResult {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct CleanupManager {
    sidecar_prefix: String,
    source_label: String,
}

impl CleanupManager {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            sidecar_prefix: config.sidecar_prefix.clone(),
            source_label: config.source_label(),
        }
    }

    pub fn sidecar_for(&self, file: &Path) -> Option<PathBuf> {
        prefixed_sibling(file, &self.sidecar_prefix)
    }

    /// Ask once for the whole set (default: delete), then delete.
    ///
    /// Declining or closed input deletes nothing.
    pub fn delete_if_confirmed(
        &self,
        candidates: &[PathBuf],
        prompter: &mut dyn Prompter,
    ) -> io::Result<DeletionResult> {
        if candidates.is_empty() {
            return Ok(DeletionResult::default());
        }

        for path in candidates {
            println!("    - {}", display_name(path));
        }
        let prompt = format!("  Delete these {} files?", self.source_label);
        match prompter.confirm(&prompt)? {
            Some(true) => Ok(self.delete_all(candidates)),
            Some(false) => {
                info!(count = candidates.len(), "Operator kept leftover sources");
                Ok(DeletionResult::default())
            }
            None => {
                println!("\nSkipping deletion.");
                Ok(DeletionResult::default())
            }
        }
    }

    /// Delete `files` without asking.
    pub fn delete_all(&self, files: &[PathBuf]) -> DeletionResult {
        let mut result = DeletionResult::default();

        for path in files {
            match fs::remove_file(path) {
                Ok(()) => {
                    println!("    Deleted: {}", display_name(path));
                    info!(file = %path.display(), "Deleted source");
                    result.deleted.push(path.clone());
                }
                Err(source) => {
                    println!("    Error deleting {}: {}", display_name(path), source);
                    let err = AppError::DeletionFailure {
                        path: path.clone(),
                        source,
                    };
                    warn!(file = %path.display(), error = %err, "Deletion failed");
                    result.failed.push(path.clone());
                }
            }
        }

        result
    }

    /// Remove the `._<name>` sidecar of each file; absence is not an error.
    ///
    /// Returns the sidecars actually removed.
    pub fn purge_sidecars(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        let sidecars: Vec<PathBuf> = files
            .iter()
            .filter_map(|f| self.sidecar_for(f))
            .filter(|s| s.exists())
            .collect();

        if sidecars.is_empty() {
            return Vec::new();
        }

        println!("    Cleaning up macOS metadata files...");
        let mut removed = Vec::new();
        for sidecar in sidecars {
            match fs::remove_file(&sidecar) {
                Ok(()) => {
                    println!("      Deleted: {}", display_name(&sidecar));
                    removed.push(sidecar);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(file = %sidecar.display(), error = %e, "Sidecar deletion failed");
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use album_utils::ScriptedPrompter;
    use tempfile::TempDir;

    fn manager() -> CleanupManager {
        CleanupManager::new(&ConverterConfig::new("/music"))
    }

    fn files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|n| {
                let p = dir.join(n);
                fs::write(&p, b"x").unwrap();
                p
            })
            .collect()
    }

    #[test]
    fn test_sidecar_name() {
        assert_eq!(
            manager().sidecar_for(Path::new("/m/A/01 Song.flac")),
            Some(PathBuf::from("/m/A/._01 Song.flac"))
        );
    }

    #[test]
    fn test_default_answer_deletes() {
        let temp = TempDir::new().unwrap();
        let candidates = files(temp.path(), &["01.flac", "02.flac"]);
        let mut prompter = ScriptedPrompter::new([""]);

        let result = manager().delete_if_confirmed(&candidates, &mut prompter).unwrap();
        assert_eq!(result.deleted, candidates);
        assert!(candidates.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_negative_answer_keeps_everything() {
        let temp = TempDir::new().unwrap();
        let candidates = files(temp.path(), &["01.flac"]);
        let mut prompter = ScriptedPrompter::new(["no"]);

        let result = manager().delete_if_confirmed(&candidates, &mut prompter).unwrap();
        assert!(result.deleted.is_empty());
        assert!(candidates[0].exists());
    }

    #[test]
    fn test_closed_input_keeps_everything() {
        let temp = TempDir::new().unwrap();
        let candidates = files(temp.path(), &["01.flac"]);
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        let result = manager().delete_if_confirmed(&candidates, &mut prompter).unwrap();
        assert_eq!(result, DeletionResult::default());
        assert!(candidates[0].exists());
    }

    #[test]
    fn test_no_candidates_asks_nothing() {
        let mut prompter = ScriptedPrompter::new(["n"]);
        let result = manager().delete_if_confirmed(&[], &mut prompter).unwrap();
        assert!(result.deleted.is_empty());
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_one_failure_does_not_block_the_rest() {
        let temp = TempDir::new().unwrap();
        let mut targets = files(temp.path(), &["01.flac", "03.flac"]);
        targets.insert(1, temp.path().join("02-missing.flac"));

        let result = manager().delete_all(&targets);
        assert_eq!(result.deleted, vec![targets[0].clone(), targets[2].clone()]);
        assert_eq!(result.failed, vec![targets[1].clone()]);
    }

    #[test]
    fn test_purge_sidecars_ignores_absence_and_others() {
        let temp = TempDir::new().unwrap();
        files(temp.path(), &["._01.flac", "._other.flac", "._02.opus"]);
        let deleted = vec![temp.path().join("01.flac"), temp.path().join("02.flac")];

        let removed = manager().purge_sidecars(&deleted);
        assert_eq!(removed, vec![temp.path().join("._01.flac")]);
        assert!(temp.path().join("._other.flac").exists());
        assert!(temp.path().join("._02.opus").exists());
    }
}
