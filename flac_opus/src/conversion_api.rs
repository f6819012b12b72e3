//! Album Conversion API Module
//!
//! Per-album pipeline: PreCheck → Reconcile → Dispatch → Collect → Decide →
//! Cleanup → Done.
//!
//! - Sources whose target already exists are skipped and offered for deletion
//! - Remaining sources are encoded on a fixed-size worker pool
//! - Converted sources are deleted only when every attempted file succeeded

use crate::cleanup::CleanupManager;
use crate::config::ConverterConfig;
use crate::encoder::Encoder;
use crate::scanner::Album;
use album_utils::{create_progress_bar, sibling_with_extension, BatchResult, Prompter};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Converted,
    Failed(String),
    /// Target existed before this run.
    Skipped,
}

impl ConversionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ConversionOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub outcome: ConversionOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumVerdict {
    AllSucceeded,
    Failed,
    NothingToDo,
}

impl AlbumVerdict {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a ConversionOutcome>,
    {
        let mut converted = 0;
        let mut failed = 0;
        for outcome in outcomes {
            match outcome {
                ConversionOutcome::Converted => converted += 1,
                ConversionOutcome::Failed(_) => failed += 1,
                ConversionOutcome::Skipped => {}
            }
        }

        if failed > 0 {
            AlbumVerdict::Failed
        } else if converted > 0 {
            AlbumVerdict::AllSucceeded
        } else {
            AlbumVerdict::NothingToDo
        }
    }

    /// NothingToDo counts as a successful album.
    pub fn is_success(&self) -> bool {
        !matches!(self, AlbumVerdict::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumStage {
    PreCheck,
    Reconcile,
    Dispatch,
    Collect,
    Decide,
    Cleanup,
    Done,
}

impl fmt::Display for AlbumStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlbumStage::PreCheck => "pre-check",
            AlbumStage::Reconcile => "reconcile",
            AlbumStage::Dispatch => "dispatch",
            AlbumStage::Collect => "collect",
            AlbumStage::Decide => "decide",
            AlbumStage::Cleanup => "cleanup",
            AlbumStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumReport {
    pub relative_path: String,
    pub verdict: AlbumVerdict,
    /// One entry per source file, in album order.
    pub outcomes: Vec<FileOutcome>,
    pub leftovers_deleted: Vec<PathBuf>,
    pub sources_deleted: Vec<PathBuf>,
    pub sidecars_deleted: Vec<PathBuf>,
    pub deletion_failures: Vec<PathBuf>,
    #[serde(skip)]
    album_path: PathBuf,
}

impl AlbumReport {
    fn count(&self, pred: impl Fn(&ConversionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }

    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::Converted))
    }

    pub fn failed(&self) -> usize {
        self.count(ConversionOutcome::is_failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::Skipped))
    }

    /// File-level counters for the pass summary.
    pub fn batch(&self) -> BatchResult {
        let mut batch = BatchResult::new();
        for file in &self.outcomes {
            match &file.outcome {
                ConversionOutcome::Converted => batch.success(),
                ConversionOutcome::Skipped => batch.skip(),
                ConversionOutcome::Failed(reason) => {
                    batch.fail(self.album_path.join(&file.file_name), reason.clone())
                }
            }
        }
        batch
    }
}

struct WorkUnit {
    file_name: String,
    source: PathBuf,
    target: PathBuf,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Encode one file. Never panics; a failure leaves no partial target behind.
fn run_unit(encoder: &dyn Encoder, unit: &WorkUnit) -> ConversionOutcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        encoder.convert(&unit.source, &unit.target)
    }));

    let outcome = match attempt {
        Ok(Ok(())) if unit.target.exists() => ConversionOutcome::Converted,
        Ok(Ok(())) => {
            ConversionOutcome::Failed("encoder reported success but wrote no output".to_string())
        }
        Ok(Err(e)) => ConversionOutcome::Failed(e.to_string()),
        Err(payload) => ConversionOutcome::Failed(format!(
            "conversion panicked: {}",
            panic_message(payload.as_ref())
        )),
    };

    if let ConversionOutcome::Failed(reason) = &outcome {
        debug!(file = %unit.source.display(), reason = %reason, "Conversion failed");
        if unit.target.exists() {
            if let Err(e) = fs::remove_file(&unit.target) {
                warn!(file = %unit.target.display(), error = %e, "Could not remove partial output");
            }
        }
    }

    outcome
}

/// Separate sources that would share one target file.
///
/// Targets are compared by lowercased file name, since case-insensitive
/// filesystems store `Song.opus` and `song.opus` as one file. Colliding
/// sources are never encoded, never offered as leftovers and never deleted.
fn split_target_collisions(units: Vec<WorkUnit>) -> (Vec<WorkUnit>, Vec<FileOutcome>) {
    let target_key = |unit: &WorkUnit| {
        unit.target
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    };

    let mut by_target: HashMap<String, Vec<String>> = HashMap::new();
    for unit in &units {
        by_target
            .entry(target_key(unit))
            .or_default()
            .push(unit.file_name.clone());
    }

    let mut clear = Vec::with_capacity(units.len());
    let mut collisions = Vec::new();
    for unit in units {
        let sharing = by_target.get(&target_key(&unit)).map(Vec::as_slice).unwrap_or_default();
        if sharing.len() < 2 {
            clear.push(unit);
            continue;
        }
        let others: Vec<&str> = sharing
            .iter()
            .filter(|name| **name != unit.file_name)
            .map(String::as_str)
            .collect();
        warn!(file = %unit.source.display(), others = ?others, "Target name collision");
        collisions.push(FileOutcome {
            outcome: ConversionOutcome::Failed(format!(
                "target name collides with {}",
                others.join(", ")
            )),
            file_name: unit.file_name,
        });
    }
    (clear, collisions)
}

/// Progress bars swallow `println` while hidden.
fn emit(pb: &ProgressBar, line: String) {
    if pb.is_hidden() {
        println!("{}", line);
    } else {
        pb.println(line);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts albums one at a time on a worker pool built once.
pub struct AlbumConverter<'a> {
    config: &'a ConverterConfig,
    encoder: &'a dyn Encoder,
    cleanup: CleanupManager,
    pool: rayon::ThreadPool,
}

impl<'a> AlbumConverter<'a> {
    pub fn new(config: &'a ConverterConfig, encoder: &'a dyn Encoder) -> anyhow::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("encoder-{}", i))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

        Ok(Self {
            config,
            encoder,
            cleanup: CleanupManager::new(config),
            pool,
        })
    }

    fn enter(&self, album: &Album, stage: AlbumStage) {
        debug!(album = %album.relative_path, stage = %stage, "Album stage");
    }

    pub fn convert_album(
        &self,
        album: &Album,
        prompter: &mut dyn Prompter,
    ) -> io::Result<AlbumReport> {
        let label = self.config.source_label();
        let target_label = capitalize(&self.config.target_extension);

        self.enter(album, AlbumStage::PreCheck);
        let units: Vec<WorkUnit> = album
            .source_files
            .iter()
            .map(|name| WorkUnit {
                file_name: name.clone(),
                source: album.source_path(name),
                target: sibling_with_extension(
                    &album.path,
                    name,
                    &self.config.target_extension,
                ),
            })
            .collect();
        let (units, collisions) = split_target_collisions(units);
        let (existing, pending): (Vec<WorkUnit>, Vec<WorkUnit>) =
            units.into_iter().partition(|u| u.target.exists());

        for collision in &collisions {
            if let ConversionOutcome::Failed(reason) = &collision.outcome {
                println!("  ✗ Failed: {} - {}", collision.file_name, reason);
            }
        }

        let mut report = AlbumReport {
            relative_path: album.relative_path.clone(),
            verdict: AlbumVerdict::NothingToDo,
            outcomes: existing
                .iter()
                .map(|u| FileOutcome {
                    file_name: u.file_name.clone(),
                    outcome: ConversionOutcome::Skipped,
                })
                .chain(collisions)
                .collect(),
            leftovers_deleted: Vec::new(),
            sources_deleted: Vec::new(),
            sidecars_deleted: Vec::new(),
            deletion_failures: Vec::new(),
            album_path: album.path.clone(),
        };

        self.enter(album, AlbumStage::Reconcile);
        if !existing.is_empty() {
            println!(
                "  Found {} {} files with existing {} versions:",
                existing.len(),
                label,
                target_label
            );
            let leftovers: Vec<PathBuf> = existing.iter().map(|u| u.source.clone()).collect();
            let deleted = self.cleanup.delete_if_confirmed(&leftovers, prompter)?;
            report
                .sidecars_deleted
                .extend(self.cleanup.purge_sidecars(&deleted.deleted));
            report.leftovers_deleted = deleted.deleted;
            report.deletion_failures.extend(deleted.failed);
        }

        if !pending.is_empty() {
            self.enter(album, AlbumStage::Dispatch);
            println!("  Converting {} files...", pending.len());
            let pb = create_progress_bar(
                pending.len() as u64,
                &album.relative_path,
                self.config.show_progress,
            );
            let encoder = self.encoder;

            let converted: Vec<FileOutcome> = self.pool.install(|| {
                pending
                    .par_iter()
                    .map(|unit| {
                        let outcome = run_unit(encoder, unit);
                        match &outcome {
                            ConversionOutcome::Failed(reason) => emit(
                                &pb,
                                format!("  ✗ Failed: {} - {}", unit.file_name, reason),
                            ),
                            _ => emit(&pb, format!("  ✓ Converted: {}", unit.file_name)),
                        }
                        pb.inc(1);
                        FileOutcome {
                            file_name: unit.file_name.clone(),
                            outcome,
                        }
                    })
                    .collect()
            });

            self.enter(album, AlbumStage::Collect);
            pb.finish_and_clear();
            report.outcomes.extend(converted);
        }
        report.outcomes.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        self.enter(album, AlbumStage::Decide);
        report.verdict = AlbumVerdict::from_outcomes(report.outcomes.iter().map(|o| &o.outcome));
        println!(
            "  Results: {} converted, {} failed, {} skipped",
            report.converted(),
            report.failed(),
            report.skipped()
        );

        match report.verdict {
            AlbumVerdict::AllSucceeded => {
                self.enter(album, AlbumStage::Cleanup);
                let sources: Vec<PathBuf> = report
                    .outcomes
                    .iter()
                    .filter(|o| o.outcome == ConversionOutcome::Converted)
                    .map(|o| album.source_path(&o.file_name))
                    .collect();
                println!(
                    "  All conversions successful. Deleting {} {} files...",
                    sources.len(),
                    label
                );
                let deleted = self.cleanup.delete_all(&sources);
                report
                    .sidecars_deleted
                    .extend(self.cleanup.purge_sidecars(&deleted.deleted));
                report.sources_deleted = deleted.deleted;
                report.deletion_failures.extend(deleted.failed);
            }
            AlbumVerdict::Failed => {
                println!(
                    "  ⚠️  Keeping {} files due to {} failed conversions",
                    label,
                    report.failed()
                );
            }
            AlbumVerdict::NothingToDo => {
                println!("  No new conversions needed");
            }
        }

        self.enter(album, AlbumStage::Done);
        info!(
            album = %album.relative_path,
            verdict = ?report.verdict,
            converted = report.converted(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Album processed"
        );
        Ok(report)
    }
}
