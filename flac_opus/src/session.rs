//! Interactive run loop: probe, scan, select, convert, summarize, repeat.

use crate::config::ConverterConfig;
use crate::conversion_api::{AlbumConverter, AlbumReport};
use crate::encoder::Encoder;
use crate::scanner::{display_albums, scan_albums, Album};
use crate::selection::prompt_selection;
use album_utils::{
    display_disk_space, print_banner, print_summary_report, BatchResult, Prompter,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Everything that happened in one select-and-convert pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub albums: Vec<AlbumReport>,
    pub files: BatchResult,
    pub albums_succeeded: usize,
    pub albums_total: usize,
    pub elapsed_secs: f64,
}

impl PassSummary {
    pub fn new(albums: Vec<AlbumReport>, elapsed: Duration) -> Self {
        let mut files = BatchResult::new();
        for album in &albums {
            files.merge(&album.batch());
        }
        Self {
            albums_succeeded: albums.iter().filter(|a| a.verdict.is_success()).count(),
            albums_total: albums.len(),
            files,
            albums,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionOutcome {
    /// Passes that converted at least one selection.
    pub passes: usize,
    pub last_pass: Option<PassSummary>,
}

fn process_selection(
    converter: &AlbumConverter<'_>,
    selected: &[Album],
    prompter: &mut dyn Prompter,
) -> Result<PassSummary> {
    print_banner("STARTING CONVERSION PROCESS");

    let start = Instant::now();
    let mut reports = Vec::with_capacity(selected.len());
    for (i, album) in selected.iter().enumerate() {
        println!("\n[{}/{}] Processing: {}", i + 1, selected.len(), album.relative_path);
        let report = converter
            .convert_album(album, prompter)
            .with_context(|| format!("Failed while processing {}", album.relative_path))?;
        reports.push(report);
    }

    Ok(PassSummary::new(reports, start.elapsed()))
}

/// Run until the operator stops, the catalog is empty or nothing is selected.
///
/// Only an unavailable encoder, a failed scan or a broken terminal end the
/// session with an error.
pub fn run_session(
    config: &ConverterConfig,
    encoder: &dyn Encoder,
    prompter: &mut dyn Prompter,
) -> Result<SessionOutcome> {
    print_banner("FLAC to Opus Album Converter");

    let version = encoder.probe()?;
    println!("Encoder: {} ({})", encoder.name(), version);

    let converter = AlbumConverter::new(config, encoder)?;
    let label = config.source_label();
    let mut outcome = SessionOutcome::default();

    loop {
        println!(
            "Scanning for albums with {} files in {}",
            label,
            config.root().display()
        );
        let albums = scan_albums(config.root(), config.source_extensions.as_slice())?;
        display_albums(&albums, &label);
        if albums.is_empty() {
            break;
        }
        display_disk_space(config.root());

        let selected = prompt_selection(&albums, &label, prompter)?;
        if selected.is_empty() {
            println!("No albums selected. Exiting.");
            break;
        }

        let summary = process_selection(&converter, &selected, prompter)?;
        print_summary_report(
            &summary.files,
            summary.albums_succeeded,
            summary.albums_total,
            Duration::from_secs_f64(summary.elapsed_secs),
        );
        display_disk_space(config.root());

        outcome.passes += 1;
        outcome.last_pass = Some(summary);

        match prompter.confirm("\nWould you like to convert more albums?")? {
            Some(true) => {
                println!("\nRestarting conversion process...\n");
                info!(pass = outcome.passes + 1, "Starting another pass");
            }
            Some(false) => break,
            None => {
                println!("\nOperation cancelled.");
                break;
            }
        }
    }

    Ok(outcome)
}

/// Write the JSON report of one pass.
pub fn write_report(path: &Path, summary: &PassSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write run report to {}", path.display()))?;
    info!(path = %path.display(), "Run report written");
    Ok(())
}
