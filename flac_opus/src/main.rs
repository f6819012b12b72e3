use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

use album_utils::error_handler::{install_panic_handler, report_error};
use album_utils::interrupt::install_interrupt_handler;
use album_utils::logging::{init_logging, LogConfig};
use album_utils::{AppError, ConsolePrompter};
use flac_opus::config::{DEFAULT_BITRATE, DEFAULT_ENCODER, DEFAULT_WORKERS};
use flac_opus::{run_session, write_report, ConverterConfig, OpusEncoder};

#[derive(Parser)]
#[command(name = "flac-opus")]
#[command(version, about = "Convert FLAC albums to Opus and clean up the originals", long_about = None)]
struct Cli {
    /// Root directory containing music albums
    #[arg(value_name = "MUSIC_ROOT")]
    music_root: PathBuf,

    /// Target bitrate passed to the encoder
    #[arg(long, default_value = DEFAULT_BITRATE)]
    bitrate: String,

    /// Concurrent conversions per album
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    jobs: usize,

    /// Source file extension (repeatable)
    #[arg(long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Encoder binary
    #[arg(long, default_value = DEFAULT_ENCODER)]
    encoder: PathBuf,

    /// Write a JSON report of the last conversion pass
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    #[arg(long)]
    no_progress: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn validate_root(root: &std::path::Path) -> Result<PathBuf, String> {
    if !root.exists() {
        return Err(format!(
            "Error: Music directory '{}' does not exist",
            root.display()
        ));
    }
    if !root.is_dir() {
        return Err(format!("Error: '{}' is not a directory", root.display()));
    }
    root.canonicalize()
        .map_err(|e| format!("Error: cannot resolve '{}': {}", root.display(), e))
}

fn run(cli: Cli, music_root: PathBuf) -> anyhow::Result<()> {
    let config = ConverterConfig::new(music_root)
        .with_source_extensions(&cli.extensions)
        .with_bitrate(cli.bitrate)
        .with_encoder(cli.encoder)
        .with_workers(cli.jobs)
        .with_progress(!cli.no_progress);
    let encoder = OpusEncoder::new(&config.encoder, &config.bitrate);

    info!(
        root = %config.root().display(),
        workers = config.workers,
        bitrate = %config.bitrate,
        "Starting session"
    );

    let mut prompter = ConsolePrompter::new();
    let outcome = run_session(&config, &encoder, &mut prompter)?;

    if let (Some(path), Some(pass)) = (cli.report.as_deref(), outcome.last_pass.as_ref()) {
        write_report(path, pass)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Err(e) = init_logging("flac_opus", LogConfig::default().with_level(level)) {
        eprintln!("⚠️  File logging disabled: {:#}", e);
    }
    install_panic_handler();
    if let Err(e) = install_interrupt_handler() {
        tracing::warn!(error = %e, "Ctrl-C handler unavailable");
    }

    let music_root = match validate_root(&cli.music_root) {
        Ok(root) => root,
        Err(message) => {
            println!("{}", message);
            return ExitCode::from(1);
        }
    };

    match run(cli, music_root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AppError>() {
                Some(app) => println!("{}", app.user_message()),
                None => {
                    println!("\nUnexpected error: {:#}", e);
                    report_error::<dyn std::error::Error>(e.as_ref());
                }
            }
            tracing::error!(error = %format!("{:#}", e), "Run aborted");
            ExitCode::from(1)
        }
    }
}
