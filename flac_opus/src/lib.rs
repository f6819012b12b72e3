//! flac-opus - Interactive FLAC to Opus Album Converter
//!
//! Scans a music collection for album directories holding FLAC files, lets
//! the operator pick albums, encodes them with `opusenc` on a small worker
//! pool and deletes the sources only when a whole album converted cleanly.
//!
//! ## Converting one album
//! ```rust,ignore
//! use flac_opus::{scan_albums, AlbumConverter, ConverterConfig, OpusEncoder};
//! use album_utils::ConsolePrompter;
//!
//! let config = ConverterConfig::new("/music");
//! let encoder = OpusEncoder::new(&config.encoder, &config.bitrate);
//! let albums = scan_albums(config.root(), config.source_extensions.as_slice())?;
//! let converter = AlbumConverter::new(&config, &encoder)?;
//! converter.convert_album(&albums[0], &mut ConsolePrompter::new())?;
//! ```

pub mod cleanup;
pub mod config;
pub mod conversion_api;
pub mod encoder;
pub mod scanner;
pub mod selection;
pub mod session;
pub mod testing;

pub use cleanup::{CleanupManager, DeletionResult};
pub use config::ConverterConfig;
pub use conversion_api::{
    AlbumConverter, AlbumReport, AlbumStage, AlbumVerdict, ConversionOutcome, FileOutcome,
};
pub use encoder::{Encoder, OpusEncoder};
pub use scanner::{display_albums, scan_albums, Album};
pub use selection::{parse_selection, prompt_selection, resolve, select, Selection};
pub use session::{run_session, write_report, PassSummary, SessionOutcome};
