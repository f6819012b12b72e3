//! Ctrl-C handling: end the run immediately with a clean exit status.

use anyhow::{Context, Result};

/// Exit status used for an operator interrupt.
pub const INTERRUPT_EXIT_CODE: i32 = 0;

/// Install a handler that stops the whole run on Ctrl-C.
///
/// Pending waits are abandoned; encoder processes in the same process group
/// receive the terminal's signal themselves.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        tracing::warn!("Interrupted by operator");
        println!("\n\nOperation cancelled by user.");
        std::process::exit(INTERRUPT_EXIT_CODE);
    })
    .context("Failed to install Ctrl-C handler")
}
