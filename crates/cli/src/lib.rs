//! # mockgen command line
//!
//! Turns flags (and an optional TOML request file) into a
//! [`GenerationRequest`](mockgen_model::GenerationRequest) and hands it to the
//! [`Driver`], which walks extraction, synthesis, header injection and an
//! atomic publish of the output file.

use anyhow::Result;
use clap::Parser;

mod driver;
mod flags;

pub use driver::{write_atomically, Driver, GenerationReport, Stage};
pub use flags::Cli;

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Parse the process arguments and run one generation
pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let request = cli.into_request()?;
    let report = Driver::new().run(&request)?;
    log::info!(
        "wrote {} mocks ({} bytes) to {}",
        report.mocks.len(),
        report.bytes,
        report.destination.display()
    );
    Ok(())
}
