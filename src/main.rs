//! Binary entrypoint for the retro-frame display pipeline.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "retro-frame", about = "GPU display pipeline for retro emulator video")]
struct Cli {
    /// Path to YAML config file (optional; defaults apply without one)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("retro_frame={}", level).parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => retro_frame::config::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => retro_frame::config::Configuration::default(),
    };
    cfg.validate().context("validating configuration")?;
    info!("configuration loaded");

    retro_frame::render::viewer::run(cfg)?;
    Ok(())
}
