//! Simulator CLI.
//!
//! Loads a TOML options document, applies `path=value` overrides from the
//! command line, and runs the configured trial batch:
//!
//! ```bash
//! tourney_sim --config configs/default.toml trials=100 swiss.opponent_pairing=Slide
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tourney_core::{Engine, Options};

/// Tournament scheduling and rating simulator
#[derive(Parser, Debug)]
#[command(name = "tourney_sim", version, about)]
struct Args {
    /// Path to the TOML options file
    #[arg(short, long, default_value = "configs/default.toml")]
    config: PathBuf,

    /// Option overrides addressed by dotted field path, e.g.
    /// `swiss.schedule_rounds_ahead=2`
    #[arg(value_name = "PATH=VALUE")]
    overrides: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = Options::from_file_with_overrides(&args.config, &args.overrides)
        .with_context(|| format!("failed to load options from {}", args.config.display()))?;

    let mut engine = Engine::new(options).context("invalid configuration")?;
    engine.run_trials().context("simulation failed")?;
    Ok(())
}
