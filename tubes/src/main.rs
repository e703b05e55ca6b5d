//! # Tubes
//!
//! Entry point for the floating tubes arena. Opens a window by default; pass
//! `--headless` to drive the same scene without a GPU for a fixed number of
//! frames.

use anyhow::Result;
use clap::Parser;
use tubes::{app, Cli};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.scene_config()?;

    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    if cli.headless {
        let summary = app::run_headless(config, cli.frames)?;
        tracing::info!(?summary, "headless run finished");
        Ok(())
    } else {
        let shader_dir = (!cli.no_watch).then_some(cli.shader_dir);
        app::run(config, shader_dir)
    }
}
