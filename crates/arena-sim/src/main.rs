//! # Arena Sim
//!
//! Headless entry point. Loads `arena.toml` (or the path given as the first
//! argument), runs one simulation, and reports the summary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use arena_sim::{SimConfig, Simulation, CONFIG_FILE};
use tracing::info;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_owned());
    let mut config = SimConfig::load_from(&path);
    config.validate();

    let mut filter = EnvFilter::from_default_env()
        .add_directive("arena_sim=info".parse()?)
        .add_directive("arena_combat=info".parse()?);
    for directive in config.log_filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        filter = filter.add_directive(
            directive
                .parse::<Directive>()
                .with_context(|| format!("invalid log_filter directive `{directive}`"))?,
        );
    }
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    info!("Arena sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "{} s at {} Hz, world {}x{}, starting wave {}",
        config.duration_secs, config.tick_rate, config.world.width, config.world.height, config.start_wave
    );

    let json = config.summary_json;
    let summary = Simulation::new(config).run();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            "Reached wave {} ({} cleared): {} spawned, {} killed, {} formations",
            summary.wave, summary.waves_cleared, summary.enemies_spawned, summary.enemies_killed, summary.formations
        );
        info!(
            "Player took {} hits for {:.1} damage, {:.1} health left, {} xp",
            summary.player_hits, summary.player_damage, summary.player_health, summary.experience
        );
    }

    info!("Arena sim shutdown complete");
    Ok(())
}
