use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use ordnance_app::demo;
use ordnance_app::game_loop;
use ordnance_app::state::AppError;
use ordnance_core::config::OrdnanceConfig;
use ordnance_sim::engine::SimConfig;

/// ORDNANCE detonation server with a scripted demo client
#[derive(Parser, Debug)]
#[command(name = "ordnance")]
#[command(about = "Run the detonation server and play one scripted client round")]
struct Args {
    /// TOML config file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Seconds to wait on each demo step
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
}

fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let ordnance = match &args.config {
        Some(path) => OrdnanceConfig::load(path)?,
        None => OrdnanceConfig::default(),
    };
    info!(seed = args.seed, tick_rate = ordnance.tick_rate.0, "starting ORDNANCE");

    let handle = game_loop::spawn_game_loop(SimConfig {
        seed: args.seed,
        ordnance,
    })?;
    let outcome = demo::run_demo(&handle, Duration::from_secs(args.timeout_secs));
    handle.shutdown();

    println!("{}", serde_json::to_string_pretty(&outcome?)?);
    Ok(())
}
