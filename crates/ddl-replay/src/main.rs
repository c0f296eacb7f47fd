use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ddl_replay::{ReplayScenario, build_dispatcher, replay};
use infrastructure::{RecordingAgent, Settings, load_values};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Scenario file to replay
    #[arg(long)]
    scenario: PathBuf,

    /// Override the configured backup depth
    #[arg(long)]
    backup_depth: Option<usize>,

    /// Print only the final DigitalData
    #[arg(long)]
    data_only: bool,
}

async fn run() -> Result<()> {
    dotenv().ok();

    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,ddl_replay=debug,application=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("🏷️ DDL Replay Starting...");

    let args = Args::parse();
    info!("📂 Config directory: {}", args.config_dir);

    let mut settings = Settings::load(&args.config_dir)
        .with_context(|| format!("Failed to load settings from {}", args.config_dir))?;
    if let Some(depth) = args.backup_depth {
        settings.backup_depth = depth;
    }
    info!(
        environment = %settings.environment,
        origin = %settings.origin,
        backup_depth = settings.backup_depth,
        "⚙️ Settings loaded"
    );

    let values = Arc::new(load_values(&settings.values_file)?);
    let scenario = ReplayScenario::load(&args.scenario)?;

    let recorder = RecordingAgent::new();
    let dispatcher = build_dispatcher(&settings, values, &recorder, settings.clock.build());

    let outcome = replay(dispatcher, &scenario, &recorder).await?;

    let output = if args.data_only {
        serde_json::to_string_pretty(&outcome.digital_data)?
    } else {
        serde_json::to_string_pretty(&outcome)?
    };
    println!("{}", output);

    Ok(())
}

fn main() {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start the async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run()) {
        eprintln!("\n❌ CRITICAL ERROR: {:?}", e);
        std::process::exit(1);
    }
}
