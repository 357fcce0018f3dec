use anyhow::Context;
use bridge::StationBridge;
use clap::Parser;
use generator::series::{write_series_csv, GeneratorConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::StationConfig;
use workflow::runner::Runner;

mod bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Kp space-weather risk station")]
struct Args {
    /// Load station settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the persisted profile and mission log
    #[arg(long)]
    state_dir: Option<PathBuf>,
    /// URL or file path of the Kp table
    #[arg(long)]
    source: Option<String>,
    #[arg(long)]
    refresh_secs: Option<u64>,
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Refresh once, print the risk view and exit
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Serve the HTTP bridge and refresh periodically until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Write a synthetic Kp table to this path before anything else
    #[arg(long)]
    generate: Option<PathBuf>,
    /// Seed for --generate
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Storm peak Kp for --generate
    #[arg(long)]
    storm_peak: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let base_config = if let Some(path) = &args.config {
        StationConfig::load(path)?
    } else {
        StationConfig::default()
    };
    let config = base_config.with_overrides(
        args.state_dir.clone(),
        args.source.clone(),
        args.refresh_secs,
        args.bind,
    );
    config.validate()?;

    if let Some(path) = &args.generate {
        let generator = GeneratorConfig {
            seed: args.seed,
            storm_peak: args.storm_peak,
            ..Default::default()
        };
        let count = write_series_csv(path, &generator)?;
        println!("Wrote {} synthetic Kp samples to {}", count, path.display());
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating station runtime")?;
    runtime.block_on(run(&args, config))
}

async fn run(args: &Args, config: StationConfig) -> anyhow::Result<()> {
    let runner = Runner::new(config.clone());
    let dashboard = runner.open_dashboard()?;

    if args.offline {
        let report = runner.execute(&dashboard).await;
        println!("{}", report.summary());
    }

    if args.serve {
        let feed_handle = dashboard.feed().spawn(config.refresh_period());
        let bridge = StationBridge::new(dashboard);
        println!("Station bridge on http://{} (Ctrl+C to stop)...", config.bind);
        bridge
            .serve(config.bind, async {
                if let Err(err) = signal::ctrl_c().await {
                    log::warn!("Ctrl+C handler failed: {}", err);
                }
            })
            .await?;
        feed_handle.stop().await;
    }

    Ok(())
}
