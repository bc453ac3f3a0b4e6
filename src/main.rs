use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use trendcast_ui::{
    next_city, HttpPreloader, ImageRotator, Orchestrator, RotationStore, SkipPreload,
    TerminalPage,
};
use trendcast_weather::WeatherClient;

/// Weather trends for a city: current reading plus five trend charts.
#[derive(Debug, Parser)]
#[command(name = "trendcast", version, about)]
struct Args {
    /// City to look up. Without it, cities are read from stdin, one per line.
    city: Option<String>,

    /// Config file (defaults to <config dir>/trendcast/config.toml)
    #[arg(long, env = "TRENDCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Trends backend base URL
    #[arg(long, env = "TRENDCAST_SERVER")]
    server: Option<String>,

    /// Directory for chart PNGs
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip the forecast when the weather lookup reports an error
    #[arg(long)]
    abort_on_weather_error: bool,

    /// Don't download background images up front
    #[arg(long)]
    no_preload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    trendcast_core::init()?;

    let mut app = trendcast_core::App::new(args.config.as_deref())?;
    app.configure(|config| {
        if let Some(server) = &args.server {
            config.server.base_url = server.clone();
        }
        if let Some(out) = &args.out {
            config.output.chart_dir = out.clone();
        }
        if args.abort_on_weather_error {
            config.pipeline.abort_on_weather_error = true;
        }
        if args.no_preload {
            config.backgrounds.preload = false;
        }
    });

    let validation = app.config().validate();
    if !validation.is_valid() {
        anyhow::bail!("Invalid options: {}", validation.error_summary());
    }

    let config = app.shared_config();

    let client = WeatherClient::new(
        &config.server.base_url,
        config.server.request_timeout_secs.map(Duration::from_secs),
    )
    .context("Failed to create weather client")?;

    let mut rotator = ImageRotator::from_config(&config.backgrounds);
    if config.backgrounds.preload {
        let preloader = HttpPreloader::new().context("Failed to create image preloader")?;
        rotator.preload(&preloader).await;
    } else {
        rotator.preload(&SkipPreload).await;
    }

    let mut page = TerminalPage::new(config.output.chart_dir.clone());
    rotator.set_initial(&mut page);

    let mut orchestrator = Orchestrator::new(client, rotator)
        .abort_on_weather_error(config.pipeline.abort_on_weather_error);
    if config.backgrounds.persist_rotation {
        orchestrator = orchestrator.with_store(RotationStore::new(config.rotation_state_path()));
    }

    tracing::info!("trendcast ready, backend at {}", config.server.base_url);

    match args.city {
        Some(city) => {
            page.set_input(city);
            orchestrator.submit(&mut page).await;
        }
        None => {
            let mut stdin = BufReader::new(tokio::io::stdin());
            while let Some(city) = next_city(&mut stdin).await {
                page.set_input(city);
                orchestrator.submit(&mut page).await;
            }
        }
    }

    app.shutdown()?;

    Ok(())
}
