use clap::Parser;
use tracing::{info, instrument, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bom_feed_parser::config::Config;
use bom_feed_parser::fetcher::HttpFeedSource;
use bom_feed_parser::orchestrator::{FeedOrchestrator, RunStatus};

#[derive(Parser)]
#[command(name = "bom-feed-parser")]
#[command(about = "Fetch BoM forecast and observation feeds and print the normalized readings", long_about = None)]
struct Cli {
    /// State or territory code (QLD, NSW, NT, SA, TAS, VIC, WA)
    #[arg(long, env = "BOM_REGION")]
    region: Option<String>,

    /// Forecast area name, exactly as it appears in the feed
    #[arg(long, env = "BOM_FORECAST_AREA")]
    forecast_area: Option<String>,

    /// Observation station name, exactly as it appears in the feed
    #[arg(long, env = "BOM_OBSERVATION_AREA")]
    observation_area: Option<String>,

    /// Base URL the product files are fetched from
    #[arg(long, env = "BOM_FEED_BASE_URL")]
    feed_base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "BOM_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    /// Layer the flags over the environment-derived config.
    fn apply_to(&self, config: &mut Config) {
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(area) = &self.forecast_area {
            config.forecast_area = area.clone();
        }
        if let Some(area) = &self.observation_area {
            config.observation_area = area.clone();
        }
        if let Some(url) = &self.feed_base_url {
            config.feed_base_url = url.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
    }
}

#[instrument]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before the subscriber, so RUST_LOG can come from .env
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bom_feed_parser=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    cli.apply_to(&mut config);

    let source = HttpFeedSource::new(config.request_timeout())?;
    let orchestrator = FeedOrchestrator::new(config, source);
    info!("Starting feed run with config: {:?}", orchestrator.config());
    let result = orchestrator.run();

    match result.status() {
        RunStatus::Complete => info!("Both feeds processed"),
        status => warn!(
            "Run finished with status {:?}: {}",
            status,
            result.last_error.as_deref().unwrap_or_default()
        ),
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(())
}
