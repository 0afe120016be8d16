//! Web server status integration binary

use clap::Parser;
use common::logging::{self, LogFormat};
use statusprobe::HttpProber;
use statusprobe_integration::{Config, PublishOptions, run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "statusprobe-integration")]
#[command(about = "Poll web server status endpoints and publish them as entities")]
#[command(version)]
struct Cli {
    /// Configuration file, searched in the standard locations when omitted
    #[arg(short, long, env = "STATUSPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the published payload
    #[arg(long)]
    pretty: bool,

    /// Publish metrics (all sections when none is selected)
    #[arg(long)]
    metrics: bool,

    /// Publish inventory (all sections when none is selected)
    #[arg(long)]
    inventory: bool,

    /// Publish events (all sections when none is selected)
    #[arg(long)]
    events: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            pretty: self.pretty,
            metrics: self.metrics,
            inventory: self.inventory,
            events: self.events,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> common::Result<()> {
    let cli = Cli::parse();

    // Load errors surface through main's Err; the level comes from the config
    let config = Config::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_deref().unwrap_or("info")
    };
    let format = LogFormat::from_name(config.logging.format.as_deref().unwrap_or("text"));
    logging::init(level, format);

    match &config.source {
        Some(path) => tracing::info!("Loaded configuration from: {}", path.display()),
        None => tracing::info!("No configuration file found, using defaults"),
    }

    let settings = config.to_settings();
    for endpoint in &settings.endpoints {
        tracing::debug!(entity = %endpoint.entity, url = %endpoint.url, "Endpoint configured");
    }
    let prober = HttpProber::with_timeout(settings.probe_timeout).map_err(common::Error::init)?;

    let report = run(&settings, &prober, std::io::stdout(), &cli.publish_options()).await?;

    if report.failed() > 0 {
        tracing::warn!(
            failed = report.failed(),
            total = report.endpoints.len(),
            "Some endpoints could not be polled"
        );
    }

    Ok(())
}
