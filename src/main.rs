//! Telegram Channel Scraper - main entry point
//!
//! Scrapes the message history of a list of public channels into
//! `data/raw/telegram_data.csv` and their photos into `data/raw/telegram_photos/`.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use telegram_scraper::config::{delay_from_secs, DEFAULT_CONFIG_FILE};
use telegram_scraper::session::StdinPrompt;
use telegram_scraper::{
    commands, metrics, Credentials, Error, ScraperConfig, SessionLock, TelegramClient,
};

#[derive(Parser, Debug)]
#[command(name = "telegram_scraper")]
#[command(about = "Scrape Telegram channel history and photos to CSV", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML file with a `scraper:` section
    #[arg(long, env = "SCRAPER_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output CSV file (recreated on every run)
    #[arg(short, long, env = "SCRAPER_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory for downloaded photos
    #[arg(long, env = "SCRAPER_MEDIA_DIR")]
    media_dir: Option<PathBuf>,

    /// Pause before each channel, in seconds
    #[arg(long, env = "SCRAPER_DELAY_SECS")]
    delay_secs: Option<f64>,

    /// Maximum messages per channel (default: whole history)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Channels to scrape instead of the configured list (repeat or comma separate)
    #[arg(short, long = "channel", value_delimiter = ',')]
    channels: Vec<String>,

    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,
}

impl Cli {
    /// Build the run settings: defaults, then config file, then flags.
    fn scraper_config(&self) -> telegram_scraper::Result<ScraperConfig> {
        let mut config = ScraperConfig::load_from_file(&self.config)?;

        if let Some(output) = &self.output {
            config.output_csv = output.clone();
        }
        if let Some(media_dir) = &self.media_dir {
            config.media_dir = media_dir.clone();
        }
        if let Some(secs) = self.delay_secs {
            config.delay = delay_from_secs(secs)?;
        }
        if self.limit.is_some() {
            config.limit = self.limit;
        }
        if !self.channels.is_empty() {
            config.channels = self.channels.clone();
        }

        Ok(config)
    }
}

/// Connect and log in. A client that fails to authorize is disconnected.
async fn start_client(credentials: &Credentials) -> telegram_scraper::Result<TelegramClient> {
    let client = TelegramClient::connect(credentials.api_id).await?;
    if let Err(err) = client.authorize(credentials, &mut StdinPrompt).await {
        client.disconnect().await;
        return Err(err);
    }
    Ok(client)
}

/// Operator message for a client that could not be started.
fn client_start_failure(err: &Error) -> String {
    let hint = if err.is_fatal() {
        "Check the phone number in .env and that you can receive login codes."
    } else {
        "Check the network connection to Telegram and try again."
    };
    format!("Failed to start Telegram client: {}\n{}", err, hint)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("telegram_scraper=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Credentials are checked before anything touches the network.
    let credentials = match Credentials::load() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!(
                r#"
⚠️  Telegram API credentials (TG_API_ID, TG_API_HASH, phone) not found.

Create a .env file in the working directory with:
  TG_API_ID=...
  TG_API_HASH=...
  phone=+...
"#
            );
            return Err(err.into());
        }
    };
    let config = cli.scraper_config()?;

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let _lock = SessionLock::acquire()?;
    let client = match start_client(&credentials).await {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", client_start_failure(&err));
            return Err(err.into());
        }
    };
    info!("Telegram client started successfully");

    let result = commands::scrape::run(&client.client, &config).await;
    client.disconnect().await;

    let summary = result?;
    summary.log();

    Ok(())
}
