//! Create or verify the Telegram session used by the scraper.
//!
//! Usage: init_session

use tracing_subscriber::EnvFilter;

use telegram_scraper::commands::init_session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("telegram_scraper=info".parse()?),
        )
        .init();

    init_session::run().await?;
    Ok(())
}
