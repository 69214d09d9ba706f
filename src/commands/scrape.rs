//! Scrape every configured channel into one CSV file and a photo directory.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::channel::ChannelRef;
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::export::RecordWriter;
use crate::metrics;
use crate::scraper::{scrape_channel, ChannelOutcome};
use crate::source::ChannelSource;

/// Outcome of one channel in a run.
#[derive(Debug, Clone)]
pub struct ChannelReport {
    /// Reference as configured
    pub channel: String,
    pub outcome: ChannelOutcome,
    pub elapsed: Duration,
}

/// Everything a run produced, in channel order.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_csv: PathBuf,
    pub media_dir: PathBuf,
    pub channels: Vec<ChannelReport>,
}

impl RunSummary {
    pub fn total_messages(&self) -> usize {
        self.channels.iter().map(|c| c.outcome.messages()).sum()
    }

    pub fn total_photos(&self) -> usize {
        self.channels.iter().map(|c| c.outcome.photos()).sum()
    }

    /// Channels that were abandoned, with the reason.
    pub fn skipped(&self) -> Vec<(&str, &str)> {
        self.channels
            .iter()
            .filter_map(|c| match &c.outcome {
                ChannelOutcome::Skipped { reason, .. } => Some((c.channel.as_str(), reason.as_str())),
                ChannelOutcome::Scraped { .. } => None,
            })
            .collect()
    }

    /// Log a per-channel table and totals.
    pub fn log(&self) {
        for report in &self.channels {
            match &report.outcome {
                ChannelOutcome::Scraped {
                    title,
                    messages,
                    photos,
                } => info!(
                    "  {:<28} {:>6} messages {:>5} photos  {}",
                    report.channel, messages, photos, title
                ),
                ChannelOutcome::Skipped {
                    reason,
                    messages,
                    photos,
                } => warn!(
                    "  {:<28} {:>6} messages {:>5} photos  skipped: {}",
                    report.channel, messages, photos, reason
                ),
            }
        }
        info!(
            "All channels processed: {} messages, {} photos, {} skipped. Data saved to '{}'",
            self.total_messages(),
            self.total_photos(),
            self.skipped().len(),
            self.output_csv.display()
        );
    }
}

/// Scrape all channels in `config` sequentially.
///
/// Only setting up the output (media directory, CSV file) can fail; every
/// channel failure is recorded in the summary and the loop continues.
pub async fn run<S: ChannelSource>(source: &S, config: &ScraperConfig) -> Result<RunSummary> {
    fs::create_dir_all(&config.media_dir)?;
    info!("Ensured media directory '{}' exists", config.media_dir.display());

    if let Some(parent) = config.output_csv.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = RecordWriter::create(&config.output_csv)?;

    let mut reports = Vec::with_capacity(config.channels.len());

    for raw in &config.channels {
        let started = Instant::now();

        let outcome = match ChannelRef::parse(raw) {
            Ok(channel) => {
                tokio::time::sleep(config.delay).await;
                let outcome =
                    scrape_channel(source, &channel, &mut writer, &config.media_dir, config.limit)
                        .await;
                writer.flush()?;
                outcome
            }
            Err(err) => {
                warn!(channel = %raw, "Skipping channel: {}", err);
                ChannelOutcome::Skipped {
                    reason: err.to_string(),
                    messages: 0,
                    photos: 0,
                }
            }
        };

        let elapsed = started.elapsed();
        metrics::record_channel(raw, &outcome, elapsed);
        reports.push(ChannelReport {
            channel: raw.clone(),
            outcome,
            elapsed,
        });
    }

    writer.finish()?;

    Ok(RunSummary {
        output_csv: config.output_csv.clone(),
        media_dir: config.media_dir.clone(),
        channels: reports,
    })
}
