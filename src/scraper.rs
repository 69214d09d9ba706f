//! Per-channel scraping: resolve, stream history, download photos, write rows.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use tracing::{info, warn};

use crate::channel::ChannelRef;
use crate::error::Result;
use crate::export::{MessageRecord, RecordWriter};
use crate::source::{ChannelSource, SourceMessage};

/// Result of one channel pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// Whole history (or the configured limit) was written.
    Scraped {
        title: String,
        messages: usize,
        photos: usize,
    },
    /// The channel was abandoned. Rows written before the failure stay in the file.
    Skipped {
        reason: String,
        messages: usize,
        photos: usize,
    },
}

impl ChannelOutcome {
    /// Rows this channel contributed to the CSV.
    pub fn messages(&self) -> usize {
        match self {
            ChannelOutcome::Scraped { messages, .. } | ChannelOutcome::Skipped { messages, .. } => {
                *messages
            }
        }
    }

    pub fn photos(&self) -> usize {
        match self {
            ChannelOutcome::Scraped { photos, .. } | ChannelOutcome::Skipped { photos, .. } => {
                *photos
            }
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ChannelOutcome::Skipped { .. })
    }
}

#[derive(Default)]
struct Progress {
    messages: usize,
    photos: usize,
}

/// Scrape one channel into `writer`, downloading photos into `media_dir`.
///
/// Never fails: any error abandons the channel and is reported as
/// [`ChannelOutcome::Skipped`].
pub async fn scrape_channel<S, W>(
    source: &S,
    channel: &ChannelRef,
    writer: &mut RecordWriter<W>,
    media_dir: &Path,
    limit: Option<usize>,
) -> ChannelOutcome
where
    S: ChannelSource,
    W: Write,
{
    let mut progress = Progress::default();

    match scrape_into(source, channel, writer, media_dir, limit, &mut progress).await {
        Ok(title) => {
            info!(
                channel = %channel,
                messages = progress.messages,
                photos = progress.photos,
                "Finished scraping {} ({})",
                title,
                channel
            );
            ChannelOutcome::Scraped {
                title,
                messages: progress.messages,
                photos: progress.photos,
            }
        }
        Err(err) => {
            warn!(
                channel = %channel,
                messages = progress.messages,
                "Error scraping data from {}: {}",
                channel,
                err
            );
            ChannelOutcome::Skipped {
                reason: err.to_string(),
                messages: progress.messages,
                photos: progress.photos,
            }
        }
    }
}

async fn scrape_into<S, W>(
    source: &S,
    channel: &ChannelRef,
    writer: &mut RecordWriter<W>,
    media_dir: &Path,
    limit: Option<usize>,
    progress: &mut Progress,
) -> Result<String>
where
    S: ChannelSource,
    W: Write,
{
    let resolved = source.resolve_channel(channel).await?;
    info!("Starting scraping for channel: {} ({})", resolved.title, channel);

    let mut messages = source.messages(&resolved.handle);

    loop {
        if limit.is_some_and(|max| progress.messages >= max) {
            info!(channel = %channel, "Message limit reached");
            break;
        }

        let Some(message) = messages.next().await else {
            break;
        };
        let message = message?;

        // The row is written only after the download finished.
        let media_path = if message.has_photo() {
            let path = media_dir.join(channel.media_file_name(message.id()));
            source.download_photo(&message, &path).await?;
            progress.photos += 1;
            Some(path.to_string_lossy().into_owned())
        } else {
            None
        };

        writer.write(&MessageRecord {
            channel_title: resolved.title.clone(),
            channel_username: channel.to_string(),
            id: message.id(),
            message: message.text().map(str::to_string),
            date: message.date(),
            media_path,
        })?;
        progress.messages += 1;
    }

    drop(messages);
    Ok(resolved.title)
}
