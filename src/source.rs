//! Platform abstraction used by the scraper.
//!
//! The scraper only needs three things from the messaging platform: resolve a
//! channel, stream its history, download a photo. `grammers_client::Client`
//! implements this in [`crate::chat`]; tests plug in an in-memory source.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::channel::ChannelRef;
use crate::error::Result;

/// A single message as seen by the scraper.
pub trait SourceMessage: Send + Sync {
    /// Platform-assigned identifier, unique within the channel
    fn id(&self) -> i32;
    /// Message text, `None` when the message has no text
    fn text(&self) -> Option<&str>;
    fn date(&self) -> DateTime<Utc>;
    /// Whether the message carries a photo attachment
    fn has_photo(&self) -> bool;
}

/// Channel resolved from a [`ChannelRef`].
#[derive(Debug, Clone)]
pub struct ResolvedChannel<H> {
    pub title: String,
    pub handle: H,
}

#[async_trait]
pub trait ChannelSource: Send + Sync {
    type Handle: Send + Sync;
    type Message: SourceMessage;

    /// Resolve a channel reference to a channel with a display title.
    async fn resolve_channel(&self, channel: &ChannelRef)
        -> Result<ResolvedChannel<Self::Handle>>;

    /// Lazily stream the channel history in platform order (newest first).
    fn messages<'a>(&'a self, handle: &'a Self::Handle) -> BoxStream<'a, Result<Self::Message>>;

    /// Download the photo attached to `message` into `path`.
    async fn download_photo(&self, message: &Self::Message, path: &Path) -> Result<()>;
}
