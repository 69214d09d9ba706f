//! Channel resolution and history access through grammers

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use grammers_client::types::peer::Peer;
use grammers_client::types::{Media, Message};
use grammers_client::Client;

use crate::channel::ChannelRef;
use crate::error::{Error, Result};
use crate::source::{ChannelSource, ResolvedChannel, SourceMessage};

/// Get the display title for a channel-like peer.
///
/// Users and bots have no title and cannot be scraped as channels.
pub fn channel_title(peer: &Peer) -> Option<String> {
    match peer {
        Peer::Channel(channel) => Some(channel.title().to_string()),
        Peer::Group(group) => Some(group.title().unwrap_or("Unknown").to_string()),
        Peer::User(_) => None,
    }
}

impl SourceMessage for Message {
    fn id(&self) -> i32 {
        Message::id(self)
    }

    fn text(&self) -> Option<&str> {
        let text = Message::text(self);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn date(&self) -> DateTime<Utc> {
        Message::date(self)
    }

    fn has_photo(&self) -> bool {
        matches!(self.media(), Some(Media::Photo(_)))
    }
}

#[async_trait]
impl ChannelSource for Client {
    type Handle = Peer;
    type Message = Message;

    async fn resolve_channel(&self, channel: &ChannelRef) -> Result<ResolvedChannel<Peer>> {
        let peer = self
            .resolve_username(channel.username())
            .await?
            .ok_or_else(|| Error::ChatNotFound(format!("Username {} not found", channel)))?;

        let title = channel_title(&peer)
            .ok_or_else(|| Error::NotAChannel(format!("{} is a user account", channel)))?;

        Ok(ResolvedChannel {
            title,
            handle: peer,
        })
    }

    fn messages<'a>(&'a self, handle: &'a Peer) -> BoxStream<'a, Result<Message>> {
        let iter = self.iter_messages(handle);
        stream::try_unfold(iter, |mut iter| async move {
            let next = iter.next().await.map_err(Error::from)?;
            Ok::<_, Error>(next.map(|msg| (msg, iter)))
        })
        .boxed()
    }

    async fn download_photo(&self, message: &Message, path: &Path) -> Result<()> {
        let media = message.media().ok_or_else(|| {
            Error::DownloadError(format!("message {} has no media", Message::id(message)))
        })?;

        self.download_media(&media, path)
            .await
            .map_err(|e| Error::DownloadError(format!("{}: {}", path.display(), e)))
    }
}
