//! In-memory channel source for driving the scraper without Telegram.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::stream::{self, BoxStream, StreamExt};

use telegram_scraper::{ChannelRef, ChannelSource, Error, ResolvedChannel, Result, SourceMessage};

#[derive(Debug, Clone)]
pub struct FakeMessage {
    pub id: i32,
    pub text: Option<String>,
    pub date: DateTime<Utc>,
    pub photo: bool,
}

impl FakeMessage {
    pub fn plain(id: i32, text: &str) -> Self {
        Self {
            id,
            text: Some(text.to_string()),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::minutes(id as i64),
            photo: false,
        }
    }

    pub fn photo(id: i32, caption: Option<&str>) -> Self {
        Self {
            text: caption.map(str::to_string),
            photo: true,
            ..Self::plain(id, "")
        }
    }
}

impl SourceMessage for FakeMessage {
    fn id(&self) -> i32 {
        self.id
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn has_photo(&self) -> bool {
        self.photo
    }
}

struct FakeChannel {
    title: String,
    messages: Vec<FakeMessage>,
    /// Yield an error after this many messages
    fail_after: Option<usize>,
}

#[derive(Default)]
pub struct FakeSource {
    channels: HashMap<String, FakeChannel>,
    failing_downloads: HashSet<i32>,
    resolved: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel keyed by username (without `@`), messages newest first.
    pub fn with_channel(mut self, username: &str, title: &str, messages: Vec<FakeMessage>) -> Self {
        self.channels.insert(
            username.to_string(),
            FakeChannel {
                title: title.to_string(),
                messages,
                fail_after: None,
            },
        );
        self
    }

    /// Add a channel whose history breaks after `after` messages.
    pub fn with_broken_channel(
        mut self,
        username: &str,
        title: &str,
        messages: Vec<FakeMessage>,
        after: usize,
    ) -> Self {
        self.channels.insert(
            username.to_string(),
            FakeChannel {
                title: title.to_string(),
                messages,
                fail_after: Some(after),
            },
        );
        self
    }

    pub fn with_failing_download(mut self, message_id: i32) -> Self {
        self.failing_downloads.insert(message_id);
        self
    }

    /// Usernames passed to `resolve_channel`, in call order.
    pub fn resolved(&self) -> Vec<String> {
        self.resolved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelSource for FakeSource {
    type Handle = String;
    type Message = FakeMessage;

    async fn resolve_channel(&self, channel: &ChannelRef) -> Result<ResolvedChannel<String>> {
        let username = channel.username().to_string();
        self.resolved.lock().unwrap().push(username.clone());

        let found = self
            .channels
            .get(&username)
            .ok_or_else(|| Error::ChatNotFound(format!("Username {} not found", channel)))?;

        Ok(ResolvedChannel {
            title: found.title.clone(),
            handle: username,
        })
    }

    fn messages<'a>(&'a self, handle: &'a String) -> BoxStream<'a, Result<FakeMessage>> {
        let channel = &self.channels[handle];
        let items: Vec<Result<FakeMessage>> = match channel.fail_after {
            Some(after) => channel
                .messages
                .iter()
                .take(after)
                .cloned()
                .map(Ok)
                .chain(std::iter::once(Err(Error::TelegramError(
                    "FLOOD_WAIT_30".to_string(),
                ))))
                .collect(),
            None => channel.messages.iter().cloned().map(Ok).collect(),
        };
        stream::iter(items).boxed()
    }

    async fn download_photo(&self, message: &FakeMessage, path: &Path) -> Result<()> {
        if self.failing_downloads.contains(&message.id) {
            return Err(Error::DownloadError(format!("{}: connection reset", path.display())));
        }
        std::fs::write(path, format!("jpeg-{}", message.id))?;
        Ok(())
    }
}
