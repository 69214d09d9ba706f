//! Telegram Channel Scraper Library
//!
//! This library provides tools to:
//! - Load Telegram API credentials from `.env`
//! - Open and authorize a persisted Telegram session
//! - Walk the full history of public channels
//! - Write one CSV row per message and download attached photos

pub mod channel;
pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod scraper;
pub mod session;
pub mod source;

// Re-export common types
pub use channel::ChannelRef;
pub use config::{Credentials, ScraperConfig, DEFAULT_CHANNELS};
pub use error::{Error, Result};
pub use export::{MessageRecord, RecordWriter};
pub use scraper::{scrape_channel, ChannelOutcome};
pub use session::{SessionLock, TelegramClient};
pub use source::{ChannelSource, ResolvedChannel, SourceMessage};
