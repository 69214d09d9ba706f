//! Command implementations
//!
//! Each module corresponds to a binary entry point.

pub mod init_session;
pub mod scrape;

pub use scrape::{ChannelReport, RunSummary};
