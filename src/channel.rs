//! Channel references and media file naming

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{1,32}$").expect("valid username regex")
});

/// A public channel handle as configured, e.g. `@ZemenExpress`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelRef {
    raw: String,
}

impl ChannelRef {
    /// Parse a configured reference. Accepts `@name` or `name`; the name is
    /// restricted to `[A-Za-z0-9_]` so it is safe inside a file name.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let name = raw.strip_prefix('@').unwrap_or(raw);
        if !USERNAME_RE.is_match(name) {
            return Err(Error::InvalidArgument(format!(
                "'{}' is not a valid channel username",
                input
            )));
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Reference as configured (keeps the `@` if present).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Username without the leading `@`.
    pub fn username(&self) -> &str {
        self.raw.strip_prefix('@').unwrap_or(&self.raw)
    }

    /// File name for a photo attached to `message_id` in this channel.
    pub fn media_file_name(&self, message_id: i32) -> String {
        format!("{}_{}.jpg", self.username(), message_id)
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
