//! Configuration for Telegram API credentials and the scraping run
//!
//! Credentials come from `.env` / the process environment, run settings
//! from an optional config.yml (command-line flags override both).

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

pub const SESSION_NAME: &str = "telegram_session";
pub const LOCK_FILE: &str = "telegram_session.lock";
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
pub const DEFAULT_OUTPUT_CSV: &str = "data/raw/telegram_data.csv";
pub const DEFAULT_MEDIA_DIR: &str = "data/raw/telegram_photos";
pub const DEFAULT_DELAY_SECS: f64 = 2.0;

/// Environment keys holding the credentials.
pub const API_ID_KEY: &str = "TG_API_ID";
pub const API_HASH_KEY: &str = "TG_API_HASH";
pub const PHONE_KEY: &str = "phone";

/// Channels scraped when neither config.yml nor the command line names any.
pub const DEFAULT_CHANNELS: [&str; 22] = [
    "@ZemenExpress",
    "@nevacomputer",
    "@meneshayeofficial",
    "@ethio_brand_collection",
    "@Leyueqa",
    "@sinayelj",
    "@Shewabrand",
    "@helloomarketethiopia",
    "@modernshoppingcenter",
    "@qnashcom",
    "@Fashiontera",
    "@kuruwear",
    "@gebeyaadama",
    "@MerttEka",
    "@forfreemarket",
    "@classybrands",
    "@marakibrand",
    "@aradabrand2",
    "@marakisat2",
    "@belaclassic",
    "@AwasMart",
    "@shager_onlinestore",
];

/// Telegram API credentials.
#[derive(Clone)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"***")
            .field("phone", &self.phone)
            .finish()
    }
}

impl Credentials {
    /// Load `.env` and read credentials from the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Validate credentials using an arbitrary key lookup.
    ///
    /// Every absent or blank key is reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_id = read(API_ID_KEY);
        let api_hash = read(API_HASH_KEY);
        let phone = read(PHONE_KEY);

        let missing: Vec<String> = [
            (API_ID_KEY, api_id.is_none()),
            (API_HASH_KEY, api_hash.is_none()),
            (PHONE_KEY, phone.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(key, _)| key.to_string())
        .collect();

        match (api_id, api_hash, phone) {
            (Some(api_id), Some(api_hash), Some(phone)) => {
                let api_id = api_id.parse::<i32>().map_err(|_| {
                    Error::InvalidArgument(format!("{} must be numeric, got '{}'", API_ID_KEY, api_id))
                })?;
                Ok(Self {
                    api_id,
                    api_hash,
                    phone,
                })
            }
            _ => Err(Error::MissingCredentials(missing)),
        }
    }
}

/// Load .env file into environment variables using dotenvy
fn load_dotenv() {
    // Try current directory first, then parent
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_filename("../.env");
    }
}

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    scraper: Option<ScraperSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ScraperSection {
    channels: Option<Vec<String>>,
    output_csv: Option<PathBuf>,
    media_dir: Option<PathBuf>,
    delay_secs: Option<f64>,
    limit: Option<usize>,
}

/// Settings for one scraping run.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Channel references in processing order
    pub channels: Vec<String>,
    pub output_csv: PathBuf,
    pub media_dir: PathBuf,
    /// Pause before each channel
    pub delay: Duration,
    /// Per-channel message cap; `None` reads the whole history
    pub limit: Option<usize>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
            output_csv: PathBuf::from(DEFAULT_OUTPUT_CSV),
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            limit: None,
        }
    }
}

impl ScraperConfig {
    /// Load settings from a YAML file. A missing file yields the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse settings from YAML text, filling gaps with defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let yaml: YamlConfig = if content.trim().is_empty() {
            YamlConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let mut config = Self::default();
        let Some(section) = yaml.scraper else {
            return Ok(config);
        };

        if let Some(channels) = section.channels {
            config.channels = channels;
        }
        if let Some(output_csv) = section.output_csv {
            config.output_csv = output_csv;
        }
        if let Some(media_dir) = section.media_dir {
            config.media_dir = media_dir;
        }
        if let Some(secs) = section.delay_secs {
            config.delay = delay_from_secs(secs)?;
        }
        if section.limit.is_some() {
            config.limit = section.limit;
        }

        Ok(config)
    }
}

/// Convert a seconds value into a delay, rejecting negative and non-finite input.
pub fn delay_from_secs(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "delay must be a non-negative number of seconds, got {}",
            secs
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        Error::InvalidArgument(format!("delay of {} seconds is out of range: {}", secs, e))
    })
}

/// Path of the persisted session file.
pub fn session_file() -> String {
    format!("{}.session", SESSION_NAME)
}
