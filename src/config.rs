//! Configuration management for booklend

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    /// Maximum number of pending return/renew requests
    pub capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplyConfig {
    /// Directory holding the per-requester reply pipes
    pub directory: PathBuf,
    /// Number of attempts to open a reply pipe before giving up
    pub attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Number of reads attempted while waiting for a reply
    pub reply_polls: u32,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .set_default("queue.capacity", 10)?
            .set_default("reply.directory", ".")?
            .set_default("reply.attempts", 5)?
            .set_default("reply.retry_delay_ms", 100)?
            .set_default("client.reply_polls", 10)?
            .set_default("client.poll_interval_ms", 100)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Optional configuration files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix BOOKLEND__)
            .add_source(
                Environment::with_prefix("BOOKLEND")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ReplyConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Upper bound on the time spent trying to deliver one reply
    pub fn deadline(&self) -> Duration {
        self.retry_delay() * self.attempts.max(1)
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            attempts: 5,
            retry_delay_ms: 100,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reply_polls: 10,
            poll_interval_ms: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
