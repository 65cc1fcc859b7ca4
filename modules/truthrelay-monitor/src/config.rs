use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::feed::DEFAULT_FEED_URL;
use crate::monitor::MonitorConfig;

/// Application configuration loaded from environment variables. Constructed
/// once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    // Delivery
    pub discord_webhook_url: String,

    // Translation
    pub anthropic_api_key: String,
    pub anthropic_model: String,

    // Acquisition
    pub feed_url: String,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub chrome_bin: String,

    // Loop
    pub check_interval_secs: u64,
    pub max_cycles: u32,
    pub force_reprocess: bool,
    pub replay_count: usize,

    // Persistence
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            discord_webhook_url: std::env::var("DISCORD_WEBHOOK_URL")
                .context("DISCORD_WEBHOOK_URL environment variable is required")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .context("ANTHROPIC_API_KEY environment variable is required")?,
            anthropic_model: env_or("ANTHROPIC_MODEL", "claude-3-7-sonnet-20250219"),
            feed_url: env_or("FEED_URL", DEFAULT_FEED_URL),
            browserless_url: std::env::var("BROWSERLESS_URL").ok(),
            browserless_token: std::env::var("BROWSERLESS_TOKEN").ok(),
            chrome_bin: env_or("CHROME_BIN", "chromium"),
            check_interval_secs: parsed_env("CHECK_INTERVAL", 60),
            max_cycles: parsed_env("MAX_CYCLES", 30),
            force_reprocess: env_or("FORCE_REPROCESS", "false").eq_ignore_ascii_case("true"),
            replay_count: parsed_env("REPLAY_COUNT", 5),
            data_dir: PathBuf::from(env_or("DATA_DIR", "/data")),
        };

        config.log_redacted();
        Ok(config)
    }

    /// Create the data directory if needed and prove it is writable before
    /// the loop starts, so persistence failures surface at boot.
    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Could not create data directory {}", self.data_dir.display())
        })?;

        let probe = self.data_dir.join(".write_test");
        std::fs::write(&probe, b"").with_context(|| {
            format!("Data directory {} is not writable", self.data_dir.display())
        })?;
        std::fs::remove_file(&probe).ok();
        Ok(())
    }

    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.check_interval_secs),
            force_reprocess: self.force_reprocess,
            replay_count: self.replay_count,
            max_cycles: self.max_cycles,
            ..MonitorConfig::default()
        }
    }

    fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  DISCORD_WEBHOOK_URL: {}", preview(&self.discord_webhook_url));
        tracing::info!("  ANTHROPIC_API_KEY: {}", preview(&self.anthropic_api_key));
        tracing::info!("  ANTHROPIC_MODEL: {}", self.anthropic_model);
        tracing::info!("  BROWSERLESS_URL: {}", preview_opt(&self.browserless_url));
        tracing::info!("  DATA_DIR: {}", self.data_dir.display());
        tracing::info!("  CHECK_INTERVAL: {}s", self.check_interval_secs);
        tracing::info!("  FORCE_REPROCESS: {}", self.force_reprocess);
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_env<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
