use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use url::Url;

use crate::store;

pub const DEFAULT_BASE_URL: &str = "https://blog.bytebytego.com";
pub const DEFAULT_DATA_DIR: &str = "_local-testing-data";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `DEBUG_FILE_LOGS`: when false nothing is written to disk (dry run).
    pub save_to_file: bool,
    /// `RATE_LIMIT`: seconds between post fetches.
    pub rate_limit: Duration,
    pub base_url: Url,
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    debug_file_logs: bool,
    rate_limit: f64,
    scraper_base_url: String,
    scraper_data_dir: String,
}

impl Settings {
    /// Load `.env` (if any), then the process environment, over the defaults.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let cfg = defaults()?
            .add_source(Environment::default().try_parsing(true))
            .build()
            .context("Failed to read settings from environment")?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: Config) -> Result<Self> {
        let raw: RawSettings = cfg.try_deserialize().context("Invalid settings")?;
        let rate_limit = Duration::try_from_secs_f64(raw.rate_limit).with_context(|| {
            format!("RATE_LIMIT must be a non-negative number of seconds, got {}", raw.rate_limit)
        })?;
        let base_url = Url::parse(&raw.scraper_base_url)
            .with_context(|| format!("SCRAPER_BASE_URL is not a URL: {}", raw.scraper_base_url))?;

        Ok(Self {
            save_to_file: raw.debug_file_logs,
            rate_limit,
            base_url,
            data_dir: PathBuf::from(raw.scraper_data_dir),
        })
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.data_dir.join(store::POSTS_DIR)
    }

    pub fn urls_file(&self) -> PathBuf {
        self.data_dir.join(store::URLS_FILE)
    }

    pub fn summary_file(&self) -> PathBuf {
        self.data_dir.join(store::SUMMARY_FILE)
    }

    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir.join(store::LEDGER_FILE)
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(Config::builder()
        .set_default("debug_file_logs", true)?
        .set_default("rate_limit", 1.0)?
        .set_default("scraper_base_url", DEFAULT_BASE_URL)?
        .set_default("scraper_data_dir", DEFAULT_DATA_DIR)?)
}
