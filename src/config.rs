//! Application configuration loaded from `config.yaml`.
//!
//! Every section is optional; anything left out falls back to the defaults
//! below, which reproduce the calibration for the Media Bias/Fact Check chart.
//!
//! ```yaml
//! palette:
//!   blue_hue: 179
//!   red_hue: 122
//!   yellow_hue: 92
//!   hue_tolerance: 10
//!   saturation_min: 120
//!   value_min: 120
//!   channel_order: bgr
//! scraper:
//!   category_pages:
//!     - https://mediabiasfactcheck.com/left/
//!   max_retries: 3
//!   base_delay_ms: 1000
//!   max_jitter_ms: 250
//!   timeout_secs: 30
//! ```

use crate::bias::palette::MarkerPalette;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// Category pages listing every rated outlet.
pub const DEFAULT_CATEGORY_PAGES: [&str; 6] = [
    "https://mediabiasfactcheck.com/fake-news/",
    "https://mediabiasfactcheck.com/left/",
    "https://mediabiasfactcheck.com/leftcenter/",
    "https://mediabiasfactcheck.com/center/",
    "https://mediabiasfactcheck.com/right-center/",
    "https://mediabiasfactcheck.com/right/",
];

/// Configuration loading and validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    #[error("{name} hue {value} is outside 0..=179")]
    InvalidHue { name: &'static str, value: u8 },
    #[error("hue tolerance {0} must be below 90")]
    InvalidTolerance(u8),
    #[error("no category pages configured")]
    NoCategoryPages,
    #[error("invalid category page url {url}: {reason}")]
    InvalidCategoryPage { url: String, reason: String },
}

/// Scraper behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Category pages to discover outlet pages from.
    pub category_pages: Vec<String>,
    /// Retries after the first failed request (transient failures only).
    pub max_retries: usize,
    /// First backoff delay; doubles on every retry.
    pub base_delay_ms: u64,
    /// Upper bound of the random jitter added to each backoff delay.
    pub max_jitter_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            category_pages: DEFAULT_CATEGORY_PAGES.iter().map(|s| s.to_string()).collect(),
            max_retries: 3,
            base_delay_ms: 1000,
            max_jitter_ms: 250,
            timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub palette: MarkerPalette,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl AppConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config = Self::from_yaml(&content)?;
        info!(
            categories = config.scraper.category_pages.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                info!("No config file given; using default configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.palette;
        for (name, value) in [
            ("blue", p.blue_hue),
            ("red", p.red_hue),
            ("yellow", p.yellow_hue),
        ] {
            if value > 179 {
                return Err(ConfigError::InvalidHue { name, value });
            }
        }
        if p.hue_tolerance >= 90 {
            return Err(ConfigError::InvalidTolerance(p.hue_tolerance));
        }
        if self.scraper.category_pages.is_empty() {
            return Err(ConfigError::NoCategoryPages);
        }
        for page in &self.scraper.category_pages {
            url::Url::parse(page).map_err(|e| ConfigError::InvalidCategoryPage {
                url: page.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
