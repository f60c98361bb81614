use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub text: TextPolicy,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000/tenders".to_string(),
            username: None,
            key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub webhook_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between two webhook calls
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: "http://127.0.0.1:5678/webhook/tenders".to_string(),
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DownloadConfig {
    /// Where fetched documents are kept. Nothing is written when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

impl DownloadConfig {
    /// Download directory with `~` and env vars expanded
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| PathBuf::from(shellexpand::tilde(d).into_owned()))
    }
}

/// Limits applied while walking nested archives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_max_archive_depth")]
    pub max_archive_depth: usize,
    /// Cap on uncompressed archive member bytes read during one extraction
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
}

fn default_max_archive_depth() -> usize {
    8
}

fn default_max_total_bytes() -> u64 {
    256 * 1024 * 1024
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_archive_depth: default_max_archive_depth(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

/// OCR languages and the normalizer's script folding are decided together:
/// with `fold_ascii` on, non-Latin OCR output is dropped during normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextPolicy {
    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: String,
    #[serde(default = "default_fold_ascii")]
    pub fold_ascii: bool,
}

fn default_ocr_languages() -> String {
    "fra+ara+eng".to_string()
}

fn default_fold_ascii() -> bool {
    true
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self {
            ocr_languages: default_ocr_languages(),
            fold_ascii: default_fold_ascii(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// 1 means a single attempt, i.e. no retry
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration from default location (or defaults), then apply environment overrides.
    ///
    /// A config file that exists but cannot be parsed is an error.
    pub fn load() -> Result<Self> {
        let default_paths = [
            PathBuf::from("config/settings.toml"),
            PathBuf::from(shellexpand::tilde("~/.config/tenderbot/settings.toml").into_owned()),
        ];

        Self::load_from(&default_paths, |key| std::env::var(key).ok())
    }

    /// Load the first existing file of `paths` (defaults when none exists), then apply `lookup`
    pub fn load_from<F>(paths: &[PathBuf], lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match paths.iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(lookup);
        Ok(config)
    }

    /// Override fields from environment variables (lookup is injectable for tests)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("TENDER_FEED_URL") {
            self.feed.url = url;
        }
        if let Some(username) = non_empty("TENDER_FEED_USERNAME") {
            self.feed.username = Some(username);
        }
        if let Some(key) = non_empty("TENDER_FEED_KEY") {
            self.feed.key = Some(key);
        }
        if let Some(url) = non_empty("TENDER_WEBHOOK_URL") {
            self.delivery.webhook_url = url;
        }
        if let Some(dir) = non_empty("TENDER_DOWNLOAD_DIR") {
            self.download.dir = Some(dir);
        }
    }
}
