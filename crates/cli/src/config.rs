//! Configuration loading and management

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use social_scheduler_adapters::cookies::CookieJar;
use social_scheduler_adapters::store::{MiseMode, ParseMode};
use social_scheduler_domain::Platform;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub cookies: CookiesConfig,

    #[serde(default)]
    pub platforms: PlatformsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_command")]
    pub command: String,

    /// Arguments placed before every store command
    #[serde(default)]
    pub args: Vec<String>,

    /// auto, always, never
    #[serde(default = "default_mise")]
    pub mise: String,

    /// Treat unparseable query output as an empty result
    #[serde(default = "default_true")]
    pub lenient_parsing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_browser_base_url")]
    pub base_url: String,

    #[serde(default = "default_browser_token_env")]
    pub token_env: String,

    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default = "default_browser_timeout")]
    pub timeout_secs: u64,

    /// Pause after navigation before inspecting the page
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookiesConfig {
    /// Candidate cookie files, first existing wins
    #[serde(default = "CookieJar::default_paths")]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformsConfig {
    #[serde(default)]
    pub twitter: PlatformToggle,

    #[serde(default)]
    pub linkedin: PlatformToggle,

    #[serde(default)]
    pub mastodon: PlatformToggle,

    #[serde(default)]
    pub bluesky: PlatformToggle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformToggle {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_store_command() -> String {
    "dstask".to_string()
}

fn default_mise() -> String {
    "auto".to_string()
}

fn default_browser_base_url() -> String {
    "http://127.0.0.1:18791".to_string()
}

fn default_browser_token_env() -> String {
    "BROWSER_CONTROL_TOKEN".to_string()
}

fn default_browser_timeout() -> u64 {
    60
}

fn default_settle_ms() -> u64 {
    2000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            command: default_store_command(),
            args: vec![],
            mise: default_mise(),
            lenient_parsing: default_true(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: default_browser_base_url(),
            token_env: default_browser_token_env(),
            profile: None,
            timeout_secs: default_browser_timeout(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for CookiesConfig {
    fn default() -> Self {
        Self {
            paths: CookieJar::default_paths(),
        }
    }
}

impl Default for PlatformToggle {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl StoreConfig {
    pub fn mise_mode(&self) -> Result<MiseMode> {
        self.mise
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("Invalid [store] mise setting")
    }

    pub fn parse_mode(&self) -> ParseMode {
        ParseMode::from_lenient(self.lenient_parsing)
    }
}

impl BrowserConfig {
    /// Token from the configured environment variable, if set and non-empty
    pub fn token(&self) -> Option<SecretString> {
        if self.token_env.is_empty() {
            return None;
        }
        std::env::var(&self.token_env)
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::new(v.into()))
    }
}

impl PlatformsConfig {
    pub fn is_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Twitter => self.twitter.enabled,
            Platform::Linkedin => self.linkedin.enabled,
            Platform::Mastodon => self.mastodon.enabled,
            Platform::Bluesky => self.bluesky.enabled,
        }
    }

    pub fn enabled(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.is_enabled(*p))
            .collect()
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./social.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("SOCIAL_SCHEDULER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# social-scheduler configuration

[general]
log_level = "info"

[store]
command = "dstask"
# Arguments placed before every store command
args = []
# Run the store through `mise exec`: auto, always, never
mise = "auto"
# Treat unparseable store output as "no posts" instead of an error
lenient_parsing = true

[browser]
base_url = "http://127.0.0.1:18791"
token_env = "BROWSER_CONTROL_TOKEN"
# profile = "social"
timeout_secs = 60
settle_ms = 2000

[cookies]
# First existing file wins
# paths = ["~/openclaw/cookies/cookies-for-browser.json"]

[platforms.twitter]
enabled = true

[platforms.linkedin]
enabled = true

[platforms.mastodon]
enabled = false

[platforms.bluesky]
enabled = true
"#
        .to_string()
    }
}
