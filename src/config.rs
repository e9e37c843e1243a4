use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_presence")]
    pub presence: String,
    /// Image attached to the control panel embed, if the file exists.
    #[serde(default = "default_logo_path")]
    pub logo_path: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            presence: default_presence(),
            logo_path: default_logo_path(),
        }
    }
}

fn default_presence() -> String {
    "Haven Control Panel | /setup_control_panel".to_string()
}

fn default_logo_path() -> String {
    "./haven_logo.png".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for temporary download files.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            data_file: default_data_file(),
        }
    }
}

fn default_work_dir() -> String {
    ".".to_string()
}

fn default_data_file() -> String {
    "./control_panel_data.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
    /// yt-dlp format selector; must name a single pre-muxed file.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            format: default_format(),
        }
    }
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_format() -> String {
    "b[ext=mp4]/b".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikTokConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

impl Default for TikTokConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://www.tikwm.com/api/".to_string()
}

fn default_download_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,
    #[serde(default = "default_normal_max_mb")]
    pub normal_max_mb: u64,
    #[serde(default = "default_classic_max_mb")]
    pub classic_max_mb: u64,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration(),
            normal_max_mb: default_normal_max_mb(),
            classic_max_mb: default_classic_max_mb(),
            max_upload_mb: default_max_upload_mb(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_max_duration() -> u64 {
    600
}

fn default_normal_max_mb() -> u64 {
    25
}

fn default_classic_max_mb() -> u64 {
    50
}

fn default_max_upload_mb() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    900
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub tiktok: TikTokConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.tiktok.download_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.limits.request_timeout_secs)
    }

    /// Apply `DISCORD_BOT_TOKEN` when set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("DISCORD_BOT_TOKEN") {
            if !token.trim().is_empty() {
                self.discord.bot_token = token;
            }
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("haven-control")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.yml")
}

/// Load the YAML config at `path`; a missing file yields defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
