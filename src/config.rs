use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::watermark::WatermarkKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
    #[error("failed to read {name} from {path}: {source}")]
    ReadFile {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // VK source
    pub vk_token: String,
    pub vk_api_url: String,
    pub domain: String,
    pub count: u32,

    // Telegram destination
    pub bot_token: String,
    pub telegram_api_url: String,
    pub channel: String,

    // Presentation
    pub include_link: bool,
    pub preview_link: bool,
    pub reposts: bool,

    // Timing
    pub poll_interval: Duration,
    pub post_cooldown: Duration,
    pub text_backoff: Duration,
    pub text_retry_attempts: u32,
    pub image_retry_attempts: u32,
    pub image_retry_delay: Duration,

    // Watermark
    pub last_post_path: PathBuf,
    pub watermark_key: WatermarkKey,

    /// Post ids (`owner_post`) to redeliver once at startup.
    pub resend_posts: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Tokens may be given inline (`VK_TOKEN`, `BOT_TOKEN`) or as paths to
    /// files holding them (`TOKEN_VK_FILE`, `TOKEN_TELEGRAM_FILE`).
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // VK source
            vk_token: secret_env("VK_TOKEN", "TOKEN_VK_FILE")?,
            vk_api_url: trim_base(env_or_default("VK_API_URL", "https://api.vk.ru")),
            domain: required_env("DOMAIN")?,
            count: parse_env_u32("COUNT", 10)?,

            // Telegram destination
            bot_token: secret_env("BOT_TOKEN", "TOKEN_TELEGRAM_FILE")?,
            telegram_api_url: trim_base(env_or_default(
                "TELEGRAM_API_URL",
                "https://api.telegram.org",
            )),
            channel: required_env("CHANNEL")?,

            // Presentation
            include_link: parse_env_bool("INCLUDE_LINK", true)?,
            preview_link: parse_env_bool("PREVIEW_LINK", false)?,
            reposts: parse_env_bool("REPOSTS", true)?,

            // Timing
            poll_interval: Duration::from_secs(parse_env_u64("WAIT_TIME", 3600)?),
            post_cooldown: Duration::from_secs(parse_env_u64("POST_COOLDOWN_SECS", 60)?),
            text_backoff: Duration::from_secs(parse_env_u64("TEXT_BACKOFF_SECS", 60)?),
            text_retry_attempts: parse_env_u32("TEXT_RETRY_ATTEMPTS", 3)?,
            image_retry_attempts: parse_env_u32("IMAGE_RETRY_ATTEMPTS", 3)?,
            image_retry_delay: Duration::from_secs(parse_env_u64("IMAGE_RETRY_DELAY_SECS", 60)?),

            // Watermark
            last_post_path: PathBuf::from(env_or_default("LAST_POST_PATH", "last_post/date")),
            watermark_key: parse_watermark_key(&env_or_default("WATERMARK_KEY", "date"))?,

            resend_posts: optional_env("RESEND_POSTS")
                .map(|v| parse_post_list(&v))
                .unwrap_or_default(),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vk_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "VK_TOKEN".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.bot_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "BOT_TOKEN".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.channel.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CHANNEL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.domain.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "DOMAIN".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        // wall.get caps count at 100
        if self.count == 0 || self.count > 100 {
            return Err(ConfigError::InvalidValue {
                name: "COUNT".to_string(),
                message: format!("must be between 1 and 100, got {}", self.count),
            });
        }
        if self.text_retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "TEXT_RETRY_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.image_retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "IMAGE_RETRY_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration with every field populated and all delays zeroed.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            vk_token: "vk-test-token".to_string(),
            vk_api_url: "http://127.0.0.1:9".to_string(),
            domain: "grp".to_string(),
            count: 10,
            bot_token: "123:test".to_string(),
            telegram_api_url: "http://127.0.0.1:9".to_string(),
            channel: "@test_channel".to_string(),
            include_link: true,
            preview_link: false,
            reposts: true,
            poll_interval: Duration::ZERO,
            post_cooldown: Duration::ZERO,
            text_backoff: Duration::ZERO,
            text_retry_attempts: 3,
            image_retry_attempts: 3,
            image_retry_delay: Duration::ZERO,
            last_post_path: PathBuf::from("last_post/date"),
            watermark_key: WatermarkKey::Date,
            resend_posts: Vec::new(),
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    optional_env(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a secret inline from `name`, falling back to the file named by `file_var`.
fn secret_env(name: &str, file_var: &str) -> Result<String, ConfigError> {
    if let Some(value) = optional_env(name) {
        return Ok(value.trim().to_string());
    }
    let Some(path) = optional_env(file_var).map(PathBuf::from) else {
        return Err(ConfigError::MissingEnvVar(format!("{name} or {file_var}")));
    };
    std::fs::read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|source| ConfigError::ReadFile {
            name: file_var.to_string(),
            path,
            source,
        })
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.trim().parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.trim().parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => parse_bool(&val).ok_or_else(|| ConfigError::ParseBool {
            name: name.to_string(),
            value: val,
        }),
        _ => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_watermark_key(value: &str) -> Result<WatermarkKey, ConfigError> {
    match value.to_lowercase().as_str() {
        "date" => Ok(WatermarkKey::Date),
        "id" => Ok(WatermarkKey::Id),
        _ => Err(ConfigError::InvalidValue {
            name: "WATERMARK_KEY".to_string(),
            message: format!("must be 'date' or 'id', got '{value}'"),
        }),
    }
}

fn parse_post_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
