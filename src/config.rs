use std::{net::SocketAddr, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(String),
    #[error("Invalid {0}")]
    Invalid(String),
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub database: DatabaseConfig,
    pub twitter: TwitterConfig,
    pub webhook: Option<WebhookConfig>,
    pub upload: UploadConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub limits: LimitsConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig(pub String);

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// `libsql://` / `https://` for a remote Turso database, anything else is a local path.
    pub url: String,
    pub token: Option<String>,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Ok(Self {
            url: optional("DATABASE_URL").ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))?,
            token: optional("DATABASE_TOKEN"),
        })
    }

    pub fn is_remote(&self) -> bool {
        self.url.starts_with("libsql://") || self.url.starts_with("https://") || self.url.starts_with("http://")
    }
}

#[derive(Clone, Debug, Default)]
pub struct TwitterConfig {
    pub bearer_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Clone, Debug, Default)]
pub struct UploadConfig {
    pub log_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub media_ttl_secs: u64,
    pub media_capacity: usize,
    /// Memory usage estimate: ~200 bytes per chat row × 10,000 = ~2 MB
    pub settings_capacity: usize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 7,
            proxy: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub provider_attempts: u32,
    pub provider_delay_secs: u64,
    pub telegram_attempts: u32,
    pub telegram_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            provider_attempts: 3,
            provider_delay_secs: 2,
            telegram_attempts: 3,
            telegram_delay_secs: 3,
        }
    }
}

impl RetryConfig {
    pub fn provider_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.provider_attempts.max(1),
            delay: Duration::from_secs(self.provider_delay_secs),
        }
    }

    pub fn telegram_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.telegram_attempts.max(1),
            delay: Duration::from_secs(self.telegram_delay_secs),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

/// Telegram refuses URL uploads above these sizes.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub photo_bytes: u64,
    pub file_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            photo_bytes: 5 * 1024 * 1024,
            file_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: LogFileConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: LogFileConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LogFileConfig {
    pub enable: bool,
    pub path: String,
    pub pref: String,
    pub date: String,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enable: false,
            path: "logs".to_string(),
            pref: "relaystash_".to_string(),
            date: "%Y-%m-%d_%H-%M-%S".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
struct CacheSettings {
    media_ttl_secs: u64,
    media_capacity: usize,
    settings_capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            media_ttl_secs: 6 * 60 * 60,
            media_capacity: 1_000,
            settings_capacity: 10_000,
        }
    }
}

/// Contents of the optional TOML file pointed to by `PATH_SETTINGS`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    log: LogConfig,
    http: HttpConfig,
    retry: RetryConfig,
    cache: CacheSettings,
    limits: LimitsConfig,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();

        let settings = match lookup("PATH_SETTINGS").filter(|p| !p.trim().is_empty()) {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        Self::build(lookup, settings)
    }

    pub fn build<F>(lookup: F, settings: Settings) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()));

        let webhook = match optional("WEBHOOK_URL") {
            Some(url) => Some(WebhookConfig {
                url: Url::parse(&url).map_err(|_| ConfigError::Invalid("WEBHOOK_URL".to_string()))?,
                addr: optional("WEBHOOK_ADDR")
                    .unwrap_or_else(|| "0.0.0.0:8443".to_string())
                    .parse::<SocketAddr>()
                    .map_err(|_| ConfigError::Invalid("WEBHOOK_ADDR".to_string()))?,
            }),
            None => None,
        };

        let mut http = settings.http;
        if let Some(proxy) = optional("HTTP_PROXY_URL") {
            http.proxy = Some(proxy);
        }

        Ok(Self {
            telegram: TelegramConfig(require("TOKEN")?),
            database: DatabaseConfig::from_lookup(&lookup)?,
            twitter: TwitterConfig {
                bearer_token: optional("TW_TOKEN"),
            },
            webhook,
            upload: UploadConfig {
                log_url: optional("GD_LOG"),
            },
            cache: CacheConfig {
                redis_url: optional("REDIS_URL"),
                media_ttl_secs: settings.cache.media_ttl_secs,
                media_capacity: settings.cache.media_capacity,
                settings_capacity: settings.cache.settings_capacity,
            },
            http,
            retry: settings.retry,
            limits: settings.limits,
            log: settings.log,
        })
    }

    #[cfg(test)]
    pub fn new_test_config() -> Self {
        let lookup = |name: &str| match name {
            "TOKEN" => Some("1234567890:TEST_TOKEN".to_string()),
            "DATABASE_URL" => Some(":memory:".to_string()),
            _ => None,
        };
        let mut config = Self::build(lookup, Settings::default()).expect("test config");
        config.retry.telegram_delay_secs = 0;
        config.retry.provider_delay_secs = 0;
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_build_requires_token_and_database() {
        let err = AppConfig::build(env(&[("DATABASE_URL", "bot.db")]), Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref name) if name == "TOKEN"));

        let err = AppConfig::build(env(&[("TOKEN", "abc")]), Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref name) if name == "DATABASE_URL"));

        // Blank values count as missing
        let err = AppConfig::build(env(&[("TOKEN", "  "), ("DATABASE_URL", "bot.db")]), Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_build_optional_values() {
        let config = AppConfig::build(
            env(&[
                ("TOKEN", "abc"),
                ("DATABASE_URL", "libsql://db.turso.io"),
                ("DATABASE_TOKEN", "secret"),
                ("TW_TOKEN", "bearer"),
                ("REDIS_URL", "redis://127.0.0.1:6379"),
                ("WEBHOOK_URL", "https://example.com/hook"),
                ("HTTP_PROXY_URL", "socks5://127.0.0.1:1080"),
            ]),
            Settings::default(),
        )
        .unwrap();

        assert_eq!(config.telegram.0, "abc");
        assert!(config.database.is_remote());
        assert_eq!(config.database.token.as_deref(), Some("secret"));
        assert_eq!(config.twitter.bearer_token.as_deref(), Some("bearer"));
        assert_eq!(config.cache.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(config.http.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));

        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.url.as_str(), "https://example.com/hook");
        assert_eq!(webhook.addr.port(), 8443);
        assert!(config.upload.log_url.is_none());
    }

    #[test]
    fn test_build_rejects_bad_webhook() {
        let err = AppConfig::build(
            env(&[("TOKEN", "abc"), ("DATABASE_URL", "bot.db"), ("WEBHOOK_URL", "not a url")]),
            Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref name) if name == "WEBHOOK_URL"));
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let settings = Settings::parse(
            r#"
            [log]
            level = "debug"

            [log.file]
            enable = true
            pref = "yoiyoi_"

            [retry]
            provider_attempts = 5

            [limits]
            file_bytes = 1024
            "#,
        )
        .unwrap();

        let config = AppConfig::build(env(&[("TOKEN", "abc"), ("DATABASE_URL", "bot.db")]), settings).unwrap();

        assert_eq!(config.log.level, "debug");
        assert!(config.log.file.enable);
        assert_eq!(config.log.file.pref, "yoiyoi_");
        assert_eq!(config.log.file.path, "logs");
        assert_eq!(config.retry.provider_attempts, 5);
        assert_eq!(config.retry.telegram_attempts, 3);
        assert_eq!(config.limits.file_bytes, 1024);
        assert_eq!(config.limits.photo_bytes, 5 * 1024 * 1024);
        assert!(!config.database.is_remote());
    }

    #[test]
    fn test_settings_parse_error() {
        assert!(matches!(Settings::parse("[log"), Err(ConfigError::Parse(_))));
    }
}
