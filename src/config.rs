use thiserror::Error;

use crate::qr::DEFAULT_MODULE_SIZE;
use crate::sentiment::{Classifier, Lexicon, Strategy, DEFAULT_THRESHOLD};
use crate::service::DEFAULT_MAX_FEEDBACK_CHARS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub sentiment: SentimentConfig,
    pub feedback: FeedbackConfig,
    /// Enables `?reset=true` and `POST /api/reset`, which wipe all data.
    pub allow_reset: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Fixed base for student links. Discovered from the request when unset.
    pub public_base_url: Option<String>,
    /// Optional stylesheet served at `/assets/style.css`
    pub stylesheet_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Files,
    Redb,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Files => "files",
            StorageBackend::Redb => "redb",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct SentimentConfig {
    pub strategy: Strategy,
    pub threshold: f64,
    /// Replaces the built-in positive words when set
    pub positive_words: Option<Vec<String>>,
    /// Replaces the built-in negative words when set
    pub negative_words: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    pub max_chars: usize,
    /// Instructor page auto-refresh period
    pub refresh_interval_secs: u64,
    /// Pixels per QR module
    pub qr_module_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_base_url: None,
            stylesheet_path: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Files,
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            threshold: DEFAULT_THRESHOLD,
            positive_words: None,
            negative_words: None,
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_FEEDBACK_CHARS,
            refresh_interval_secs: 5,
            qr_module_size: DEFAULT_MODULE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            sentiment: SentimentConfig::default(),
            feedback: FeedbackConfig::default(),
            allow_reset: true,
        }
    }
}

impl SentimentConfig {
    pub fn classifier(&self) -> Classifier {
        let lexicon = Lexicon::with_overrides(
            self.positive_words.as_deref(),
            self.negative_words.as_deref(),
        );
        Classifier::new(self.strategy, lexicon, self.threshold)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let stylesheet_path = std::env::var("STYLESHEET_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "files".to_string())
            .to_lowercase()
            .as_str()
        {
            "files" => StorageBackend::Files,
            "redb" => StorageBackend::Redb,
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "STORAGE_BACKEND must be 'files' or 'redb', got '{other}'"
                )))
            }
        };

        let strategy = match std::env::var("SENTIMENT_STRATEGY") {
            Ok(s) => s.parse().map_err(ConfigError::ValidationError)?,
            Err(_) => Strategy::default(),
        };

        let threshold = parse_env("POLARITY_THRESHOLD", DEFAULT_THRESHOLD)?;
        let positive_words = std::env::var("POSITIVE_WORDS").ok().map(|s| parse_word_list(&s));
        let negative_words = std::env::var("NEGATIVE_WORDS").ok().map(|s| parse_word_list(&s));

        let max_chars = parse_env("MAX_FEEDBACK_CHARS", DEFAULT_MAX_FEEDBACK_CHARS)?;
        let refresh_interval_secs = parse_env("REFRESH_INTERVAL_SECS", 5)?;
        let qr_module_size = parse_env("QR_MODULE_SIZE", DEFAULT_MODULE_SIZE)?;

        let allow_reset = std::env::var("ALLOW_RESET")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let config = Config {
            server: ServerConfig {
                bind_address,
                public_base_url,
                stylesheet_path,
            },
            storage: StorageConfig { backend, data_dir },
            sentiment: SentimentConfig {
                strategy,
                threshold,
                positive_words,
                negative_words,
            },
            feedback: FeedbackConfig {
                max_chars,
                refresh_interval_secs,
                qr_module_size,
            },
            allow_reset,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.server.public_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "PUBLIC_BASE_URL must start with http:// or https://, got '{url}'"
                )));
            }
        }

        if self.feedback.max_chars == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_FEEDBACK_CHARS must be greater than 0".to_string(),
            ));
        }

        if self.feedback.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "REFRESH_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }

        if !(1..=32).contains(&self.feedback.qr_module_size) {
            return Err(ConfigError::ValidationError(
                "QR_MODULE_SIZE must be between 1 and 32".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.sentiment.threshold) {
            return Err(ConfigError::ValidationError(
                "POLARITY_THRESHOLD must be in [0, 1)".to_string(),
            ));
        }

        if self.sentiment.positive_words.as_ref().is_some_and(Vec::is_empty)
            || self.sentiment.negative_words.as_ref().is_some_and(Vec::is_empty)
        {
            tracing::warn!("A sentiment word list is empty; that category can only come from the polarity fallback");
        }

        if self.allow_reset {
            tracing::warn!("Reset is enabled: anyone with the URL can wipe all feedback");
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::ValidationError(format!("{name} has an invalid value '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}

/// Comma-separated words; blanks dropped.
pub fn parse_word_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}
