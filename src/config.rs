//! Configuration for the mailer
//!
//! Loads configuration from config.yml file

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::obfuscate::ObfuscationMode;

/// Default constants (fallback if config.yml not found)
pub const COUNTRY_CODE: &str = "+7";
pub const WEB_CLIENT_URL: &str = "https://web.whatsapp.com";
pub const LOCK_FILE: &str = "mailer.lock";
pub const LOG_FILE: &str = "whatsapp_mailer.log";

/// Lines of the numbers file shorter than this (raw, newline included)
/// are dropped before cleaning.
pub const MIN_RAW_LINE_LEN: usize = 10;

/// Average wall-clock cost of one send, used for the duration estimate.
pub const SECONDS_PER_MESSAGE: u64 = 46;

/// Blocking waits used by the send operation and the dispatch loop,
/// in seconds. Ranges are inclusive and drawn uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct Delays {
    /// Wait for the chat page to load before submitting
    pub page_load_min: u64,
    pub page_load_max: u64,
    /// Fixed settle wait after opening a chat for a media send
    pub media_settle: u64,
    /// Total wait before the media picker is usable (settle included)
    pub media_wait: u64,
    /// Wait before closing the chat tab
    pub tab_close: u64,
    /// Wait after a submit, before the next automation step
    pub post_send_min: u64,
    pub post_send_max: u64,
    /// Pause between consecutive text sends in the dispatch loop
    pub between_min: u64,
    pub between_max: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            page_load_min: 10,
            page_load_max: 25,
            media_settle: 7,
            media_wait: 15,
            tab_close: 3,
            post_send_min: 5,
            post_send_max: 15,
            between_min: 10,
            between_max: 50,
        }
    }
}

impl Delays {
    /// All waits zeroed. Used by tests and dry runs.
    pub fn none() -> Self {
        Self {
            page_load_min: 0,
            page_load_max: 0,
            media_settle: 0,
            media_wait: 0,
            tab_close: 0,
            post_send_min: 0,
            post_send_max: 0,
            between_min: 0,
            between_max: 0,
        }
    }
}

/// YAML config structures
#[derive(Debug, Deserialize)]
struct YamlConfig {
    mailer: Option<MailerConfig>,
    obfuscation: Option<ObfuscationConfig>,
    delays: Option<DelaysConfig>,
}

#[derive(Debug, Deserialize)]
struct MailerConfig {
    country_code: Option<String>,
    web_url: Option<String>,
    log_file: Option<String>,
    lock_file: Option<String>,
    validation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObfuscationConfig {
    mode: Option<String>,
    probability: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct DelaysConfig {
    page_load_min: Option<u64>,
    page_load_max: Option<u64>,
    media_settle: Option<u64>,
    media_wait: Option<u64>,
    tab_close: Option<u64>,
    post_send_min: Option<u64>,
    post_send_max: Option<u64>,
    between_min: Option<u64>,
    between_max: Option<u64>,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub country_code: String,
    pub web_url: String,
    pub log_file: String,
    pub lock_file: String,
    /// Post-clean digit-count validation instead of the legacy raw-length gate
    pub strict_validation: bool,
    pub obfuscation_mode: ObfuscationMode,
    pub obfuscation_probability: f64,
    pub delays: Delays,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml or use defaults.
    /// Environment variables take precedence over config.yml values.
    pub fn new() -> Self {
        Self::load_from_file("config.yml")
            .or_else(|_| Self::load_from_file("../config.yml"))
            .unwrap_or_else(|_| Self::defaults())
    }

    pub fn defaults() -> Self {
        Self {
            country_code: COUNTRY_CODE.to_string(),
            web_url: WEB_CLIENT_URL.to_string(),
            log_file: LOG_FILE.to_string(),
            lock_file: LOCK_FILE.to_string(),
            strict_validation: false,
            obfuscation_mode: ObfuscationMode::Reset,
            obfuscation_probability: 0.5,
            delays: Delays::default(),
        }
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str, default: &str) -> String {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                if let Ok(env_val) = std::env::var(var_name) {
                    return env_val;
                }
            } else {
                return v.clone();
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return env_val;
        }
        default.to_string()
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        Self::load_dotenv();

        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let yaml: YamlConfig = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        let mailer = yaml.mailer.unwrap_or(MailerConfig {
            country_code: None,
            web_url: None,
            log_file: None,
            lock_file: None,
            validation: None,
        });

        let obfuscation = yaml.obfuscation.unwrap_or(ObfuscationConfig {
            mode: None,
            probability: None,
        });

        let d = yaml.delays.unwrap_or_default();
        let base = Delays::default();

        Ok(Self {
            country_code: Self::resolve_env_string(
                mailer.country_code,
                "MAILER_COUNTRY_CODE",
                COUNTRY_CODE,
            ),
            web_url: Self::resolve_env_string(mailer.web_url, "MAILER_WEB_URL", WEB_CLIENT_URL),
            log_file: Self::resolve_env_string(mailer.log_file, "MAILER_LOG_FILE", LOG_FILE),
            lock_file: Self::resolve_env_string(mailer.lock_file, "MAILER_LOCK_FILE", LOCK_FILE),
            strict_validation: matches!(mailer.validation.as_deref(), Some("strict")),
            obfuscation_mode: obfuscation
                .mode
                .as_deref()
                .map(|m| m.parse().unwrap_or_default())
                .unwrap_or_default(),
            obfuscation_probability: obfuscation.probability.unwrap_or(0.5),
            delays: Delays {
                page_load_min: d.page_load_min.unwrap_or(base.page_load_min),
                page_load_max: d.page_load_max.unwrap_or(base.page_load_max),
                media_settle: d.media_settle.unwrap_or(base.media_settle),
                media_wait: d.media_wait.unwrap_or(base.media_wait),
                tab_close: d.tab_close.unwrap_or(base.tab_close),
                post_send_min: d.post_send_min.unwrap_or(base.post_send_min),
                post_send_max: d.post_send_max.unwrap_or(base.post_send_max),
                between_min: d.between_min.unwrap_or(base.between_min),
                between_max: d.between_max.unwrap_or(base.between_max),
            },
        })
    }
}
