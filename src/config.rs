//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "price-watch";
const ENV_PREFIX: &str = "PRICE_WATCH_";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Product name as printed on the listing page
    #[serde(default = "default_product")]
    pub product: String,

    /// Listing page showing the lowest price across vendors
    #[serde(default)]
    pub listing_url: String,

    /// Pricing page mapping vendors to purchase links
    #[serde(default)]
    pub pricing_url: String,

    /// Currency symbol stripped from scraped prices
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Which price changes trigger an alert
    #[serde(default)]
    pub policy: NotifyPolicy,

    /// Location of the persisted price (defaults to the user data dir)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Partition key of the persisted record
    #[serde(default = "default_partition_key")]
    pub partition_key: String,

    /// Row key of the persisted record
    #[serde(default = "default_row_key")]
    pub row_key: String,

    /// Seconds between checks in watch mode
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Outgoing mail settings
    #[serde(default)]
    pub mail: MailConfig,
}

/// SMTP settings for price alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_mail_host")]
    pub host: String,

    #[serde(default = "default_mail_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sender address
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub recipients: Vec<String>,

    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_product() -> String {
    "Inis".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_partition_key() -> String {
    "Price".to_string()
}

fn default_row_key() -> String {
    "1".to_string()
}

fn default_interval_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_mail_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_mail_port() -> u16 {
    587
}

fn default_subject() -> String {
    "Inis Price Drop Alert".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product: default_product(),
            listing_url: String::new(),
            pricing_url: String::new(),
            currency_symbol: default_currency_symbol(),
            policy: NotifyPolicy::Both,
            store_path: None,
            partition_key: default_partition_key(),
            row_key: default_row_key(),
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
            format: OutputFormat::Text,
            mail: MailConfig::default(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: default_mail_host(),
            port: default_mail_port(),
            username: None,
            password: None,
            from: None,
            recipients: Vec::new(),
            subject: default_subject(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("price-watch.toml");
        if local_config.exists() {
            debug!("Found price-watch.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(APP_DIR).join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies `PRICE_WATCH_*` environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Some(v) = env_var("LISTING_URL") {
            self.listing_url = v;
        }
        if let Some(v) = env_var("PRICING_URL") {
            self.pricing_url = v;
        }
        if let Some(v) = env_var("PRODUCT") {
            self.product = v;
        }
        if let Some(v) = env_var("STORE_PATH") {
            self.store_path = Some(PathBuf::from(v));
        }
        if let Some(v) = env_var("PROXY") {
            self.proxy = Some(v);
        }
        if let Some(policy) = env_var("POLICY").and_then(|v| v.parse().ok()) {
            self.policy = policy;
        }
        if let Some(v) = env_var("MAIL_USERNAME") {
            self.mail.username = Some(v);
        }
        if let Some(v) = env_var("MAIL_PASSWORD") {
            self.mail.password = Some(v);
        }
        if let Some(v) = env_var("MAIL_FROM") {
            self.mail.from = Some(v);
        }
        if let Some(v) = env_var("MAIL_RECIPIENTS") {
            self.mail.recipients = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        self
    }

    /// Resolved location of the persisted price file.
    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("last_price.json")
        })
    }

    /// Checks that everything a run needs is present.
    pub fn validate(&self, require_mail: bool) -> Result<()> {
        if self.listing_url.trim().is_empty() {
            anyhow::bail!("listing_url is not configured");
        }
        if self.pricing_url.trim().is_empty() {
            anyhow::bail!("pricing_url is not configured");
        }
        if self.product.trim().is_empty() {
            anyhow::bail!("product is not configured");
        }
        if self.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than zero");
        }

        if require_mail {
            if self.mail.username.is_none() || self.mail.password.is_none() {
                anyhow::bail!("mail credentials are not configured");
            }
            if self.mail.from.is_none() {
                anyhow::bail!("mail.from is not configured");
            }
            if self.mail.recipients.is_empty() {
                anyhow::bail!("mail.recipients is empty");
            }
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

/// Which price movements trigger a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyPolicy {
    /// Alert on drops and rises.
    #[default]
    Both,
    /// Alert on drops only; rises are left unrecorded.
    DecreaseOnly,
}

impl std::str::FromStr for NotifyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" => Ok(NotifyPolicy::Both),
            "decrease-only" | "decrease" | "drops" => Ok(NotifyPolicy::DecreaseOnly),
            _ => Err(format!("Unknown policy: {}. Use: both, decrease-only", s)),
        }
    }
}

impl std::fmt::Display for NotifyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyPolicy::Both => write!(f, "both"),
            NotifyPolicy::DecreaseOnly => write!(f, "decrease-only"),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_config() -> Config {
        let mut config = Config::new();
        config.listing_url = "https://example.com/inis".to_string();
        config.pricing_url = "https://example.com/inis/prices".to_string();
        config.mail.username = Some("bot".to_string());
        config.mail.password = Some("secret".to_string());
        config.mail.from = Some("bot@example.com".to_string());
        config.mail.recipients = vec!["me@example.com".to_string()];
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.product, "Inis");
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.policy, NotifyPolicy::Both);
        assert_eq!(config.partition_key, "Price");
        assert_eq!(config.row_key, "1");
        assert_eq!(config.interval_secs, 300);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.listing_url.is_empty());
        assert!(config.proxy.is_none());
        assert_eq!(config.mail.host, "smtp.gmail.com");
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.mail.subject, "Inis Price Drop Alert");
        assert!(config.mail.recipients.is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("both".parse::<NotifyPolicy>().unwrap(), NotifyPolicy::Both);
        assert_eq!("BOTH".parse::<NotifyPolicy>().unwrap(), NotifyPolicy::Both);
        assert_eq!("decrease-only".parse::<NotifyPolicy>().unwrap(), NotifyPolicy::DecreaseOnly);
        assert_eq!("drops".parse::<NotifyPolicy>().unwrap(), NotifyPolicy::DecreaseOnly);

        let err = "sideways".parse::<NotifyPolicy>().unwrap_err();
        assert!(err.contains("Unknown policy"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("csv".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            product = "Root"
            listing_url = "https://example.com/root"
            pricing_url = "https://example.com/root/prices"
            currency_symbol = "€"
            policy = "decrease-only"
            store_path = "/tmp/root.json"
            partition_key = "Root"
            row_key = "7"
            interval_secs = 600
            timeout_secs = 10
            proxy = "socks5://localhost:1080"
            format = "json"

            [mail]
            host = "smtp.example.com"
            port = 2525
            username = "bot"
            password = "secret"
            from = "bot@example.com"
            recipients = ["a@example.com", "b@example.com"]
            subject = "Root Price Alert"
            timeout_secs = 5
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.product, "Root");
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.policy, NotifyPolicy::DecreaseOnly);
        assert_eq!(config.store_path(), PathBuf::from("/tmp/root.json"));
        assert_eq!(config.partition_key, "Root");
        assert_eq!(config.row_key, "7");
        assert_eq!(config.interval_secs, 600);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.mail.host, "smtp.example.com");
        assert_eq!(config.mail.port, 2525);
        assert_eq!(config.mail.recipients.len(), 2);
        assert_eq!(config.mail.subject, "Root Price Alert");
        assert_eq!(config.mail.timeout_secs, 5);
    }

    #[test]
    fn test_config_partial_mail_table() {
        let toml = r#"
            listing_url = "https://example.com/inis"
            [mail]
            username = "bot"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.mail.username.as_deref(), Some("bot"));
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.product, "Inis");
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            listing_url = "https://example.com/inis"
            interval_secs = 60
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.listing_url, "https://example.com/inis");
        assert_eq!(config.interval_secs, 60);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let err = Config::from_file("/nonexistent/path/config.toml").unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"product = "Kemet""#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.product, "Kemet");
    }

    #[test]
    fn test_config_with_env() {
        let keys = ["PRICE_WATCH_LISTING_URL", "PRICE_WATCH_POLICY", "PRICE_WATCH_MAIL_RECIPIENTS"];
        let saved: Vec<Option<String>> = keys.iter().map(|k| std::env::var(k).ok()).collect();

        std::env::set_var("PRICE_WATCH_LISTING_URL", "https://env.example.com/inis");
        std::env::set_var("PRICE_WATCH_POLICY", "decrease-only");
        std::env::set_var("PRICE_WATCH_MAIL_RECIPIENTS", "a@example.com, b@example.com,");

        let config = Config::new().with_env();
        assert_eq!(config.listing_url, "https://env.example.com/inis");
        assert_eq!(config.policy, NotifyPolicy::DecreaseOnly);
        assert_eq!(config.mail.recipients, vec!["a@example.com", "b@example.com"]);

        std::env::set_var("PRICE_WATCH_POLICY", "not_a_policy");
        let config = Config::new().with_env();
        assert_eq!(config.policy, NotifyPolicy::Both);

        for (key, value) in keys.iter().zip(saved) {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_store_path_default() {
        let config = Config::new();
        assert!(config.store_path().ends_with("price-watch/last_price.json"));
    }

    #[test]
    fn test_validate() {
        assert!(valid_config().validate(true).is_ok());

        let mut config = valid_config();
        config.listing_url.clear();
        assert!(config.validate(false).unwrap_err().to_string().contains("listing_url"));

        let mut config = valid_config();
        config.interval_secs = 0;
        assert!(config.validate(false).is_err());

        let mut config = valid_config();
        config.mail.password = None;
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).unwrap_err().to_string().contains("credentials"));

        let mut config = valid_config();
        config.mail.recipients.clear();
        assert!(config.validate(true).unwrap_err().to_string().contains("recipients"));
    }
}
