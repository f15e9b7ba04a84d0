//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scheduler tick settings
    #[serde(default)]
    pub ticker: TickerConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Snapshot persistence settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Webhook delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-page checker settings
    #[serde(default)]
    pub checkers: CheckersConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply overrides using the given variable lookup.
    ///
    /// - `DISCORD_WEBHOOKS`: `;`-separated webhook URLs
    /// - `DISCORD_ROLE`: role id to mention in every message
    /// - `DEBUG`: `TRUE` switches the log level to debug
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(hooks) = lookup("DISCORD_WEBHOOKS") {
            self.notifier.webhooks = hooks
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(role) = lookup("DISCORD_ROLE") {
            let role = role.trim();
            self.notifier.role_id = (!role.is_empty()).then(|| role.to_string());
        }
        if lookup("DEBUG").is_some_and(|v| v == "TRUE") {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.ticker.tick_secs == 0 {
            return Err(AppError::validation("ticker.tick_secs must be > 0"));
        }
        for hook in &self.notifier.webhooks {
            url::Url::parse(hook)?;
        }

        let checkers = self.checkers.enabled();
        if checkers.is_empty() {
            return Err(AppError::validation("No checkers enabled"));
        }
        for (name, interval, url) in checkers {
            if interval == 0 {
                return Err(AppError::validation(format!(
                    "checkers.{name}.interval_ticks must be > 0"
                )));
            }
            url::Url::parse(&url).map_err(|e| {
                AppError::validation(format!("checkers.{name}.url is invalid: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Scheduler tick settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Real-time length of one tick in seconds
    #[serde(default = "defaults::tick_secs")]
    pub tick_secs: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_secs: defaults::tick_secs(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds. Bounds how long one fetch can stall a tick.
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON save-data file
    #[serde(default = "defaults::storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: defaults::storage_path(),
        }
    }
}

/// Webhook delivery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Discord webhook URLs
    #[serde(default)]
    pub webhooks: Vec<String>,

    /// Role mentioned at the top of every message
    #[serde(default)]
    pub role_id: Option<String>,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Settings for every checker kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckersConfig {
    #[serde(default)]
    pub version: VersionCheckerConfig,

    #[serde(default)]
    pub staff: StaffCheckerConfig,

    #[serde(default)]
    pub shop: ShopCheckerConfig,

    #[serde(default)]
    pub advertisement: AdvertisementCheckerConfig,
}

impl CheckersConfig {
    /// Name, interval and resolved URL of each enabled checker.
    fn enabled(&self) -> Vec<(&'static str, u32, String)> {
        let mut out = Vec::new();
        if self.version.enabled {
            out.push(("version", self.version.interval_ticks, self.version.url.clone()));
        }
        if self.staff.enabled {
            out.push(("staff", self.staff.interval_ticks, self.staff.resolved_url()));
        }
        if self.shop.enabled {
            out.push(("shop", self.shop.interval_ticks, self.shop.url.clone()));
        }
        if self.advertisement.enabled {
            out.push((
                "advertisement",
                self.advertisement.interval_ticks,
                self.advertisement.url.clone(),
            ));
        }
        out
    }
}

/// Launcher version checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionCheckerConfig {
    pub enabled: bool,
    pub key: String,
    pub url: String,
    pub interval_ticks: u32,
    pub announce_delay_ticks: u32,
    /// Object keys leading to the version string
    pub json_path: Vec<String>,
}

impl Default for VersionCheckerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key: "labymod_version".into(),
            url: "https://dl.labymod.net/versions.json".into(),
            interval_ticks: 5,
            announce_delay_ticks: 30,
            json_path: vec!["1.8.9".into(), "version".into()],
        }
    }
}

/// Staff roster checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffCheckerConfig {
    pub enabled: bool,
    pub key: String,
    /// Page URL; `{team}` is replaced by `team_id`
    pub url: String,
    pub team_id: String,
    pub interval_ticks: u32,
    pub announce_delay_ticks: u32,
    pub markers: StaffMarkers,
}

impl StaffCheckerConfig {
    /// Page URL scoped to the configured team.
    pub fn resolved_url(&self) -> String {
        self.url.replace("{team}", &self.team_id)
    }
}

impl Default for StaffCheckerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: "staff_members".into(),
            url: "https://www.labymod.net/en/team/{team}".into(),
            team_id: "labymod".into(),
            interval_ticks: 10,
            announce_delay_ticks: 0,
            markers: StaffMarkers::default(),
        }
    }
}

/// Markup anchors of the staff page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffMarkers {
    pub container_class: String,
    pub body_class: String,
    pub link_tag: String,
    pub id_attr: String,
    pub id_prefix: String,
    pub rank_attr: String,
}

impl Default for StaffMarkers {
    fn default() -> Self {
        Self {
            container_class: "team-container".into(),
            body_class: "team-body".into(),
            link_tag: "a".into(),
            id_attr: "data-user".into(),
            id_prefix: "user-".into(),
            rank_attr: "data-rank".into(),
        }
    }
}

/// Shop catalog checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopCheckerConfig {
    pub enabled: bool,
    pub key: String,
    pub url: String,
    pub interval_ticks: u32,
    pub announce_delay_ticks: u32,
    pub markers: ShopMarkers,
}

impl Default for ShopCheckerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: "shop".into(),
            url: "https://www.labymod.net/en/shop".into(),
            interval_ticks: 15,
            announce_delay_ticks: 0,
            markers: ShopMarkers::default(),
        }
    }
}

/// Markup anchors of the shop page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopMarkers {
    pub banner_class: String,
    /// Banners are only collected before this tag opens
    pub header_tag: String,
    pub tab_list_class: String,
    /// Token removed from category tab labels
    pub decorator: String,
    pub item_tag: String,
    pub item_id_attr: String,
    pub item_name_attr: String,
    pub item_category_attr: String,
    pub min_item_attrs: usize,
}

impl Default for ShopMarkers {
    fn default() -> Self {
        Self {
            banner_class: "shop-banner".into(),
            header_tag: "header".into(),
            tab_list_class: "shop-tabs".into(),
            decorator: "NEW".into(),
            item_tag: "div".into(),
            item_id_attr: "data-item-id".into(),
            item_name_attr: "data-name".into(),
            item_category_attr: "data-category".into(),
            min_item_attrs: 5,
        }
    }
}

/// Advertisement feed checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvertisementCheckerConfig {
    pub enabled: bool,
    pub key: String,
    pub url: String,
    pub interval_ticks: u32,
    pub announce_delay_ticks: u32,
    /// Object member holding the entry array (ignored if the body is an array)
    pub list_key: String,
    /// Titles containing any of these substrings are dropped
    pub exclusions: Vec<String>,
}

impl Default for AdvertisementCheckerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: "advertisements".into(),
            url: "https://dl.labymod.net/advertisement/entries.json".into(),
            interval_ticks: 5,
            announce_delay_ticks: 0,
            list_key: "advertisements".into(),
            exclusions: Vec::new(),
        }
    }
}

mod defaults {
    pub fn tick_secs() -> u64 {
        60
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; auto-news/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn storage_path() -> String {
        "news_data.json".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.checkers.version.interval_ticks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_no_enabled_checkers() {
        let mut config = Config::default();
        config.checkers.version.enabled = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_checker_url() {
        let mut config = Config::default();
        config.checkers.shop.enabled = true;
        config.checkers.shop.url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [checkers.staff]
            enabled = true
            team_id = "moderators"

            [checkers.advertisement]
            exclusions = ["Sale"]
            "#,
        )
        .unwrap();

        assert_eq!(config.ticker.tick_secs, 60);
        assert!(config.checkers.staff.enabled);
        assert_eq!(config.checkers.staff.interval_ticks, 10);
        assert_eq!(
            config.checkers.staff.resolved_url(),
            "https://www.labymod.net/en/team/moderators"
        );
        assert_eq!(config.checkers.advertisement.exclusions, vec!["Sale"]);
        assert_eq!(config.checkers.version.json_path, vec!["1.8.9", "version"]);
    }

    #[test]
    fn env_overrides_webhooks_role_and_debug() {
        let mut config = Config::default();
        config.apply_env_with(|name| match name {
            "DISCORD_WEBHOOKS" => Some("https://a.example/1; https://b.example/2;".into()),
            "DISCORD_ROLE" => Some("1234".into()),
            "DEBUG" => Some("TRUE".into()),
            _ => None,
        });

        assert_eq!(
            config.notifier.webhooks,
            vec!["https://a.example/1", "https://b.example/2"]
        );
        assert_eq!(config.notifier.role_id.as_deref(), Some("1234"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn env_debug_requires_exact_value() {
        let mut config = Config::default();
        config.apply_env_with(|name| (name == "DEBUG").then(|| "true".to_string()));
        assert_eq!(config.logging.level, "info");
    }
}
