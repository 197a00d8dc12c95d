//! Application configuration management.
//!
//! Two kinds of configuration are loaded once at startup and then shared
//! read-only:
//! - `Config`: process settings from environment variables, deserialized
//!   with the `envy` crate (a `.env` file is honoured through `dotenvy`)
//! - `Catalog`: the plan table and deposit addresses, read from a JSON file

use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::{
    models::{
        account::{Currency, UsdtNetwork},
        plan::Plan,
    },
    services::verification::ExplorerKeys,
};

/// Path the Telegram webhook is served on.
pub const WEBHOOK_PATH: &str = "/telegram/webhook";

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `TGBOTTOKEN` or `BOT_TOKEN` (required): Telegram bot token
/// - `ADMIN_ID` (required): Telegram user id of the administrator
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `WEBHOOK_BASE_URL` / `RENDER_EXTERNAL_HOSTNAME` (optional): enable push mode
/// - `WEBHOOK_SECRET` (optional): shared secret for the webhook
/// - `PORT` (optional): HTTP server port, defaults to 8080
/// - `CATALOG_PATH` (optional): plan/address catalog, defaults to `catalog.json`
/// - `SUPPORT_URL` (optional): link behind the "contact support" button
/// - `ETHERSCAN_API_KEY`, `BSCSCAN_API_KEY`, `BLOCKCYPHER_TOKEN`, `TONCENTER_API_KEY` (optional)
/// - `EXPLORER_TIMEOUT_SECS` (optional): explorer request timeout, defaults to 10
/// - `ACCRUAL_CRON` (optional): accrual schedule, defaults to midnight UTC
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(alias = "tgbottoken")]
    pub bot_token: String,

    pub admin_id: i64,

    pub database_url: String,

    #[serde(default)]
    pub webhook_base_url: Option<String>,

    #[serde(default)]
    pub render_external_hostname: Option<String>,

    #[serde(default)]
    pub webhook_secret: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    #[serde(default)]
    pub support_url: Option<String>,

    #[serde(default)]
    pub etherscan_api_key: Option<String>,

    #[serde(default)]
    pub bscscan_api_key: Option<String>,

    #[serde(default)]
    pub blockcypher_token: Option<String>,

    #[serde(default)]
    pub toncenter_api_key: Option<String>,

    #[serde(default = "default_explorer_timeout")]
    pub explorer_timeout_secs: u64,

    #[serde(default = "default_accrual_cron")]
    pub accrual_cron: String,
}

fn default_port() -> u16 {
    8080
}

fn default_catalog_path() -> String {
    "catalog.json".to_string()
}

fn default_explorer_timeout() -> u64 {
    10
}

/// Every day at 00:00:00 UTC (seconds-resolution cron).
fn default_accrual_cron() -> String {
    "0 0 0 * * *".to_string()
}

/// Treat unset and blank variables the same way.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("invalid support URL: {0}")]
    InvalidSupportUrl(String),

    #[error("WEBHOOK_SECRET must be 1-256 characters of A-Z, a-z, 0-9, '_' or '-'")]
    InvalidWebhookSecret,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or a value cannot
    /// be parsed into its expected type (e.g. a non-numeric `ADMIN_ID`).
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Full webhook URL when push mode is configured, `None` for long polling.
    ///
    /// `WEBHOOK_BASE_URL` wins; otherwise `RENDER_EXTERNAL_HOSTNAME` is turned
    /// into `https://<host>`.
    pub fn webhook_url(&self) -> Result<Option<Url>, ConfigError> {
        let base = match (
            non_empty(&self.webhook_base_url),
            non_empty(&self.render_external_hostname),
        ) {
            (Some(base), _) => base.trim_end_matches('/').to_string(),
            (None, Some(host)) => format!("https://{host}"),
            (None, None) => return Ok(None),
        };

        let url = format!("{base}{WEBHOOK_PATH}");
        validate_webhook_url(&url)?;
        Url::parse(&url)
            .map(Some)
            .map_err(|e| ConfigError::InvalidWebhookUrl(e.to_string()))
    }

    /// Secret Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`. When
    /// unset, a random one is generated at startup.
    pub fn webhook_secret(&self) -> Result<Option<&str>, ConfigError> {
        match non_empty(&self.webhook_secret) {
            Some(secret)
                if secret.len() > 256
                    || !secret
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') =>
            {
                Err(ConfigError::InvalidWebhookSecret)
            }
            secret => Ok(secret),
        }
    }

    pub fn support_url(&self) -> Result<Option<Url>, ConfigError> {
        non_empty(&self.support_url)
            .map(|raw| Url::parse(raw).map_err(|e| ConfigError::InvalidSupportUrl(e.to_string())))
            .transpose()
    }

    pub fn explorer_keys(&self) -> ExplorerKeys {
        ExplorerKeys {
            etherscan: non_empty(&self.etherscan_api_key).map(str::to_string),
            bscscan: non_empty(&self.bscscan_api_key).map(str::to_string),
            blockcypher: non_empty(&self.blockcypher_token).map(str::to_string),
            toncenter: non_empty(&self.toncenter_api_key).map(str::to_string),
        }
    }

    pub fn explorer_timeout(&self) -> Duration {
        Duration::from_secs(self.explorer_timeout_secs.max(1))
    }
}

/// Validate webhook URL format.
///
/// # Rules
///
/// - Must be valid URL
/// - Must be HTTPS (HTTP localhost allowed for development)
fn validate_webhook_url(url: &str) -> Result<(), ConfigError> {
    let parsed =
        Url::parse(url).map_err(|_| ConfigError::InvalidWebhookUrl("Invalid URL format".into()))?;

    match parsed.scheme() {
        "https" => Ok(()),
        "http" => {
            if parsed.host_str() == Some("localhost") || parsed.host_str() == Some("127.0.0.1") {
                Ok(())
            } else {
                Err(ConfigError::InvalidWebhookUrl(
                    "HTTP is only allowed for localhost. Use HTTPS for production.".to_string(),
                ))
            }
        }
        _ => Err(ConfigError::InvalidWebhookUrl(
            "URL must use HTTP or HTTPS".to_string(),
        )),
    }
}

/// Plan table and deposit addresses.
///
/// # JSON Example
///
/// ```json
/// {
///   "plans": [
///     { "key": "plan_1", "title": "First plan", "equity_range": "$500 - $999",
///       "daily_rate_bps": 50, "deposit_cents": 50000 }
///   ],
///   "deposit_addresses": { "BTC": "bc1q...", "ETH": "0x..." },
///   "usdt_addresses": { "TRC20": "T...", "BEP20": "0x...", "TON": "UQ..." }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub plans: Vec<Plan>,

    #[serde(default)]
    pub deposit_addresses: HashMap<Currency, String>,

    #[serde(default)]
    pub usdt_addresses: HashMap<UsdtNetwork, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog defines no plans")]
    NoPlans,

    #[error("plan key `{0}` must be 1-32 characters without ':'")]
    BadPlanKey(String),

    #[error("plan `{0}` is defined twice")]
    DuplicatePlan(String),

    #[error("plan `{0}` has a negative rate or deposit")]
    NegativeValue(String),
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.plans.is_empty() {
            return Err(CatalogError::NoPlans);
        }
        for (index, plan) in self.plans.iter().enumerate() {
            if plan.key.is_empty() || plan.key.len() > 32 || plan.key.contains(':') {
                return Err(CatalogError::BadPlanKey(plan.key.clone()));
            }
            if self.plans[..index].iter().any(|p| p.key == plan.key) {
                return Err(CatalogError::DuplicatePlan(plan.key.clone()));
            }
            if plan.daily_rate_bps < 0 || plan.deposit_cents < 0 {
                return Err(CatalogError::NegativeValue(plan.key.clone()));
            }
        }
        Ok(())
    }

    pub fn plan(&self, key: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.key == key)
    }

    /// Address to show for a deposit; USDT addresses depend on the network.
    pub fn deposit_address(
        &self,
        currency: Currency,
        network: Option<UsdtNetwork>,
    ) -> Option<&str> {
        match (currency, network) {
            (Currency::Usdt, Some(network)) => self.usdt_addresses.get(&network),
            (Currency::Usdt, None) => None,
            (currency, _) => self.deposit_addresses.get(&currency),
        }
        .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "plans": [
            {"key": "plan_1", "title": "First", "equity_range": "$500 - $999",
             "daily_rate_bps": 3000, "deposit_cents": 50000},
            {"key": "plan_2", "title": "Second", "equity_range": "$1,000+",
             "daily_rate_bps": 150, "deposit_cents": 100000}
        ],
        "deposit_addresses": {"BTC": "btc-address"},
        "usdt_addresses": {"TRC20": "tron-address"}
    }"#;

    fn config() -> Config {
        Config {
            bot_token: "token".into(),
            admin_id: 1,
            database_url: "postgres://localhost/test".into(),
            webhook_base_url: None,
            render_external_hostname: None,
            webhook_secret: None,
            port: default_port(),
            catalog_path: default_catalog_path(),
            support_url: None,
            etherscan_api_key: Some("  ".into()),
            bscscan_api_key: None,
            blockcypher_token: Some("token".into()),
            toncenter_api_key: None,
            explorer_timeout_secs: default_explorer_timeout(),
            accrual_cron: default_accrual_cron(),
        }
    }

    #[test]
    fn loads_and_looks_up_catalog() {
        let catalog = Catalog::from_json(CATALOG).unwrap();

        assert_eq!(catalog.plan("plan_2").map(|p| p.daily_rate_bps), Some(150));
        assert!(catalog.plan("plan_9").is_none());
        assert_eq!(
            catalog.deposit_address(Currency::Btc, None),
            Some("btc-address")
        );
        assert_eq!(
            catalog.deposit_address(Currency::Usdt, Some(UsdtNetwork::Trc20)),
            Some("tron-address")
        );
        assert_eq!(catalog.deposit_address(Currency::Usdt, None), None);
        assert_eq!(catalog.deposit_address(Currency::Eth, None), None);
    }

    #[test]
    fn rejects_duplicate_plan_keys() {
        let raw = r#"{"plans": [
            {"key": "a", "title": "A", "equity_range": "", "daily_rate_bps": 1, "deposit_cents": 1},
            {"key": "a", "title": "B", "equity_range": "", "daily_rate_bps": 1, "deposit_cents": 1}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(raw),
            Err(CatalogError::DuplicatePlan(key)) if key == "a"
        ));
    }

    #[test]
    fn rejects_negative_rates_and_empty_tables() {
        let negative = r#"{"plans": [
            {"key": "a", "title": "A", "equity_range": "", "daily_rate_bps": -1, "deposit_cents": 1}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(negative),
            Err(CatalogError::NegativeValue(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"plans": []}"#),
            Err(CatalogError::NoPlans)
        ));
    }

    #[test]
    fn polling_mode_without_webhook_settings() {
        assert_eq!(config().webhook_url().unwrap(), None);
    }

    #[test]
    fn webhook_url_from_base_or_render_host() {
        let mut cfg = config();
        cfg.webhook_base_url = Some("https://bot.example.com/".into());
        assert_eq!(
            cfg.webhook_url().unwrap().unwrap().as_str(),
            "https://bot.example.com/telegram/webhook"
        );

        let mut cfg = config();
        cfg.render_external_hostname = Some("svc.onrender.com".into());
        assert_eq!(
            cfg.webhook_url().unwrap().unwrap().as_str(),
            "https://svc.onrender.com/telegram/webhook"
        );
    }

    #[test]
    fn plain_http_webhooks_only_for_localhost() {
        let mut cfg = config();
        cfg.webhook_base_url = Some("http://bot.example.com".into());
        assert!(cfg.webhook_url().is_err());

        cfg.webhook_base_url = Some("http://localhost:8080".into());
        assert!(cfg.webhook_url().unwrap().is_some());
    }

    #[test]
    fn webhook_secret_uses_telegram_alphabet() {
        let mut cfg = config();
        assert_eq!(cfg.webhook_secret().unwrap(), None);

        cfg.webhook_secret = Some(" s3cret_token-1 ".into());
        assert_eq!(cfg.webhook_secret().unwrap(), Some("s3cret_token-1"));

        cfg.webhook_secret = Some("not allowed!".into());
        assert!(matches!(
            cfg.webhook_secret(),
            Err(ConfigError::InvalidWebhookSecret)
        ));
        cfg.webhook_secret = Some("a".repeat(257));
        assert!(cfg.webhook_secret().is_err());
    }

    #[test]
    fn shipped_catalog_has_six_plans() {
        let catalog = Catalog::load(concat!(env!("CARGO_MANIFEST_DIR"), "/catalog.json")).unwrap();

        assert_eq!(catalog.plans.len(), 6);
        assert_eq!(
            catalog
                .plans
                .iter()
                .map(|p| (p.daily_rate_bps, p.deposit_cents))
                .collect::<Vec<_>>(),
            vec![
                (2500, 50_000),
                (3000, 100_000),
                (4500, 500_000),
                (5000, 1_000_000),
                (5500, 5_000_000),
                (6000, 20_000_000),
            ]
        );
        let plan = catalog.plan("plan_2").unwrap();
        assert_eq!(plan.daily_percent(), "30");
        assert_eq!(plan.equity_range, "$1,000 - $4,999");
        assert_eq!(catalog.plan("plan_6").unwrap().equity_range, "$200,000 and above");
    }

    #[test]
    fn blank_explorer_keys_count_as_missing() {
        let keys = config().explorer_keys();
        assert_eq!(keys.etherscan, None);
        assert_eq!(keys.blockcypher.as_deref(), Some("token"));
    }
}
