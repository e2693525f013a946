use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

/// Environment variable prefix, e.g. `TAX__TAXJAR__API_KEY`.
pub const ENV_PREFIX: &str = "TAX";

pub const DEFAULT_API_BASE_URL: &str = "https://api.taxjar.com";
pub const DEFAULT_API_VERSION: &str = "2022-01-24";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SUMMARY_RATES_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default)]
    pub taxjar: TaxJarConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TaxJarConfig {
    /// An empty key turns TaxJar off entirely.
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long fetched summary rates are reused before asking TaxJar again.
    #[serde(default = "default_summary_rates_ttl_secs")]
    pub summary_rates_ttl_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SyncConfig {
    /// Push settled orders to the TaxJar ledger.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Reconcile against refund records from the transaction-log module.
    #[serde(default)]
    pub refund_records: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PricingConfig {
    /// Send per-line items to TaxJar instead of one aggregate amount.
    #[serde(default = "default_true")]
    pub use_line_items: bool,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_country")]
    pub default_country: String,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        core_config::load_layered(ENV_PREFIX)
    }

    pub fn taxjar_enabled(&self) -> bool {
        self.taxjar.is_configured()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            taxjar: TaxJarConfig::default(),
            sync: SyncConfig::default(),
            pricing: PricingConfig::default(),
        }
    }
}

impl TaxJarConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

impl Default for TaxJarConfig {
    fn default() -> Self {
        Self {
            api_key: empty_secret(),
            api_base_url: default_api_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            summary_rates_ttl_secs: default_summary_rates_ttl_secs(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refund_records: false,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            use_line_items: true,
            default_currency: default_currency(),
            default_country: default_country(),
        }
    }
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_summary_rates_ttl_secs() -> u64 {
    DEFAULT_SUMMARY_RATES_TTL_SECS
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_country() -> String {
    "US".to_string()
}
