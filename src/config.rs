//! Configuration management for hostcalc

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::{FALLBACK_BTC_PRICE_USD, FALLBACK_REWARD_BTC_PER_PH_DAY};
use crate::tenant::TenantProfile;

/// Tenant used when none is given
pub const DEFAULT_TENANT: &str = "reference";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Market data feeds
    #[serde(default)]
    pub feeds: FeedConfig,

    /// Tenant id -> profile
    #[serde(default)]
    pub tenants: BTreeMap<String, TenantProfile>,
}

/// Live feed endpoints and their fallbacks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// CoinGecko-compatible API base
    pub price_api: String,

    /// Coin id on the price API
    pub coin_id: String,

    /// Quote currency on the price API
    pub vs_currency: String,

    /// Pool hashprice endpoint, per PH/s per day
    pub hashprice_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub fallback_btc_price_usd: f64,

    pub fallback_reward_btc_per_ph_day: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            price_api: "https://api.coingecko.com/api/v3".to_string(),
            coin_id: "bitcoin".to_string(),
            vs_currency: "usd".to_string(),
            hashprice_url: None,
            timeout_secs: 10,
            fallback_btc_price_usd: FALLBACK_BTC_PRICE_USD,
            fallback_reward_btc_per_ph_day: FALLBACK_REWARD_BTC_PER_PH_DAY,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        let mut tenants = BTreeMap::new();
        tenants.insert(DEFAULT_TENANT.to_string(), TenantProfile::reference());

        Self {
            feeds: FeedConfig::default(),
            tenants,
        }
    }

    /// Look up a tenant profile
    pub fn tenant(&self, id: &str) -> Result<&TenantProfile> {
        self.tenants.get(id).with_context(|| {
            format!(
                "Unknown tenant: {}. Configured: {}",
                id,
                self.tenants.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }

    pub fn tenant_mut(&mut self, id: &str) -> Result<&mut TenantProfile> {
        self.tenants
            .get_mut(id)
            .with_context(|| format!("Unknown tenant: {}", id))
    }
}

/// Get the config file path
pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("io", "hostcalc", "hostcalc")
        .context("Failed to determine config directory")?;

    let config_dir = proj_dirs.config_dir();
    std::fs::create_dir_all(config_dir)?;

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::new());
    }

    let content = std::fs::read_to_string(&path)
        .context("Failed to read config file")?;

    parse_config(&content)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .context("Failed to parse config file")?;

    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;

    let content = toml::to_string_pretty(config)
        .context("Failed to serialize config")?;

    std::fs::write(&path, content)
        .context("Failed to write config file")?;

    tracing::debug!("Config written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_reference_tenant() {
        let config = Config::new();
        let tenant = config.tenant(DEFAULT_TENANT).unwrap();

        assert_eq!(tenant.hashrate_stock_th, 236.0);
        assert_eq!(tenant.monthly_invoicing_amount_usd, 199.0);
        assert!(config.feeds.hashprice_url.is_none());
    }

    #[test]
    fn test_unknown_tenant_lists_configured() {
        let config = Config::new();
        let err = config.tenant("nope").unwrap_err().to_string();

        assert!(err.contains("nope"));
        assert!(err.contains(DEFAULT_TENANT));
    }

    #[test]
    fn test_config_survives_toml() {
        let config = Config::new();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = parse_config(&text).unwrap();

        assert_eq!(parsed.tenants, config.tenants);
        assert_eq!(parsed.feeds.price_api, config.feeds.price_api);
    }

    #[test]
    fn test_partial_feeds_table_uses_defaults() {
        let text = r#"
            [feeds]
            hashprice_url = "https://pool.example/hashprice"

            [tenants.acme]
            name = "Acme"
            hosting_charge_usd = 0.07
            monthly_invoicing_amount_usd = 180.0
            power_consumption_kw = 3.3
            machine_cost_usd = 3500.0
            pool_commission_percent = 2.0
            hashrate_stock_th = 200.0
            hashrate_lux_th = 230.0
            breakeven_btc_price_usd = 60000.0
            invoiced_amount_usd = 3700.0
        "#;

        let config = parse_config(text).unwrap();
        assert_eq!(
            config.feeds.hashprice_url.as_deref(),
            Some("https://pool.example/hashprice")
        );
        assert_eq!(config.feeds.timeout_secs, 10);
        assert_eq!(config.feeds.fallback_btc_price_usd, FALLBACK_BTC_PRICE_USD);
        assert_eq!(config.tenant("acme").unwrap().invoiced_amount_usd, 3700.0);
        assert!(config.tenant(DEFAULT_TENANT).is_err());
    }
}
