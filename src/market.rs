//! Live market feeds: BTC spot price and pool hashprice
//!
//! Both feeds are fetched concurrently. A failed feed never fails the
//! calculation: its figure is replaced by the configured fallback and the
//! snapshot records where each number came from.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::models::{DataSource, MarketSnapshot};

/// Satoshis per BTC
const SATS_PER_BTC: f64 = 100_000_000.0;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{feed} returned HTTP {status}")]
    Status {
        feed: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{feed} returned malformed JSON: {source}")]
    Decode {
        feed: &'static str,
        source: serde_json::Error,
    },

    #[error("{feed} response missing {field}")]
    MissingField {
        feed: &'static str,
        field: String,
    },

    #[error("{feed} returned unusable value {value}")]
    InvalidValue { feed: &'static str, value: f64 },

    #[error("no hashprice endpoint configured")]
    NotConfigured,
}

/// Operator overrides applied instead of a feed
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketOverrides {
    pub btc_price_usd: Option<f64>,
    pub reward_btc_per_ph_day: Option<f64>,
    /// Skip both feeds
    pub offline: bool,
}

/// Pool hashprice, per PH/s per day
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hashprice {
    #[serde(alias = "hashprice", alias = "hash_price")]
    pub value: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "BTC".to_string()
}

/// Normalize a pool reward to BTC per PH/s per day.
///
/// BTC is used as is and satoshis are scaled down. Any other currency is
/// treated as fiat and divided by the BTC price.
pub fn normalize_reward(value: f64, currency: &str, btc_price_usd: f64) -> f64 {
    match currency.to_uppercase().as_str() {
        "BTC" | "XBT" => value,
        "SAT" | "SATS" => value / SATS_PER_BTC,
        _ => value / btc_price_usd,
    }
}

/// Extract the spot price for `coin_id` in `vs_currency` from a `simple/price` body
pub fn parse_simple_price(body: &str, coin_id: &str, vs_currency: &str) -> Result<f64, MarketError> {
    let data: HashMap<String, HashMap<String, f64>> =
        serde_json::from_str(body).map_err(|source| MarketError::Decode {
            feed: "price feed",
            source,
        })?;

    let price = data
        .get(coin_id)
        .and_then(|quotes| quotes.get(vs_currency))
        .copied()
        .ok_or_else(|| MarketError::MissingField {
            feed: "price feed",
            field: format!("{}.{}", coin_id, vs_currency),
        })?;

    if !price.is_finite() || price <= 0.0 {
        return Err(MarketError::InvalidValue {
            feed: "price feed",
            value: price,
        });
    }

    Ok(price)
}

/// Parse a hashprice body
pub fn parse_hashprice(body: &str) -> Result<Hashprice, MarketError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|source| MarketError::Decode {
            feed: "hashprice feed",
            source,
        })?;
    let hashprice: Hashprice =
        serde_json::from_value(value).map_err(|_| MarketError::MissingField {
            feed: "hashprice feed",
            field: "value".to_string(),
        })?;

    if !hashprice.value.is_finite() || hashprice.value < 0.0 {
        return Err(MarketError::InvalidValue {
            feed: "hashprice feed",
            value: hashprice.value,
        });
    }

    Ok(hashprice)
}

/// Market feed client
pub struct MarketClient {
    client: reqwest::Client,
    feeds: FeedConfig,
}

impl MarketClient {
    pub fn new(feeds: &FeedConfig) -> Result<Self, MarketError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hostcalc/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(feeds.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            feeds: feeds.clone(),
        })
    }

    fn price_url(&self) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.feeds.price_api.trim_end_matches('/'),
            urlencoding::encode(&self.feeds.coin_id),
            urlencoding::encode(&self.feeds.vs_currency)
        )
    }

    async fn get_text(&self, feed: &'static str, url: &str) -> Result<String, MarketError> {
        debug!(feed, url, "Fetching");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::Status {
                feed,
                status: response.status(),
            });
        }

        Ok(response.text().await?)
    }

    /// Current BTC spot price
    pub async fn fetch_btc_price(&self) -> Result<f64, MarketError> {
        let body = self.get_text("price feed", &self.price_url()).await?;
        parse_simple_price(&body, &self.feeds.coin_id, &self.feeds.vs_currency)
    }

    /// Raw pool hashprice, before normalization
    pub async fn fetch_hashprice(&self) -> Result<Hashprice, MarketError> {
        let url = self
            .feeds
            .hashprice_url
            .as_deref()
            .ok_or(MarketError::NotConfigured)?;

        let body = self.get_text("hashprice feed", url).await?;
        parse_hashprice(&body)
    }

    /// Fetch both feeds concurrently and build a snapshot.
    ///
    /// Never fails: each missing figure falls back to its constant.
    pub async fn snapshot(&self, overrides: MarketOverrides) -> MarketSnapshot {
        let fetch_price = overrides.btc_price_usd.is_none() && !overrides.offline;
        let fetch_reward = overrides.reward_btc_per_ph_day.is_none() && !overrides.offline;

        let (price, hashprice) = tokio::join!(
            async {
                if fetch_price {
                    Some(self.fetch_btc_price().await)
                } else {
                    None
                }
            },
            async {
                if fetch_reward {
                    Some(self.fetch_hashprice().await)
                } else {
                    None
                }
            }
        );

        resolve_snapshot(&self.feeds, overrides, price, hashprice)
    }
}

/// Combine feed outcomes, overrides and fallbacks into one snapshot.
///
/// A `None` outcome means the feed was not queried.
pub fn resolve_snapshot(
    feeds: &FeedConfig,
    overrides: MarketOverrides,
    price: Option<Result<f64, MarketError>>,
    hashprice: Option<Result<Hashprice, MarketError>>,
) -> MarketSnapshot {
    let (btc_price_usd, price_source) = match (overrides.btc_price_usd, price) {
        (Some(manual), _) => (manual, DataSource::Manual),
        (None, Some(Ok(live))) => (live, DataSource::Live),
        (None, Some(Err(e))) => {
            warn!("BTC price unavailable ({}), using fallback", e);
            (feeds.fallback_btc_price_usd, DataSource::Fallback)
        }
        (None, None) => (feeds.fallback_btc_price_usd, DataSource::Fallback),
    };

    // Non-BTC rewards are normalized with whichever price is in use
    let (reward_btc_per_ph_day, reward_source) = match (overrides.reward_btc_per_ph_day, hashprice) {
        (Some(manual), _) => (manual, DataSource::Manual),
        (None, Some(Ok(hp))) => (
            normalize_reward(hp.value, &hp.currency, btc_price_usd),
            DataSource::Live,
        ),
        (None, Some(Err(MarketError::NotConfigured))) => {
            debug!("No hashprice endpoint configured, using fallback reward");
            (feeds.fallback_reward_btc_per_ph_day, DataSource::Fallback)
        }
        (None, Some(Err(e))) => {
            warn!("Pool hashprice unavailable ({}), using fallback", e);
            (feeds.fallback_reward_btc_per_ph_day, DataSource::Fallback)
        }
        (None, None) => (feeds.fallback_reward_btc_per_ph_day, DataSource::Fallback),
    };

    MarketSnapshot {
        btc_price_usd,
        reward_btc_per_ph_day,
        price_source,
        reward_source,
        fetched_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FALLBACK_BTC_PRICE_USD, FALLBACK_REWARD_BTC_PER_PH_DAY};

    #[test]
    fn test_parse_simple_price() {
        let body = r#"{"bitcoin":{"usd":67953.35}}"#;
        assert_eq!(parse_simple_price(body, "bitcoin", "usd").unwrap(), 67953.35);
    }

    #[test]
    fn test_parse_simple_price_missing_quote() {
        let body = r#"{"bitcoin":{"eur":61000.0}}"#;
        let err = parse_simple_price(body, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, MarketError::MissingField { .. }));
        assert!(err.to_string().contains("bitcoin.usd"));
    }

    #[test]
    fn test_parse_simple_price_rejects_zero() {
        let body = r#"{"bitcoin":{"usd":0}}"#;
        assert!(matches!(
            parse_simple_price(body, "bitcoin", "usd"),
            Err(MarketError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_non_json_body() {
        let err = parse_simple_price("<html>502 Bad Gateway</html>", "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, MarketError::Decode { feed: "price feed", .. }));
        assert!(err.to_string().contains("malformed JSON"));

        assert!(matches!(
            parse_hashprice("not json"),
            Err(MarketError::Decode { feed: "hashprice feed", .. })
        ));
        assert!(matches!(
            parse_hashprice(r#"{"currency": "BTC"}"#),
            Err(MarketError::MissingField { .. })
        ));
    }

    #[test]
    fn test_parse_hashprice_aliases() {
        let hp = parse_hashprice(r#"{"hashprice": 48.5, "currency": "USD"}"#).unwrap();
        assert_eq!(hp.value, 48.5);
        assert_eq!(hp.currency, "USD");

        let hp = parse_hashprice(r#"{"value": 0.00044827}"#).unwrap();
        assert_eq!(hp.currency, "BTC");
    }

    #[test]
    fn test_normalize_reward() {
        assert_eq!(normalize_reward(0.00044827, "btc", 67953.35), 0.00044827);
        assert_eq!(normalize_reward(44827.0, "sats", 67953.35), 0.00044827);
        assert!((normalize_reward(50.0, "USD", 100_000.0) - 0.0005).abs() < 1e-15);
    }

    #[test]
    fn test_failed_feeds_fall_back() {
        let feeds = FeedConfig::default();
        let snapshot = resolve_snapshot(
            &feeds,
            MarketOverrides::default(),
            Some(Err(MarketError::InvalidValue {
                feed: "price feed",
                value: -1.0,
            })),
            Some(Err(MarketError::NotConfigured)),
        );

        assert_eq!(snapshot.btc_price_usd, FALLBACK_BTC_PRICE_USD);
        assert_eq!(snapshot.reward_btc_per_ph_day, FALLBACK_REWARD_BTC_PER_PH_DAY);
        assert_eq!(snapshot.price_source, DataSource::Fallback);
        assert_eq!(snapshot.reward_source, DataSource::Fallback);
    }

    #[test]
    fn test_fiat_reward_uses_resolved_price() {
        let feeds = FeedConfig::default();
        let snapshot = resolve_snapshot(
            &feeds,
            MarketOverrides {
                btc_price_usd: Some(100_000.0),
                ..Default::default()
            },
            None,
            Some(Ok(Hashprice {
                value: 50.0,
                currency: "USD".to_string(),
            })),
        );

        assert_eq!(snapshot.price_source, DataSource::Manual);
        assert_eq!(snapshot.reward_source, DataSource::Live);
        assert!((snapshot.reward_btc_per_ph_day - 0.0005).abs() < 1e-15);
    }

    #[test]
    fn test_fiat_reward_uses_fallback_price() {
        let feeds = FeedConfig::default();
        let snapshot = resolve_snapshot(
            &feeds,
            MarketOverrides::default(),
            Some(Err(MarketError::NotConfigured)),
            Some(Ok(Hashprice {
                value: 48.5,
                currency: "USD".to_string(),
            })),
        );

        assert_eq!(snapshot.price_source, DataSource::Fallback);
        assert_eq!(snapshot.reward_source, DataSource::Live);
        assert_eq!(snapshot.btc_price_usd, FALLBACK_BTC_PRICE_USD);
        assert!((snapshot.reward_btc_per_ph_day - 48.5 / FALLBACK_BTC_PRICE_USD).abs() < 1e-15);
    }

    #[tokio::test]
    async fn test_offline_snapshot_skips_feeds() {
        let feeds = FeedConfig {
            price_api: "http://127.0.0.1:9".to_string(),
            ..FeedConfig::default()
        };
        let client = MarketClient::new(&feeds).unwrap();

        let snapshot = client
            .snapshot(MarketOverrides {
                reward_btc_per_ph_day: Some(0.0005),
                offline: true,
                ..Default::default()
            })
            .await;

        assert_eq!(snapshot.btc_price_usd, FALLBACK_BTC_PRICE_USD);
        assert_eq!(snapshot.price_source, DataSource::Fallback);
        assert_eq!(snapshot.reward_btc_per_ph_day, 0.0005);
        assert_eq!(snapshot.reward_source, DataSource::Manual);
    }
}
