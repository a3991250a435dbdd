//! Data models for the hosting payback calculator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// CALCULATION CONSTANTS
// ============================================================================

/// Days per year used to annualize daily yield (not calendar-accurate)
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Equal-length months per year
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// TH/s per PH/s
pub const TH_PER_PH: f64 = 1000.0;

/// The four "what-if" BTC prices, in scenario order
pub const FIXED_SCENARIO_PRICES_USD: [f64; 4] = [100_000.0, 125_000.0, 150_000.0, 200_000.0];

/// Number of price scenarios evaluated per pass
pub const SCENARIO_COUNT: usize = FIXED_SCENARIO_PRICES_USD.len() + 2;

// ============================================================================
// FALLBACK CONSTANTS
// ============================================================================

/// BTC/USD used when the live price feed is unavailable
pub const FALLBACK_BTC_PRICE_USD: f64 = 67_953.35;

/// Pool reward (BTC per PH/s per day) used when the hashprice feed is unavailable
pub const FALLBACK_REWARD_BTC_PER_PH_DAY: f64 = 0.000_448_27;

/// Per-tenant assumptions, immutable within one calculation pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiningAssumptions {
    /// Per-unit hosting fee. Displayed only, never part of the math.
    pub hosting_charge_usd: f64,
    /// Flat monthly electricity/hosting deduction
    pub monthly_hosting_cost_usd: f64,
    /// Share of mined BTC kept by the pool, in percent
    pub pool_commission_percent: f64,
    pub hashrate_stock_th: f64,
    pub hashrate_alt_firmware_th: f64,
    pub breakeven_btc_price_usd: f64,
    /// Invoiced amount net of the first month's hosting charge
    pub capital_cost_usd: f64,
}

impl MiningAssumptions {
    /// Capital attributed to hardware payback.
    ///
    /// The invoice already includes the first month of hosting, so that
    /// month is taken back out.
    pub fn capital_cost_from(invoiced_amount_usd: f64, monthly_hosting_cost_usd: f64) -> f64 {
        invoiced_amount_usd - monthly_hosting_cost_usd
    }

    /// Hashrate for a firmware configuration
    pub fn hashrate_th(&self, firmware: Firmware) -> f64 {
        match firmware {
            Firmware::Stock => self.hashrate_stock_th,
            Firmware::Lux => self.hashrate_alt_firmware_th,
        }
    }
}

/// Where a market figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Fetched from a live feed
    Live,
    /// Feed unavailable, hardcoded constant used
    Fallback,
    /// Supplied by the operator on the command line
    Manual,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Live => write!(f, "live"),
            DataSource::Fallback => write!(f, "fallback"),
            DataSource::Manual => write!(f, "manual"),
        }
    }
}

/// Runtime market data, refreshed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub btc_price_usd: f64,
    /// Always normalized to BTC
    pub reward_btc_per_ph_day: f64,
    pub price_source: DataSource,
    pub reward_source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Snapshot built entirely from the fallback constants
    pub fn fallback() -> Self {
        Self {
            btc_price_usd: FALLBACK_BTC_PRICE_USD,
            reward_btc_per_ph_day: FALLBACK_REWARD_BTC_PER_PH_DAY,
            price_source: DataSource::Fallback,
            reward_source: DataSource::Fallback,
            fetched_at: Utc::now(),
        }
    }
}

/// Firmware configuration of the same hardware class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Firmware {
    Stock,
    /// Third-party firmware with a different hashrate
    Lux,
}

impl Firmware {
    /// Evaluation order within a scenario row
    pub const ALL: [Firmware; 2] = [Firmware::Stock, Firmware::Lux];
}

impl std::fmt::Display for Firmware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Firmware::Stock => write!(f, "Stock"),
            Firmware::Lux => write!(f, "Lux"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Market spot price
    Current,
    /// One of the fixed what-if prices
    Fixed,
    /// Tenant's configured break-even price
    Breakeven,
}

/// A BTC price to evaluate, labeled by where it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceScenario {
    pub kind: ScenarioKind,
    pub btc_price_usd: f64,
}

impl PriceScenario {
    pub fn label(&self) -> String {
        match self.kind {
            ScenarioKind::Current => "Current".to_string(),
            ScenarioKind::Fixed => format!("${}k", (self.btc_price_usd / 1000.0).round()),
            ScenarioKind::Breakeven => "Breakeven".to_string(),
        }
    }
}

/// One computed cell. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub daily_btc_yield: f64,
    pub monthly_revenue_usd: f64,
    pub net_monthly_revenue_usd: f64,
    /// `f64::INFINITY` when the configuration never pays back
    #[serde(serialize_with = "serialize_payback")]
    pub payback_months: f64,
}

impl ScenarioResult {
    /// `None` when the configuration never pays back
    pub fn payback(&self) -> Option<f64> {
        self.payback_months.is_finite().then_some(self.payback_months)
    }
}

/// Infinite payback is written as `null`
fn serialize_payback<S: Serializer>(months: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if months.is_finite() {
        serializer.serialize_some(months)
    } else {
        serializer.serialize_none()
    }
}

/// Both firmware results for one price scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioRow {
    pub scenario: PriceScenario,
    pub stock: ScenarioResult,
    pub lux: ScenarioResult,
}

impl ScenarioRow {
    pub fn result(&self, firmware: Firmware) -> &ScenarioResult {
        match firmware {
            Firmware::Stock => &self.stock,
            Firmware::Lux => &self.lux,
        }
    }
}

/// A labeled cell of the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioCell {
    pub scenario: PriceScenario,
    pub firmware: Firmware,
    pub result: ScenarioResult,
}

/// Full 6 x 2 result of one calculation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioGrid {
    pub rows: [ScenarioRow; SCENARIO_COUNT],
}

impl ScenarioGrid {
    /// All 12 cells, scenario order first, stock before Lux
    pub fn cells(&self) -> impl Iterator<Item = ScenarioCell> + '_ {
        self.rows.iter().flat_map(|row| {
            Firmware::ALL.into_iter().map(move |firmware| ScenarioCell {
                scenario: row.scenario,
                firmware,
                result: *row.result(firmware),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capital_cost_nets_out_first_month() {
        assert_eq!(MiningAssumptions::capital_cost_from(3850.0, 199.0), 3651.0);
    }

    #[test]
    fn test_infinite_payback_serializes_as_null() {
        let result = ScenarioResult {
            daily_btc_yield: 0.0,
            monthly_revenue_usd: 0.0,
            net_monthly_revenue_usd: -199.0,
            payback_months: f64::INFINITY,
        };

        let json = serde_json::to_value(result).unwrap();
        assert!(json["payback_months"].is_null());
        assert_eq!(result.payback(), None);
    }

    #[test]
    fn test_fixed_scenario_labels() {
        let scenario = PriceScenario {
            kind: ScenarioKind::Fixed,
            btc_price_usd: 125_000.0,
        };
        assert_eq!(scenario.label(), "$125k");
    }

    #[test]
    fn test_fallback_snapshot() {
        let snapshot = MarketSnapshot::fallback();
        assert_eq!(snapshot.btc_price_usd, 67_953.35);
        assert_eq!(snapshot.reward_btc_per_ph_day, 0.000_448_27);
        assert_eq!(snapshot.price_source, DataSource::Fallback);
    }
}
