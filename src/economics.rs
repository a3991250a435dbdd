//! Mining economics: yield, revenue and payback per price scenario
//!
//! Pipeline per cell:
//! - hashrate TH -> PH
//! - daily BTC = PH * reward * (1 - commission)
//! - monthly USD = daily BTC * price * 365 / 12
//! - net = monthly - hosting cost
//! - payback = capital / net, or infinity when net <= 0
//!
//! Everything here is pure. Inputs are trusted; validate before calling.

use crate::models::{
    Firmware, MarketSnapshot, MiningAssumptions, PriceScenario, ScenarioGrid, ScenarioKind,
    ScenarioResult, ScenarioRow, DAYS_PER_YEAR, FIXED_SCENARIO_PRICES_USD, MONTHS_PER_YEAR,
    SCENARIO_COUNT, TH_PER_PH,
};

/// Convert TH/s to PH/s
pub fn th_to_ph(hashrate_th: f64) -> f64 {
    hashrate_th / TH_PER_PH
}

/// Expected BTC mined per day after pool commission
pub fn daily_btc_yield(
    hashrate_th: f64,
    reward_btc_per_ph_day: f64,
    pool_commission_percent: f64,
) -> f64 {
    th_to_ph(hashrate_th) * reward_btc_per_ph_day * (1.0 - pool_commission_percent / 100.0)
}

/// Fiat revenue for one 365/12-day month
pub fn monthly_revenue(daily_btc: f64, btc_price_usd: f64) -> f64 {
    daily_btc * btc_price_usd * DAYS_PER_YEAR / MONTHS_PER_YEAR
}

pub fn net_monthly_revenue(monthly_revenue: f64, monthly_hosting_cost_usd: f64) -> f64 {
    monthly_revenue - monthly_hosting_cost_usd
}

/// Months until capital is recovered.
///
/// Returns `f64::INFINITY` when net revenue is zero or negative.
pub fn payback_months(net_monthly_revenue: f64, capital_cost_usd: f64) -> f64 {
    if net_monthly_revenue <= 0.0 {
        return f64::INFINITY;
    }
    capital_cost_usd / net_monthly_revenue
}

/// Run the full pipeline for one hashrate at one BTC price
pub fn evaluate(
    hashrate_th: f64,
    btc_price_usd: f64,
    market: &MarketSnapshot,
    assumptions: &MiningAssumptions,
) -> ScenarioResult {
    let daily = daily_btc_yield(
        hashrate_th,
        market.reward_btc_per_ph_day,
        assumptions.pool_commission_percent,
    );
    let revenue = monthly_revenue(daily, btc_price_usd);
    let net = net_monthly_revenue(revenue, assumptions.monthly_hosting_cost_usd);

    ScenarioResult {
        daily_btc_yield: daily,
        monthly_revenue_usd: revenue,
        net_monthly_revenue_usd: net,
        payback_months: payback_months(net, assumptions.capital_cost_usd),
    }
}

/// Price scenarios in evaluation order:
/// current, 100k, 125k, 150k, 200k, breakeven
pub fn price_scenarios(
    market: &MarketSnapshot,
    assumptions: &MiningAssumptions,
) -> [PriceScenario; SCENARIO_COUNT] {
    let fixed = |i: usize| PriceScenario {
        kind: ScenarioKind::Fixed,
        btc_price_usd: FIXED_SCENARIO_PRICES_USD[i],
    };

    [
        PriceScenario {
            kind: ScenarioKind::Current,
            btc_price_usd: market.btc_price_usd,
        },
        fixed(0),
        fixed(1),
        fixed(2),
        fixed(3),
        PriceScenario {
            kind: ScenarioKind::Breakeven,
            btc_price_usd: assumptions.breakeven_btc_price_usd,
        },
    ]
}

/// Evaluate every price scenario for both firmware configurations.
///
/// The grid is rebuilt from scratch on every call.
pub fn run_all_scenarios(market: &MarketSnapshot, assumptions: &MiningAssumptions) -> ScenarioGrid {
    let rows = price_scenarios(market, assumptions).map(|scenario| {
        let cell = |firmware: Firmware| {
            evaluate(
                assumptions.hashrate_th(firmware),
                scenario.btc_price_usd,
                market,
                assumptions,
            )
        };

        ScenarioRow {
            scenario,
            stock: cell(Firmware::Stock),
            lux: cell(Firmware::Lux),
        }
    });

    ScenarioGrid { rows }
}
