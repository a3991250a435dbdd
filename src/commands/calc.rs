//! Calc command - payback analysis across BTC price scenarios
//!
//! Six prices (current, $100k, $125k, $150k, $200k, breakeven) are evaluated
//! for stock and Lux firmware. The whole grid is recomputed on every run.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::commands::market::{fetch_snapshot, print_snapshot};
use crate::config;
use crate::economics;
use crate::format;
use crate::market::MarketOverrides;
use crate::models::{
    Firmware, MarketSnapshot, MiningAssumptions, ScenarioGrid, ScenarioKind, ScenarioResult,
};
use crate::tenant::{self, Role, TenantProfile};
use crate::validation;

/// Everything one calculation pass used and produced
#[derive(Debug, Serialize)]
struct CalcReport<'a> {
    tenant: &'a str,
    role: Role,
    invoiced_amount_usd: f64,
    assumptions: MiningAssumptions,
    market: MarketSnapshot,
    grid: ScenarioGrid,
}

pub async fn execute(
    tenant_id: &str,
    role: String,
    invoiced: Option<f64>,
    overrides: MarketOverrides,
    json: bool,
) -> Result<()> {
    let role: Role = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let config = config::load_config()?;
    let profile = config.tenant(tenant_id)?;
    validation::ensure_valid(validation::validate_tenant(tenant_id, profile))?;

    // An explicit amount is an edit; otherwise start from the role default
    let invoiced_amount = invoiced.unwrap_or_else(|| {
        tenant::resolve_default_invoiced_amount(role, profile.invoiced_amount_usd)
    });
    validation::ensure_valid(validation::validate_invoiced_amount(invoiced_amount))?;

    let market = fetch_snapshot(&config.feeds, overrides, json).await?;

    let assumptions = profile.assumptions(invoiced_amount);
    let grid = economics::run_all_scenarios(&market, &assumptions);

    tracing::debug!(
        tenant = tenant_id,
        %role,
        invoiced_amount,
        capital_cost = assumptions.capital_cost_usd,
        btc_price = market.btc_price_usd,
        "Scenarios evaluated"
    );
    for cell in grid.cells() {
        tracing::trace!(
            scenario = %cell.scenario.label(),
            firmware = %cell.firmware,
            net = cell.result.net_monthly_revenue_usd,
            payback = cell.result.payback_months,
            "Scenario cell"
        );
    }

    if json {
        let report = CalcReport {
            tenant: tenant_id,
            role,
            invoiced_amount_usd: invoiced_amount,
            assumptions,
            market,
            grid,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Payback Analysis: {}", profile.name).cyan().bold()
    );
    println!();

    print_assumptions(profile, &assumptions, invoiced_amount, role);
    println!();

    println!("  {}", "Market".bright_black());
    println!("  {}", "━".repeat(40).bright_black());
    print_snapshot(&market);
    println!();

    for firmware in Firmware::ALL {
        print_firmware_table(&grid, firmware, assumptions.hashrate_th(firmware));
        println!();
    }

    println!(
        "  {}",
        "Payback assumes constant network reward and hosting cost; ∞ = never pays back."
            .bright_black()
    );

    Ok(())
}

fn print_assumptions(
    profile: &TenantProfile,
    assumptions: &MiningAssumptions,
    invoiced_amount: f64,
    role: Role,
) {
    println!("  {}", "Assumptions".bright_black());
    println!("  {}", "━".repeat(40).bright_black());
    println!(
        "    {} {} stock / {} Lux",
        "Hashrate:".bright_black(),
        format::hashrate_th(profile.hashrate_stock_th),
        format::hashrate_th(profile.hashrate_lux_th)
    );
    println!(
        "    {} {}",
        "Pool Commission:".bright_black(),
        format::percent(profile.pool_commission_percent)
    );
    println!(
        "    {} {} kW ({:.0} kWh / month)",
        "Power:".bright_black(),
        profile.power_consumption_kw,
        profile.monthly_energy_kwh()
    );
    println!(
        "    {} {}",
        "Hosting Charge:".bright_black(),
        format::usd(profile.hosting_charge_usd)
    );
    println!(
        "    {} {}",
        "Monthly Invoicing:".bright_black(),
        format::usd(assumptions.monthly_hosting_cost_usd)
    );
    println!(
        "    {} {}",
        "Machine Cost:".bright_black(),
        format::usd(profile.machine_cost_usd)
    );
    println!(
        "    {} {} {}",
        "Invoiced Amount:".bright_black(),
        format::usd(invoiced_amount).yellow(),
        format!("({})", role).bright_black()
    );
    println!(
        "    {} {}",
        "Capital Cost:".bright_black(),
        format::usd(assumptions.capital_cost_usd).yellow()
    );
    println!(
        "    {} {}",
        "Breakeven Price:".bright_black(),
        format::usd(assumptions.breakeven_btc_price_usd)
    );
}

pub(crate) fn print_firmware_table(grid: &ScenarioGrid, firmware: Firmware, hashrate_th: f64) {
    println!(
        "  {}",
        format!("{} firmware ({})", firmware, format::hashrate_th(hashrate_th))
            .cyan()
            .bold()
    );
    println!(
        "  {:<12} {:>14} {:>16} {:>12} {:>12} {:>10}",
        "Scenario".bright_black(),
        "BTC Price".bright_black(),
        "BTC / Day".bright_black(),
        "Revenue/mo".bright_black(),
        "Net/mo".bright_black(),
        "Payback".bright_black()
    );
    println!("  {}", "━".repeat(81).bright_black());

    for row in &grid.rows {
        let result = row.result(firmware);
        let label = format!("{:<12}", row.scenario.label());
        let label = match row.scenario.kind {
            ScenarioKind::Current => label.cyan(),
            ScenarioKind::Fixed => label.normal(),
            ScenarioKind::Breakeven => label.yellow(),
        };

        println!(
            "  {} {:>14} {:>16} {:>12} {} {}",
            label,
            format::usd(row.scenario.btc_price_usd),
            format!("{:.8}", result.daily_btc_yield),
            format::usd(result.monthly_revenue_usd),
            colored_net(result),
            colored_payback(result)
        );
    }
}

fn colored_net(result: &ScenarioResult) -> colored::ColoredString {
    let text = format!("{:>12}", format::usd(result.net_monthly_revenue_usd));
    if result.net_monthly_revenue_usd > 0.0 {
        text.green()
    } else {
        text.red()
    }
}

fn colored_payback(result: &ScenarioResult) -> colored::ColoredString {
    let text = format!("{:>10}", format::months(result.payback_months));
    match result.payback() {
        Some(_) => text.green(),
        None => text.red().bold(),
    }
}
