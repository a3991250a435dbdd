//! Tenants command - list configured tenants

use anyhow::Result;
use colored::Colorize;

use crate::config;
use crate::format;

pub async fn execute(json: bool) -> Result<()> {
    let config = config::load_config()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.tenants)?);
        return Ok(());
    }

    println!("{}", "Tenants".cyan().bold());
    println!();

    if config.tenants.is_empty() {
        println!("  {}", "No tenants configured".bright_black());
        return Ok(());
    }

    println!(
        "  {:<14} {:<24} {:>10} {:>10} {:>12} {:>12}",
        "Id".bright_black(),
        "Name".bright_black(),
        "Stock TH".bright_black(),
        "Lux TH".bright_black(),
        "Monthly".bright_black(),
        "Invoiced".bright_black()
    );
    println!("  {}", "━".repeat(87).bright_black());

    for (id, profile) in &config.tenants {
        println!(
            "  {:<14} {:<24} {:>10} {:>10} {:>12} {:>12}",
            id.cyan(),
            profile.name,
            profile.hashrate_stock_th,
            profile.hashrate_lux_th,
            format::usd(profile.monthly_invoicing_amount_usd),
            format::usd(profile.invoiced_amount_usd).yellow()
        );
    }

    Ok(())
}
