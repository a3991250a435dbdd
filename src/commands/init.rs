//! Init command - write the default configuration

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use crate::commands::spinner;
use crate::config::{self, Config, DEFAULT_TENANT};

pub async fn execute(force: bool) -> Result<()> {
    println!("{}", "Initializing hostcalc".cyan().bold());
    println!();

    let path = config::get_config_path()?;
    println!("  {} {}", "Config:".bright_black(), path.display());
    println!();

    if path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt("Config already exists. Overwrite with defaults?")
            .default(false)
            .interact()?;

        if !overwrite {
            println!("{}", "Keeping existing configuration".yellow());
            return Ok(());
        }
    }

    let pb = spinner("Saving configuration...")?;
    let config = Config::new();
    config::save_config(&config)?;
    pb.finish_with_message(format!("{} Config saved", "✓".green()));

    // Summary
    println!();
    println!("{}", "Configuration Initialized".green().bold());
    println!();
    println!(
        "  {}",
        format!("Tenant: {}", DEFAULT_TENANT.cyan())
    );
    println!(
        "  {}",
        format!("Price feed: {}", config.feeds.price_api).bright_black()
    );
    println!();
    println!("  {}", "Next:".yellow());
    println!("    {}", "hostcalc calc       # Payback analysis".bright_black());
    println!("    {}", "hostcalc market     # Live market data".bright_black());
    println!(
        "    {}",
        "Edit [feeds] hashprice_url to enable the live pool reward".bright_black()
    );
    println!();

    Ok(())
}
