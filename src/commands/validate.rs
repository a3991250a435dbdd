//! Validate command - check a tenant configuration
//!
//! Invalid tenants are never fed to the calculator.

use anyhow::Result;
use colored::Colorize;

use crate::config;
use crate::validation;

pub async fn execute(tenant_id: &str) -> Result<()> {
    println!("{}", "Validating Tenant".cyan().bold());
    println!();

    let config = config::load_config()?;
    let profile = config.tenant(tenant_id)?;

    println!("  {} {}", "Tenant:".bright_black(), tenant_id);
    println!("  {} {}", "Name:".bright_black(), profile.name);
    println!();

    let result = validation::validate_tenant(tenant_id, profile);

    if result.valid {
        println!("{}", "✅ VALID".green().bold());
        println!();
        println!("  {}", "Tenant configuration is safe to calculate with.".bright_black());
    } else {
        println!("{}", "❌ INVALID".red().bold());
        println!();
        println!("  {}", "Validation errors:".yellow());
        for error in &result.errors {
            println!("    {} {}", "•".red(), error);
        }
        println!();
        println!("  {}", "Fix these errors in the config file.".bright_black());

        // Return error to set exit code
        anyhow::bail!("Tenant validation failed");
    }

    Ok(())
}
