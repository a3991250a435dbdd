//! Hostcalc - Mining hosting payback calculator
//!
//! Projects monthly revenue and hardware payback for hosted Bitcoin miners
//! across a fixed set of BTC price scenarios, on stock and Lux firmware,
//! using live market data with hardcoded fallbacks.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod config;
mod economics;
mod format;
mod market;
mod models;
mod tenant;
mod validation;

use commands::{calc, init, invoiced, tenants, validate};
use market::MarketOverrides;

/// Hostcalc - Mining hosting payback calculator
#[derive(Parser)]
#[command(name = "hostcalc")]
#[command(author = "SudoHash LLC")]
#[command(version)]
#[command(about = "Payback and ROI analysis for hosted Bitcoin miners", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Tenant id from the config file
    #[arg(long, global = true, env = "HOSTCALC_TENANT", default_value = config::DEFAULT_TENANT)]
    tenant: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration
    Init {
        /// Overwrite an existing config without asking
        #[arg(long)]
        force: bool,
    },

    /// Run the payback analysis for a tenant
    Calc {
        /// Caller role: admin (fixed default invoice) or client (saved invoice)
        #[arg(long, default_value = "client")]
        role: String,

        /// Invoiced amount in USD (overrides the role default)
        #[arg(long)]
        invoiced: Option<f64>,

        #[command(flatten)]
        market: MarketArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the market data the calculator would use
    Market {
        #[command(flatten)]
        market: MarketArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save the invoiced amount for a tenant
    SetInvoiced {
        /// Invoiced amount in USD
        #[arg(long)]
        amount: f64,

        #[command(flatten)]
        market: MarketArgs,
    },

    /// List configured tenants
    Tenants {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a tenant configuration
    Validate,

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(clap::Args)]
struct MarketArgs {
    /// BTC price in USD (skips the price feed)
    #[arg(long)]
    btc_price: Option<f64>,

    /// Pool reward in BTC per PH/s per day (skips the hashprice feed)
    #[arg(long)]
    reward: Option<f64>,

    /// Use fallback constants instead of live feeds
    #[arg(long)]
    offline: bool,
}

impl From<MarketArgs> for MarketOverrides {
    fn from(args: MarketArgs) -> Self {
        Self {
            btc_price_usd: args.btc_price,
            reward_btc_per_ph_day: args.reward,
            offline: args.offline,
        }
    }
}

impl Commands {
    /// Output meant for other programs gets no banner
    fn is_machine_readable(&self) -> bool {
        match self {
            Commands::Calc { json, .. }
            | Commands::Market { json, .. }
            | Commands::Tenants { json } => *json,
            Commands::Config { path } => *path,
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // RUST_LOG wins when set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !cli.command.is_machine_readable() {
        print_banner();
    }

    match cli.command {
        Commands::Init { force } => {
            init::execute(force).await?;
        }

        Commands::Calc {
            role,
            invoiced,
            market,
            json,
        } => {
            calc::execute(&cli.tenant, role, invoiced, market.into(), json).await?;
        }

        Commands::Market { market, json } => {
            commands::market::execute(market.into(), json).await?;
        }

        Commands::SetInvoiced { amount, market } => {
            invoiced::execute(&cli.tenant, amount, market.into()).await?;
        }

        Commands::Tenants { json } => {
            tenants::execute(json).await?;
        }

        Commands::Validate => {
            validate::execute(&cli.tenant).await?;
        }

        Commands::Config { path } => {
            let config_path = config::get_config_path()?;
            if path {
                println!("{}", config_path.display());
            } else {
                println!("Config file: {}", config_path.display());
                if config_path.exists() {
                    let config = config::load_config()?;
                    println!("\n{}", toml::to_string_pretty(&config)?);
                } else {
                    println!("(not created yet - run 'hostcalc init' first)");
                }
            }
        }
    }

    Ok(())
}

fn print_banner() {
    println!("{}", "  ₿ hostcalc".cyan().bold());
    println!(
        "{}",
        "  Hosted mining payback calculator".bright_black()
    );
    println!();
}
