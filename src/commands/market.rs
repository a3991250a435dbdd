//! Market command - show the BTC price and pool reward in use

use anyhow::Result;
use colored::Colorize;

use crate::commands::spinner;
use crate::config::{self, FeedConfig};
use crate::format;
use crate::market::{MarketClient, MarketOverrides};
use crate::models::{DataSource, MarketSnapshot};
use crate::validation;

pub async fn execute(overrides: MarketOverrides, json: bool) -> Result<()> {
    let config = config::load_config()?;
    let snapshot = fetch_snapshot(&config.feeds, overrides, json).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", "Market Snapshot".cyan().bold());
    println!();
    print_snapshot(&snapshot);

    if config.feeds.hashprice_url.is_none() && snapshot.reward_source == DataSource::Fallback {
        println!();
        println!(
            "  {}",
            "No hashprice_url configured under [feeds]; pool reward is the fallback constant."
                .bright_black()
        );
    }

    Ok(())
}

/// Fetch and validate a snapshot, with a spinner unless `quiet`
pub(crate) async fn fetch_snapshot(
    feeds: &FeedConfig,
    overrides: MarketOverrides,
    quiet: bool,
) -> Result<MarketSnapshot> {
    let client = MarketClient::new(feeds)?;

    let snapshot = if quiet {
        client.snapshot(overrides).await
    } else {
        let pb = spinner("Fetching market data...")?;
        let snapshot = client.snapshot(overrides).await;
        pb.finish_with_message(format!("{} Market data ready", "✓".green()));
        println!();
        snapshot
    };

    validation::ensure_valid(validation::validate_market(&snapshot))?;
    Ok(snapshot)
}

pub(crate) fn print_snapshot(snapshot: &MarketSnapshot) {
    println!(
        "  {} {} {}",
        "BTC Price:".bright_black(),
        format::usd(snapshot.btc_price_usd).green(),
        source_badge(snapshot.price_source)
    );
    println!(
        "  {} {} {}",
        "Pool Reward:".bright_black(),
        format!("{} / PH / day", format::btc(snapshot.reward_btc_per_ph_day)).green(),
        source_badge(snapshot.reward_source)
    );
    println!(
        "  {} {}",
        "As of:".bright_black(),
        snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );
}

fn source_badge(source: DataSource) -> colored::ColoredString {
    match source {
        DataSource::Live => "(live)".bright_black(),
        DataSource::Fallback => "(fallback)".yellow(),
        DataSource::Manual => "(manual)".blue(),
    }
}
