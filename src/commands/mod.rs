//! CLI command implementations
//!
//! Each command validates its inputs before any calculation runs:
//! - Invalid tenant configuration -> nothing is calculated
//! - Invalid override -> nothing is calculated
//! - Unreachable feed -> fallback constant, never an error

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub mod calc;
pub mod init;
pub mod invoiced;
pub mod market;
pub mod tenants;
pub mod validate;

/// Steady-ticking spinner for a step in progress
pub(crate) fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
