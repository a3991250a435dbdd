//! Tenant profiles and the invoiced-amount default policy

use serde::{Deserialize, Serialize};

use crate::models::MiningAssumptions;

/// Invoiced amount shown to elevated users before any edit
pub const ADMIN_DEFAULT_INVOICED_AMOUNT_USD: f64 = 3850.0;

/// Caller role, as resolved by whatever authenticated the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Elevated: starts from the fixed default
    Admin,
    /// Standard: starts from the tenant's persisted value
    Client,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Client => write!(f, "client"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" | "elevated" => Ok(Role::Admin),
            "client" | "standard" => Ok(Role::Client),
            _ => Err(format!("Invalid role: {}. Use admin or client", s)),
        }
    }
}

/// Starting value for the editable invoiced amount
pub fn resolve_default_invoiced_amount(role: Role, persisted_value: f64) -> f64 {
    match role {
        Role::Admin => ADMIN_DEFAULT_INVOICED_AMOUNT_USD,
        Role::Client => persisted_value,
    }
}

/// Persisted per-tenant hosting assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantProfile {
    /// Display name
    pub name: String,

    /// Per-unit hosting fee (display only)
    pub hosting_charge_usd: f64,

    /// Monthly invoicing amount, deducted from revenue
    pub monthly_invoicing_amount_usd: f64,

    /// Miner power draw in kW (display only)
    pub power_consumption_kw: f64,

    /// Hardware list price (display only)
    pub machine_cost_usd: f64,

    pub pool_commission_percent: f64,

    pub hashrate_stock_th: f64,

    /// Hashrate on Lux firmware
    pub hashrate_lux_th: f64,

    pub breakeven_btc_price_usd: f64,

    /// Last saved invoiced amount
    #[serde(default = "default_invoiced_amount")]
    pub invoiced_amount_usd: f64,
}

fn default_invoiced_amount() -> f64 {
    ADMIN_DEFAULT_INVOICED_AMOUNT_USD
}

impl TenantProfile {
    /// The reference hosting tenant
    pub fn reference() -> Self {
        Self {
            name: "Reference Hosting".to_string(),
            hosting_charge_usd: 0.078,
            monthly_invoicing_amount_usd: 199.0,
            power_consumption_kw: 3.5,
            machine_cost_usd: 3651.0,
            pool_commission_percent: 2.5,
            hashrate_stock_th: 236.0,
            hashrate_lux_th: 270.0,
            breakeven_btc_price_usd: 58_000.0,
            invoiced_amount_usd: ADMIN_DEFAULT_INVOICED_AMOUNT_USD,
        }
    }

    /// Build the calculator input from this profile and a resolved invoiced amount
    pub fn assumptions(&self, invoiced_amount_usd: f64) -> MiningAssumptions {
        MiningAssumptions {
            hosting_charge_usd: self.hosting_charge_usd,
            monthly_hosting_cost_usd: self.monthly_invoicing_amount_usd,
            pool_commission_percent: self.pool_commission_percent,
            hashrate_stock_th: self.hashrate_stock_th,
            hashrate_alt_firmware_th: self.hashrate_lux_th,
            breakeven_btc_price_usd: self.breakeven_btc_price_usd,
            capital_cost_usd: MiningAssumptions::capital_cost_from(
                invoiced_amount_usd,
                self.monthly_invoicing_amount_usd,
            ),
        }
    }

    /// Monthly energy use at 24h/day over a 365/12-day month
    pub fn monthly_energy_kwh(&self) -> f64 {
        self.power_consumption_kw * 24.0 * 365.0 / 12.0
    }
}
