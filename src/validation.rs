//! Input validation for the calculator
//!
//! The economics core trusts its inputs. Everything it consumes is checked
//! here first, and bad input never reaches a calculation.

use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::MarketSnapshot;
use crate::tenant::TenantProfile;

/// Tenant ids: lowercase slug
const TENANT_ID_PATTERN: &str = "^[a-z0-9][a-z0-9_-]*$";

fn tenant_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TENANT_ID_PATTERN).expect("tenant id pattern is valid"))
}

/// Validation result
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn check_finite(errors: &mut Vec<String>, field: &str, value: f64) -> bool {
    if value.is_finite() {
        true
    } else {
        errors.push(format!("Field '{}' must be a finite number, got {}", field, value));
        false
    }
}

fn check_non_negative(errors: &mut Vec<String>, field: &str, value: f64) {
    if check_finite(errors, field, value) && value < 0.0 {
        errors.push(format!("Field '{}' must be >= 0, got {}", field, value));
    }
}

fn check_positive(errors: &mut Vec<String>, field: &str, value: f64) {
    if check_finite(errors, field, value) && value <= 0.0 {
        errors.push(format!("Field '{}' must be > 0, got {}", field, value));
    }
}

/// Validate a tenant id and profile before it feeds a calculation
pub fn validate_tenant(id: &str, profile: &TenantProfile) -> ValidationResult {
    let mut errors = Vec::new();

    if !tenant_id_regex().is_match(id) {
        errors.push(format!(
            "Tenant id '{}' does not match pattern '{}'",
            id, TENANT_ID_PATTERN
        ));
    }

    if profile.name.trim().is_empty() {
        errors.push("Field 'name' must not be empty".to_string());
    }

    let commission = profile.pool_commission_percent;
    if check_finite(&mut errors, "pool_commission_percent", commission)
        && !(0.0..100.0).contains(&commission)
    {
        errors.push(format!(
            "Field 'pool_commission_percent' must be in [0, 100), got {}",
            commission
        ));
    }

    check_non_negative(&mut errors, "hosting_charge_usd", profile.hosting_charge_usd);
    check_non_negative(
        &mut errors,
        "monthly_invoicing_amount_usd",
        profile.monthly_invoicing_amount_usd,
    );
    check_non_negative(&mut errors, "power_consumption_kw", profile.power_consumption_kw);
    check_non_negative(&mut errors, "machine_cost_usd", profile.machine_cost_usd);
    check_non_negative(&mut errors, "hashrate_stock_th", profile.hashrate_stock_th);
    check_non_negative(&mut errors, "hashrate_lux_th", profile.hashrate_lux_th);
    check_non_negative(&mut errors, "invoiced_amount_usd", profile.invoiced_amount_usd);
    check_positive(
        &mut errors,
        "breakeven_btc_price_usd",
        profile.breakeven_btc_price_usd,
    );

    ValidationResult::errors(errors)
}

/// Validate an operator-supplied invoiced amount
pub fn validate_invoiced_amount(amount: f64) -> ValidationResult {
    let mut errors = Vec::new();
    check_non_negative(&mut errors, "invoiced_amount_usd", amount);
    ValidationResult::errors(errors)
}

/// Validate market inputs (live, fallback or manual)
pub fn validate_market(snapshot: &MarketSnapshot) -> ValidationResult {
    let mut errors = Vec::new();
    check_positive(&mut errors, "btc_price_usd", snapshot.btc_price_usd);
    check_non_negative(
        &mut errors,
        "reward_btc_per_ph_day",
        snapshot.reward_btc_per_ph_day,
    );
    ValidationResult::errors(errors)
}

/// Turn a failed validation into an error listing every problem
pub fn ensure_valid(result: ValidationResult) -> Result<()> {
    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Validation failed:\n  - {}", result.errors.join("\n  - "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_tenant_is_valid() {
        let result = validate_tenant("reference", &TenantProfile::reference());
        assert!(result.valid, "Errors: {:?}", result.errors);
    }

    #[test]
    fn test_bad_tenant_id() {
        let result = validate_tenant("Acme Hosting", &TenantProfile::reference());
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("pattern")));
    }

    #[test]
    fn test_commission_out_of_range() {
        for commission in [100.0, 150.0, -1.0] {
            let mut profile = TenantProfile::reference();
            profile.pool_commission_percent = commission;

            let result = validate_tenant("reference", &profile);
            assert!(!result.valid);
            assert!(result
                .errors
                .iter()
                .any(|e| e.contains("pool_commission_percent")));
        }
    }

    #[test]
    fn test_collects_every_error() {
        let mut profile = TenantProfile::reference();
        profile.hashrate_stock_th = -1.0;
        profile.hashrate_lux_th = f64::NAN;
        profile.breakeven_btc_price_usd = 0.0;

        let result = validate_tenant("reference", &profile);
        assert_eq!(result.errors.len(), 3, "Errors: {:?}", result.errors);
    }

    #[test]
    fn test_market_validation() {
        let mut snapshot = MarketSnapshot::fallback();
        assert!(validate_market(&snapshot).valid);

        snapshot.btc_price_usd = 0.0;
        snapshot.reward_btc_per_ph_day = f64::INFINITY;
        assert_eq!(validate_market(&snapshot).errors.len(), 2);
    }

    #[test]
    fn test_ensure_valid_lists_errors() {
        let err = ensure_valid(validate_invoiced_amount(-5.0)).unwrap_err();
        assert!(err.to_string().contains("invoiced_amount_usd"));
        assert!(ensure_valid(validate_invoiced_amount(3850.0)).is_ok());
    }
}
