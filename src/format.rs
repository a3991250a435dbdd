//! Display formatting for calculator output

/// Glyph for a payback that never happens
pub const NEVER: &str = "∞";

/// Group an integer string with thousands separators
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `$1,234.56`, `-$14.20`
pub fn usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// `0.00010315 BTC`
pub fn btc(amount: f64) -> String {
    format!("{:.8} BTC", amount)
}

/// `2.5%`
pub fn percent(value: f64) -> String {
    format!("{}%", value)
}

/// `236 TH/s`
pub fn hashrate_th(value: f64) -> String {
    format!("{} TH/s", value)
}

/// Payback in months, or the infinity glyph
pub fn months(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}", value)
    } else {
        NEVER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_grouping() {
        assert_eq!(usd(0.0), "$0.00");
        assert_eq!(usd(199.0), "$199.00");
        assert_eq!(usd(3651.0), "$3,651.00");
        assert_eq!(usd(67953.35), "$67,953.35");
        assert_eq!(usd(1_250_000.5), "$1,250,000.50");
    }

    #[test]
    fn test_usd_negative() {
        assert_eq!(usd(-149.0), "-$149.00");
        assert_eq!(usd(-0.001), "$0.00");
    }

    #[test]
    fn test_months() {
        assert_eq!(months(31.82), "31.8");
        assert_eq!(months(0.0), "0.0");
        assert_eq!(months(f64::INFINITY), "∞");
    }

    #[test]
    fn test_small_units() {
        assert_eq!(btc(0.000103146927), "0.00010315 BTC");
        assert_eq!(percent(2.5), "2.5%");
        assert_eq!(hashrate_th(236.0), "236 TH/s");
    }
}
