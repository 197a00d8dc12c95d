//! Plan tier model.
//!
//! Plans are configuration, not database rows: they are read from the
//! catalog file at startup and never change while the process runs.

use rust_decimal::Decimal;
use serde::Deserialize;

/// One plan tier.
///
/// # JSON Example
///
/// ```json
/// {
///   "key": "plan_2",
///   "title": "Second plan",
///   "equity_range": "$1,000 - $4,999",
///   "daily_rate_bps": 100,
///   "deposit_cents": 100000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Plan {
    /// Stable identifier stored on accounts and used in button data
    pub key: String,

    pub title: String,

    /// Free-form principal range shown to users
    pub equity_range: String,

    /// Daily profit rate in basis points (100 bp = 1 %)
    pub daily_rate_bps: i64,

    /// Deposit recorded when a transaction for this plan is accepted
    pub deposit_cents: i64,
}

impl Plan {
    /// Daily rate as a fraction, e.g. `0.3` for 3000 bp.
    pub fn rate(&self) -> Decimal {
        Decimal::new(self.daily_rate_bps, 4).normalize()
    }

    /// Principal recorded for this plan, in dollars.
    pub fn deposit(&self) -> Decimal {
        Decimal::new(self.deposit_cents, 2)
    }

    /// Daily rate as a percentage string without trailing zeros, e.g. `"2.5"`.
    pub fn daily_percent(&self) -> String {
        let whole = self.daily_rate_bps / 100;
        let fraction = self.daily_rate_bps % 100;
        if fraction == 0 {
            whole.to_string()
        } else {
            format!("{whole}.{fraction:02}").trim_end_matches('0').to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(bps: i64) -> Plan {
        Plan {
            key: "p".to_string(),
            title: "P".to_string(),
            equity_range: "any".to_string(),
            daily_rate_bps: bps,
            deposit_cents: 0,
        }
    }

    #[test]
    fn percent_drops_trailing_zeros() {
        assert_eq!(plan(3000).daily_percent(), "30");
        assert_eq!(plan(250).daily_percent(), "2.5");
        assert_eq!(plan(5).daily_percent(), "0.05");
    }

    #[test]
    fn rate_and_deposit_as_decimals() {
        let mut plan = plan(50);
        plan.deposit_cents = 100_050;

        assert_eq!(plan.rate(), Decimal::new(5, 3));
        assert_eq!(plan.deposit(), Decimal::new(100_050, 2));
        assert_eq!(plan.deposit().to_string(), "1000.50");
    }
}
