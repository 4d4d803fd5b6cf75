use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PurchasingPowerError;
use crate::types::{Money, Rate};
use crate::PurchasingPowerResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: Money,
    pub annual_rate: Rate,
    pub down_payment_fraction: Rate,
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub principal: Money,
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Longest loan term accepted anywhere in the crate (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
/// `None` when the product overflows.
pub(crate) fn compound(rate: Rate, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result.checked_mul(factor)?;
    }
    Some(result)
}

/// Standard fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1)
///
/// `monthly_rate` of zero amortises straight-line. Returns `None` for a
/// zero-length term or when the growth factor overflows.
pub fn monthly_mortgage_payment(
    principal: Money,
    monthly_rate: Rate,
    total_months: u32,
) -> Option<Money> {
    if total_months == 0 {
        return None;
    }
    if monthly_rate.is_zero() {
        return Some(principal / Decimal::from(total_months));
    }

    let growth = compound(monthly_rate, total_months)?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return None;
    }
    principal
        .checked_mul(monthly_rate)?
        .checked_mul(growth)?
        .checked_div(denominator)
}

/// Payment schedule totals for a purchase financed at the given terms.
pub fn amortization_summary(input: &MortgageInput) -> PurchasingPowerResult<AmortizationSummary> {
    if input.home_price.is_sign_negative() {
        return Err(PurchasingPowerError::InvalidInput {
            field: "home_price".into(),
            reason: "must not be negative".into(),
        });
    }
    if input.down_payment_fraction < Decimal::ZERO || input.down_payment_fraction >= Decimal::ONE {
        return Err(PurchasingPowerError::InvalidInput {
            field: "down_payment_fraction".into(),
            reason: "must be in [0, 1)".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO || input.annual_rate > Decimal::ONE {
        return Err(PurchasingPowerError::InvalidInput {
            field: "annual_rate".into(),
            reason: "must be a fraction in [0, 1]".into(),
        });
    }
    if input.term_months == 0 || input.term_months > MAX_TERM_MONTHS {
        return Err(PurchasingPowerError::InvalidInput {
            field: "term_months".into(),
            reason: format!("must be in 1..={MAX_TERM_MONTHS}"),
        });
    }

    let principal = input.home_price * (Decimal::ONE - input.down_payment_fraction);
    let monthly_rate = input.annual_rate / Decimal::from(12);
    let monthly_payment = monthly_mortgage_payment(principal, monthly_rate, input.term_months)
        .ok_or_else(|| PurchasingPowerError::InvalidInput {
            field: "home_price".into(),
            reason: "payment overflows decimal range".into(),
        })?;
    let total_paid = monthly_payment
        .checked_mul(Decimal::from(input.term_months))
        .ok_or_else(|| PurchasingPowerError::InvalidInput {
            field: "home_price".into(),
            reason: "total paid overflows decimal range".into(),
        })?;

    Ok(AmortizationSummary {
        principal,
        monthly_payment,
        total_paid,
        total_interest: total_paid - principal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_satisfies_annuity_identity() {
        let p = dec!(400000);
        let r = dec!(0.07) / dec!(12);
        let m = monthly_mortgage_payment(p, r, 360).unwrap();
        let growth = compound(r, 360).unwrap();
        let lhs = m * (growth - Decimal::ONE);
        let rhs = p * r * growth;
        assert!(((lhs - rhs) / rhs).abs() < dec!(0.000001));
    }

    #[test]
    fn test_known_payment_value() {
        // 400k at 7% over 30 years is about $2,661.21 per month
        let m = monthly_mortgage_payment(dec!(400000), dec!(0.07) / dec!(12), 360).unwrap();
        assert!((m - dec!(2661.21)).abs() < dec!(0.01), "got {m}");
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let m = monthly_mortgage_payment(dec!(360000), Decimal::ZERO, 360).unwrap();
        assert_eq!(m, dec!(1000));
    }

    #[test]
    fn test_zero_term_is_none() {
        assert!(monthly_mortgage_payment(dec!(1000), dec!(0.01), 0).is_none());
    }

    #[test]
    fn test_amortization_summary_totals() {
        let summary = amortization_summary(&MortgageInput {
            home_price: dec!(500000),
            annual_rate: dec!(0.07),
            down_payment_fraction: dec!(0.20),
            term_months: 360,
        })
        .unwrap();
        assert_eq!(summary.principal, dec!(400000));
        assert_eq!(summary.total_paid, summary.monthly_payment * dec!(360));
        assert!(summary.total_interest > summary.principal);
    }

    #[test]
    fn test_amortization_rejects_full_down_payment() {
        let result = amortization_summary(&MortgageInput {
            home_price: dec!(500000),
            annual_rate: dec!(0.07),
            down_payment_fraction: dec!(1),
            term_months: 360,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_overflowing_growth_is_none() {
        assert_eq!(compound(dec!(0.5), 20_000), None);
        assert!(monthly_mortgage_payment(dec!(400000), dec!(0.07) / dec!(12), 20_000).is_none());
    }

    #[test]
    fn test_summary_rejects_out_of_range_terms() {
        let input = |annual_rate, term_months| MortgageInput {
            home_price: dec!(500000),
            annual_rate,
            down_payment_fraction: dec!(0.20),
            term_months,
        };
        assert!(amortization_summary(&input(dec!(5), 360)).is_err());
        assert!(amortization_summary(&input(dec!(0.07), 20_000)).is_err());
        assert!(amortization_summary(&input(dec!(0.07), 0)).is_err());
        assert!(amortization_summary(&input(Decimal::ONE, MAX_TERM_MONTHS)).is_ok());
    }

    #[test]
    fn test_summary_huge_price_errors_instead_of_panicking() {
        let result = amortization_summary(&MortgageInput {
            home_price: Decimal::MAX,
            annual_rate: Decimal::ONE,
            down_payment_fraction: Decimal::ZERO,
            term_months: MAX_TERM_MONTHS,
        });
        assert!(result.is_err());
    }
}
