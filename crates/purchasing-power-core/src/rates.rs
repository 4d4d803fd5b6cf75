//! Rate tables and national constants consumed by the pipeline.
//!
//! Everything in here is configuration data. The pipeline reads it through the
//! [`RateProvider`] trait so a caller can swap in updated tables (loaded from
//! JSON or YAML) without rebuilding the computation core.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PurchasingPowerError;
use crate::mortgage::MAX_TERM_MONTHS;
use crate::types::{Money, Rate};
use crate::PurchasingPowerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of the federal effective-rate table.
///
/// `rate` is an effective rate applied to the whole taxable income, not a
/// marginal bracket rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederalBracket {
    pub threshold: Money,
    pub rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTaxRate {
    pub name: String,
    /// USPS two-letter code.
    pub code: String,
    pub rate: Rate,
}

/// National reference values every baseline is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalBaselines {
    pub median_household_income: Money,
    pub per_capita_disposable_income: Money,
    pub default_retiree_income: Money,
    pub median_home_price: Money,
    pub average_property_tax_rate: Rate,
    /// Mortgage principal and interest plus property tax on a median home.
    pub average_monthly_housing_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageDefaults {
    pub annual_rate: Rate,
    pub down_payment_fraction: Rate,
    pub term_months: u32,
}

/// Unsourced business approximations, kept configurable and labeled as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Share of today's median price assumed as a long-tenured owner's basis.
    pub historical_purchase_factor: Rate,
    /// Income at which the state progressivity factor is exactly 1.
    pub progressivity_reference_income: Money,
    pub progressivity_cap: Decimal,
    /// Ceiling applied to a profile's pre-computed effective rate.
    pub effective_rate_cap: Rate,
}

/// Complete set of tables for one tax year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTables {
    pub tax_year: i32,
    pub effective_date: NaiveDate,
    pub standard_deduction: Money,
    pub federal_brackets: Vec<FederalBracket>,
    pub states: Vec<StateTaxRate>,
    /// Blended state rate used when a jurisdiction is unknown.
    pub average_state_rate: Rate,
    /// Combined federal+state rate used when nothing else is known.
    pub average_combined_rate: Rate,
    pub national: NationalBaselines,
    pub mortgage: MortgageDefaults,
    pub heuristics: Heuristics,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

pub trait RateProvider: Send + Sync {
    fn tax_year(&self) -> i32;
    fn standard_deduction(&self) -> Money;
    /// Ordered by ascending threshold.
    fn federal_brackets(&self) -> &[FederalBracket];
    /// Look up a jurisdiction by full name or USPS code.
    fn state_rate(&self, jurisdiction: &str) -> Option<&StateTaxRate>;
    fn average_state_rate(&self) -> Rate;
    fn average_combined_rate(&self) -> Rate;
    fn national(&self) -> &NationalBaselines;
    fn mortgage(&self) -> &MortgageDefaults;
    fn heuristics(&self) -> &Heuristics;
}

impl RateProvider for RateTables {
    fn tax_year(&self) -> i32 {
        self.tax_year
    }

    fn standard_deduction(&self) -> Money {
        self.standard_deduction
    }

    fn federal_brackets(&self) -> &[FederalBracket] {
        &self.federal_brackets
    }

    fn state_rate(&self, jurisdiction: &str) -> Option<&StateTaxRate> {
        let needle = jurisdiction.trim();
        if needle.is_empty() {
            return None;
        }
        self.states.iter().find(|s| {
            s.name.eq_ignore_ascii_case(needle) || s.code.eq_ignore_ascii_case(needle)
        })
    }

    fn average_state_rate(&self) -> Rate {
        self.average_state_rate
    }

    fn average_combined_rate(&self) -> Rate {
        self.average_combined_rate
    }

    fn national(&self) -> &NationalBaselines {
        &self.national
    }

    fn mortgage(&self) -> &MortgageDefaults {
        &self.mortgage
    }

    fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl RateTables {
    pub fn from_json_str(s: &str) -> PurchasingPowerResult<Self> {
        let tables: RateTables = serde_json::from_str(s)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn from_yaml_str(s: &str) -> PurchasingPowerResult<Self> {
        let tables: RateTables = serde_yaml::from_str(s)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> PurchasingPowerResult<()> {
        if self.federal_brackets.is_empty() {
            return Err(PurchasingPowerError::InvalidRateTable(
                "federal_brackets must not be empty".into(),
            ));
        }
        for pair in self.federal_brackets.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(PurchasingPowerError::InvalidRateTable(format!(
                    "federal thresholds must be strictly ascending ({} then {})",
                    pair[0].threshold, pair[1].threshold
                )));
            }
        }

        let mut rates: Vec<(String, Rate)> = self
            .federal_brackets
            .iter()
            .map(|b| (format!("federal bracket {}", b.threshold), b.rate))
            .collect();
        rates.extend(self.states.iter().map(|s| (format!("state {}", s.name), s.rate)));
        rates.push(("average_state_rate".into(), self.average_state_rate));
        rates.push(("average_combined_rate".into(), self.average_combined_rate));
        rates.push((
            "national.average_property_tax_rate".into(),
            self.national.average_property_tax_rate,
        ));
        rates.push(("mortgage.annual_rate".into(), self.mortgage.annual_rate));
        rates.push((
            "heuristics.effective_rate_cap".into(),
            self.heuristics.effective_rate_cap,
        ));
        for (label, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(PurchasingPowerError::InvalidRateTable(format!(
                    "{label} must be a fraction in [0, 1], got {rate}"
                )));
            }
        }

        let dp = self.mortgage.down_payment_fraction;
        if dp < Decimal::ZERO || dp >= Decimal::ONE {
            return Err(PurchasingPowerError::InvalidRateTable(
                "mortgage.down_payment_fraction must be in [0, 1)".into(),
            ));
        }
        if self.mortgage.term_months == 0 || self.mortgage.term_months > MAX_TERM_MONTHS {
            return Err(PurchasingPowerError::InvalidRateTable(format!(
                "mortgage.term_months must be in 1..={MAX_TERM_MONTHS}"
            )));
        }

        let positives = [
            ("national.average_monthly_housing_cost", self.national.average_monthly_housing_cost),
            ("heuristics.progressivity_reference_income", self.heuristics.progressivity_reference_income),
            ("heuristics.progressivity_cap", self.heuristics.progressivity_cap),
            ("heuristics.historical_purchase_factor", self.heuristics.historical_purchase_factor),
        ];
        for (label, value) in positives {
            if value <= Decimal::ZERO {
                return Err(PurchasingPowerError::InvalidRateTable(format!(
                    "{label} must be > 0"
                )));
            }
        }

        // Federal tax never exceeds the top federal rate on gross income and
        // the state rate is scaled by at most the progressivity cap.
        let top_federal = self
            .federal_brackets
            .iter()
            .map(|b| b.rate)
            .max()
            .unwrap_or(Decimal::ZERO);
        let top_state = self
            .states
            .iter()
            .map(|s| s.rate)
            .chain(std::iter::once(self.average_state_rate))
            .max()
            .unwrap_or(Decimal::ZERO);
        let ceiling = top_federal + top_state * self.heuristics.progressivity_cap;
        if ceiling > Decimal::ONE {
            return Err(PurchasingPowerError::InvalidRateTable(format!(
                "top federal rate plus top state rate x progressivity_cap must not exceed 1, got {ceiling}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

impl Default for RateTables {
    fn default() -> Self {
        RateTables {
            tax_year: 2024,
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            standard_deduction: dec!(14_600),
            federal_brackets: default_federal_brackets(),
            states: default_state_rates(),
            average_state_rate: dec!(0.044),
            average_combined_rate: dec!(0.15),
            national: NationalBaselines {
                median_household_income: dec!(74_580),
                per_capita_disposable_income: dec!(60_210),
                default_retiree_income: dec!(50_000),
                median_home_price: dec!(412_300),
                average_property_tax_rate: dec!(0.0102),
                average_monthly_housing_cost: dec!(2_545),
            },
            mortgage: MortgageDefaults {
                annual_rate: dec!(0.07),
                down_payment_fraction: dec!(0.20),
                term_months: 360,
            },
            heuristics: Heuristics {
                historical_purchase_factor: dec!(0.60),
                progressivity_reference_income: dec!(74_580),
                progressivity_cap: dec!(1.5),
                effective_rate_cap: dec!(0.25),
            },
        }
    }
}

fn default_federal_brackets() -> Vec<FederalBracket> {
    [
        (dec!(11_600), dec!(0.10)),
        (dec!(47_150), dec!(0.11)),
        (dec!(100_525), dec!(0.13)),
        (dec!(191_950), dec!(0.17)),
        (dec!(243_725), dec!(0.21)),
        (dec!(609_350), dec!(0.27)),
        (dec!(1_000_000), dec!(0.33)),
    ]
    .into_iter()
    .map(|(threshold, rate)| FederalBracket { threshold, rate })
    .collect()
}

fn default_state_rates() -> Vec<StateTaxRate> {
    [
        ("Alabama", "AL", dec!(0.040)),
        ("Alaska", "AK", dec!(0)),
        ("Arizona", "AZ", dec!(0.025)),
        ("Arkansas", "AR", dec!(0.039)),
        ("California", "CA", dec!(0.060)),
        ("Colorado", "CO", dec!(0.044)),
        ("Connecticut", "CT", dec!(0.050)),
        ("Delaware", "DE", dec!(0.052)),
        ("District of Columbia", "DC", dec!(0.060)),
        ("Florida", "FL", dec!(0)),
        ("Georgia", "GA", dec!(0.0549)),
        ("Hawaii", "HI", dec!(0.068)),
        ("Idaho", "ID", dec!(0.058)),
        ("Illinois", "IL", dec!(0.0495)),
        ("Indiana", "IN", dec!(0.0305)),
        ("Iowa", "IA", dec!(0.044)),
        ("Kansas", "KS", dec!(0.050)),
        ("Kentucky", "KY", dec!(0.040)),
        ("Louisiana", "LA", dec!(0.035)),
        ("Maine", "ME", dec!(0.058)),
        ("Maryland", "MD", dec!(0.0475)),
        ("Massachusetts", "MA", dec!(0.050)),
        ("Michigan", "MI", dec!(0.0425)),
        ("Minnesota", "MN", dec!(0.060)),
        ("Mississippi", "MS", dec!(0.047)),
        ("Missouri", "MO", dec!(0.045)),
        ("Montana", "MT", dec!(0.055)),
        ("Nebraska", "NE", dec!(0.052)),
        ("Nevada", "NV", dec!(0)),
        ("New Hampshire", "NH", dec!(0)),
        ("New Jersey", "NJ", dec!(0.050)),
        ("New Mexico", "NM", dec!(0.040)),
        ("New York", "NY", dec!(0.060)),
        ("North Carolina", "NC", dec!(0.045)),
        ("North Dakota", "ND", dec!(0.015)),
        ("Ohio", "OH", dec!(0.035)),
        ("Oklahoma", "OK", dec!(0.0425)),
        ("Oregon", "OR", dec!(0.080)),
        ("Pennsylvania", "PA", dec!(0.0307)),
        ("Rhode Island", "RI", dec!(0.045)),
        ("South Carolina", "SC", dec!(0.050)),
        ("South Dakota", "SD", dec!(0)),
        ("Tennessee", "TN", dec!(0)),
        ("Texas", "TX", dec!(0)),
        ("Utah", "UT", dec!(0.0465)),
        ("Vermont", "VT", dec!(0.055)),
        ("Virginia", "VA", dec!(0.050)),
        ("Washington", "WA", dec!(0)),
        ("West Virginia", "WV", dec!(0.045)),
        ("Wisconsin", "WI", dec!(0.050)),
        ("Wyoming", "WY", dec!(0)),
    ]
    .into_iter()
    .map(|(name, code, rate)| StateTaxRate {
        name: name.to_string(),
        code: code.to_string(),
        rate,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_validate() {
        assert!(RateTables::default().validate().is_ok());
    }

    #[test]
    fn test_state_lookup_by_name_and_code() {
        let tables = RateTables::default();
        let by_name = tables.state_rate("  new york ").unwrap();
        let by_code = tables.state_rate("ny").unwrap();
        assert_eq!(by_name, by_code);
        assert_eq!(by_name.rate, dec!(0.060));
        assert!(tables.state_rate("").is_none());
        assert!(tables.state_rate("Atlantis").is_none());
    }

    #[test]
    fn test_no_income_tax_states_are_zero() {
        let tables = RateTables::default();
        for code in ["AK", "FL", "NV", "NH", "SD", "TN", "TX", "WA", "WY"] {
            assert_eq!(tables.state_rate(code).unwrap().rate, Decimal::ZERO, "{code}");
        }
    }

    #[test]
    fn test_every_jurisdiction_present_once() {
        let tables = RateTables::default();
        assert_eq!(tables.states.len(), 51);
    }

    #[test]
    fn test_unsorted_brackets_rejected() {
        let mut tables = RateTables::default();
        tables.federal_brackets.swap(0, 1);
        assert!(matches!(
            tables.validate(),
            Err(PurchasingPowerError::InvalidRateTable(_))
        ));
    }

    #[test]
    fn test_percentage_rate_rejected() {
        let mut tables = RateTables::default();
        tables.states[0].rate = dec!(4.0);
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_tables() {
        let tables = RateTables::default();
        let json = serde_json::to_string(&tables).unwrap();
        let loaded = RateTables::from_json_str(&json).unwrap();
        assert_eq!(loaded, tables);
    }

    #[test]
    fn test_yaml_override_loads() {
        let mut tables = RateTables::default();
        tables.average_state_rate = dec!(0.05);
        let yaml = serde_yaml::to_string(&tables).unwrap();
        let loaded = RateTables::from_yaml_str(&yaml).unwrap();
        assert_eq!(loaded.average_state_rate, dec!(0.05));
    }

    #[test]
    fn test_term_months_bounded() {
        let mut tables = RateTables::default();
        tables.mortgage.term_months = 20_000;
        assert!(tables.validate().is_err());
        tables.mortgage.term_months = MAX_TERM_MONTHS;
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_combined_rate_ceiling_enforced() {
        let mut tables = RateTables::default();
        tables.heuristics.progressivity_cap = dec!(20);
        assert!(matches!(
            tables.validate(),
            Err(PurchasingPowerError::InvalidRateTable(msg)) if msg.contains("progressivity_cap")
        ));
    }

    #[test]
    fn test_moderate_progressivity_cap_still_validates() {
        // 0.33 + 0.08 * 2 = 0.49
        let mut tables = RateTables::default();
        tables.heuristics.progressivity_cap = dec!(2);
        assert!(tables.validate().is_ok());
    }
}
