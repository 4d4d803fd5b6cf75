use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::rates::RateProvider;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Federal and state income tax on one gross income.
///
/// Both components use effective rates over the whole base, which keeps the
/// model a comparison tool rather than a filing calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeTax {
    pub gross_income: Money,
    pub taxable_income: Money,
    pub federal_rate: Rate,
    pub federal_tax: Money,
    /// State table rate after progressivity scaling.
    pub state_rate: Rate,
    pub state_tax: Money,
    pub combined_effective_rate: Rate,
    /// Canonical jurisdiction name when the lookup matched.
    pub jurisdiction: Option<String>,
    pub jurisdiction_matched: bool,
}

impl IncomeTax {
    pub fn total_tax(&self) -> Money {
        self.federal_tax + self.state_tax
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Tax on `gross_income` earned in `jurisdiction`.
///
/// An unknown or blank jurisdiction is taxed at the provider's average state
/// rate instead of failing, so a usable estimate always exists.
pub fn calculate_income_tax(
    gross_income: Money,
    jurisdiction: Option<&str>,
    rates: &dyn RateProvider,
) -> IncomeTax {
    let requested = jurisdiction.map(str::trim).filter(|j| !j.is_empty());
    let matched = requested.and_then(|j| rates.state_rate(j));

    if matched.is_none() {
        if let Some(j) = requested {
            warn!(jurisdiction = j, "unknown jurisdiction, using average state rate");
        }
    }

    let (table_rate, name) = match matched {
        Some(state) => (state.rate, Some(state.name.clone())),
        None => (rates.average_state_rate(), None),
    };
    build_income_tax(gross_income, table_rate, name, rates)
}

/// Tax on `gross_income` at the national reference (average) jurisdiction.
///
/// Baselines use this so that local tax differences are the only variable.
pub fn national_reference_tax(gross_income: Money, rates: &dyn RateProvider) -> IncomeTax {
    build_income_tax(gross_income, rates.average_state_rate(), None, rates)
}

/// Effective federal rate on taxable income: the first row whose threshold
/// is not exceeded, or the highest rate above every threshold.
pub fn federal_effective_rate(taxable_income: Money, rates: &dyn RateProvider) -> Rate {
    let brackets = rates.federal_brackets();
    brackets
        .iter()
        .find(|b| taxable_income <= b.threshold)
        .map(|b| b.rate)
        .unwrap_or_else(|| {
            brackets
                .iter()
                .map(|b| b.rate)
                .max()
                .unwrap_or(Decimal::ZERO)
        })
}

/// `min(cap, sqrt(income / reference))`: scales the flat state rate up for
/// high earners and down for low earners.
pub fn progressivity_factor(gross_income: Money, rates: &dyn RateProvider) -> Decimal {
    let heuristics = rates.heuristics();
    if heuristics.progressivity_reference_income <= Decimal::ZERO || gross_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let ratio = gross_income / heuristics.progressivity_reference_income;
    ratio
        .sqrt()
        .unwrap_or(Decimal::ZERO)
        .min(heuristics.progressivity_cap)
}

fn build_income_tax(
    gross_income: Money,
    table_rate: Rate,
    jurisdiction: Option<String>,
    rates: &dyn RateProvider,
) -> IncomeTax {
    let gross = gross_income.max(Decimal::ZERO);

    let taxable_income = (gross - rates.standard_deduction()).max(Decimal::ZERO);
    let federal_rate = federal_effective_rate(taxable_income, rates);
    let federal_tax = taxable_income * federal_rate;

    let state_rate = table_rate * progressivity_factor(gross, rates);
    let state_tax = gross * state_rate;

    let combined_effective_rate = if gross.is_zero() {
        Decimal::ZERO
    } else {
        (federal_tax + state_tax) / gross
    };

    IncomeTax {
        gross_income: gross,
        taxable_income,
        federal_rate,
        federal_tax,
        state_rate,
        state_tax,
        combined_effective_rate,
        jurisdiction_matched: jurisdiction.is_some(),
        jurisdiction,
    }
}
