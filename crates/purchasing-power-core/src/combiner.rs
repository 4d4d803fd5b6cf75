use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::housing::HousingAdjustment;
use crate::income::{IncomeSelection, TaxBreakdown};
use crate::property_tax::PropertyTaxEstimate;
use crate::types::{round_one_dp, round_whole, IndexValue, Money, Rate};

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxBurdenRating {
    Low,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostOfLivingRating {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverallValueRating {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

/// `<12%` low, `<15%` moderate, `<18%` high, else very high.
pub fn rate_tax_burden(effective_rate: Rate) -> TaxBurdenRating {
    if effective_rate < dec!(0.12) {
        TaxBurdenRating::Low
    } else if effective_rate < dec!(0.15) {
        TaxBurdenRating::Moderate
    } else if effective_rate < dec!(0.18) {
        TaxBurdenRating::High
    } else {
        TaxBurdenRating::VeryHigh
    }
}

pub fn rate_cost_of_living(adjusted_cost_index: IndexValue) -> CostOfLivingRating {
    if adjusted_cost_index < dec!(90) {
        CostOfLivingRating::VeryLow
    } else if adjusted_cost_index < dec!(97) {
        CostOfLivingRating::Low
    } else if adjusted_cost_index < dec!(103) {
        CostOfLivingRating::Moderate
    } else if adjusted_cost_index < dec!(115) {
        CostOfLivingRating::High
    } else {
        CostOfLivingRating::VeryHigh
    }
}

pub fn rate_overall_value(purchasing_power_index: IndexValue) -> OverallValueRating {
    if purchasing_power_index >= dec!(110) {
        OverallValueRating::Excellent
    } else if purchasing_power_index >= dec!(102) {
        OverallValueRating::Good
    } else if purchasing_power_index >= dec!(95) {
        OverallValueRating::Moderate
    } else if purchasing_power_index >= dec!(85) {
        OverallValueRating::Poor
    } else {
        OverallValueRating::VeryPoor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub tax_burden: Option<TaxBurdenRating>,
    pub cost_of_living: Option<CostOfLivingRating>,
    pub overall_value: Option<OverallValueRating>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationResult {
    /// After-tax income expressed in national-average dollars.
    pub true_purchasing_power: Option<Money>,
    /// Purchasing power relative to the persona's baseline, 100 = national.
    pub true_purchasing_power_index: Option<IndexValue>,
    pub adjusted_cost_index: Option<IndexValue>,
    pub housing: HousingAdjustment,
    pub selected_income: Option<Money>,
    pub selected_after_tax_income: Option<Money>,
    pub national_baseline: Option<Money>,
    pub tax_breakdown: Option<TaxBreakdown>,
    pub property_tax: PropertyTaxEstimate,
    pub ratings: Ratings,
}

/// Merge the cost side and the income side into the final result.
pub fn combine(housing: HousingAdjustment, income: IncomeSelection) -> ComputationResult {
    let true_purchasing_power = purchasing_power(
        income.selected_after_tax_income,
        housing.adjusted_cost_index,
    );
    let true_purchasing_power_index =
        purchasing_power_index(true_purchasing_power, income.national_baseline);

    let ratings = Ratings {
        tax_burden: income
            .tax_breakdown
            .as_ref()
            .map(|t| rate_tax_burden(t.effective_rate)),
        cost_of_living: housing.adjusted_cost_index.map(rate_cost_of_living),
        overall_value: true_purchasing_power_index.map(rate_overall_value),
    };

    ComputationResult {
        true_purchasing_power,
        true_purchasing_power_index,
        adjusted_cost_index: housing.adjusted_cost_index,
        housing,
        selected_income: income.selected_income,
        selected_after_tax_income: income.selected_after_tax_income,
        national_baseline: income.national_baseline,
        tax_breakdown: income.tax_breakdown,
        property_tax: income.property_tax,
        ratings,
    }
}

/// `round(after_tax / (index / 100))`. A missing or non-positive index means
/// no data, never a division.
pub fn purchasing_power(
    after_tax_income: Option<Money>,
    adjusted_cost_index: Option<IndexValue>,
) -> Option<Money> {
    let after_tax = after_tax_income?;
    let index = adjusted_cost_index.filter(|i| *i > Decimal::ZERO)?;
    Some(round_whole(after_tax / (index / dec!(100))))
}

/// `round(tpp / baseline * 100, 1dp)`.
pub fn purchasing_power_index(
    true_purchasing_power: Option<Money>,
    national_baseline: Option<Money>,
) -> Option<IndexValue> {
    let tpp = true_purchasing_power?;
    let baseline = national_baseline.filter(|b| *b > Decimal::ZERO)?;
    Some(round_one_dp(tpp / baseline * dec!(100)))
}
