use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::persona::{PersonaConfiguration, WorkSituation};
use crate::profile::CityFinancialProfile;
use crate::property_tax::{estimate_property_tax, PropertyTaxEstimate};
use crate::rates::RateProvider;
use crate::tax::{calculate_income_tax, national_reference_tax, IncomeTax};
use crate::types::{round_whole, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the income-tax figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxSource {
    /// Federal and state tables for a named jurisdiction.
    Computed,
    /// The profile's pre-computed effective rate, capped.
    ProfileEffectiveRate,
    /// The fixed national average combined rate.
    NationalAverageRate,
    /// Gross income minus reported disposable income.
    ImpliedByDisposableIncome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub source: TaxSource,
    pub jurisdiction: Option<String>,
    pub jurisdiction_matched: bool,
    /// Only known when the tables were applied.
    pub federal_tax: Option<Money>,
    pub state_tax: Option<Money>,
    pub total_income_tax: Money,
    /// Income tax over gross income, a fraction in [0, 1].
    pub effective_rate: Rate,
    pub property_tax: Option<Money>,
}

/// Income and baseline for one work persona. The two are always derived the
/// same way, so a city is never compared against another persona's baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSelection {
    pub work_situation: WorkSituation,
    pub selected_income: Option<Money>,
    pub selected_after_tax_income: Option<Money>,
    pub national_baseline: Option<Money>,
    pub tax_breakdown: Option<TaxBreakdown>,
    pub property_tax: PropertyTaxEstimate,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

pub fn select_income(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    rates: &dyn RateProvider,
) -> IncomeSelection {
    let property_tax = estimate_property_tax(profile, persona, rates);

    let selection = match persona.work_situation {
        WorkSituation::LocalEarner => local_earner(profile, property_tax, rates),
        WorkSituation::Retiree => {
            let income = persona
                .retiree_income
                .unwrap_or(rates.national().default_retiree_income);
            retiree(profile, persona, income, property_tax, rates)
        }
        WorkSituation::Standard => {
            let income = rates.national().median_household_income;
            standard(profile, persona, income, property_tax, rates)
        }
    };
    debug!(
        work = ?selection.work_situation,
        income = ?selection.selected_income,
        after_tax = ?selection.selected_after_tax_income,
        baseline = ?selection.national_baseline,
        "income selected"
    );
    selection
}

/// Selection for an arbitrary gross `income`, taxed from the same source the
/// persona's own income would be. `None` for local earners, whose income is
/// city data rather than a free variable.
pub fn select_income_at(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    income: Money,
    rates: &dyn RateProvider,
) -> Option<IncomeSelection> {
    let property_tax = estimate_property_tax(profile, persona, rates);
    match persona.work_situation {
        WorkSituation::LocalEarner => None,
        WorkSituation::Retiree => Some(retiree(profile, persona, income, property_tax, rates)),
        WorkSituation::Standard => Some(standard(profile, persona, income, property_tax, rates)),
    }
}

/// The city's own earners: reported disposable income against the national
/// per-capita disposable figure.
fn local_earner(
    profile: &CityFinancialProfile,
    property_tax: PropertyTaxEstimate,
    rates: &dyn RateProvider,
) -> IncomeSelection {
    let income = profile.income.per_capita_income;
    let disposable = profile.income.per_capita_disposable_income;

    let after_tax = disposable
        .zip(property_tax.local_annual_property_tax)
        .map(|(d, p)| round_whole(d - p));
    let baseline =
        rates.national().per_capita_disposable_income - property_tax.national_annual_property_tax;

    let tax_breakdown = income
        .zip(disposable)
        .filter(|(gross, _)| *gross > Decimal::ZERO)
        .map(|(gross, net)| {
            let total = (gross - net).max(Decimal::ZERO);
            TaxBreakdown {
                source: TaxSource::ImpliedByDisposableIncome,
                jurisdiction: profile.jurisdiction().map(str::to_string),
                jurisdiction_matched: false,
                federal_tax: None,
                state_tax: None,
                total_income_tax: total,
                effective_rate: (total / gross).min(Decimal::ONE),
                property_tax: property_tax.local_annual_property_tax,
            }
        });

    IncomeSelection {
        work_situation: WorkSituation::LocalEarner,
        selected_income: income,
        selected_after_tax_income: after_tax,
        national_baseline: Some(baseline),
        tax_breakdown,
        property_tax,
    }
}

fn retiree(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    income: Money,
    property_tax: PropertyTaxEstimate,
    rates: &dyn RateProvider,
) -> IncomeSelection {
    let tax = calculate_income_tax(income, tax_jurisdiction(profile, persona), rates);
    with_table_tax(WorkSituation::Retiree, income, tax, property_tax, rates)
}

/// Same national median income in every city: answers where an average earner
/// can afford to live, not how much locals make.
fn standard(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    income: Money,
    property_tax: PropertyTaxEstimate,
    rates: &dyn RateProvider,
) -> IncomeSelection {
    if let Some(jurisdiction) = tax_jurisdiction(profile, persona) {
        let tax = calculate_income_tax(income, Some(jurisdiction), rates);
        return with_table_tax(WorkSituation::Standard, income, tax, property_tax, rates);
    }

    let (source, rate) = match profile.effective_tax_rate_pct {
        Some(pct) => (
            TaxSource::ProfileEffectiveRate,
            (pct / dec!(100))
                .max(Decimal::ZERO)
                .min(rates.heuristics().effective_rate_cap),
        ),
        None => (TaxSource::NationalAverageRate, rates.average_combined_rate()),
    };
    let total = income * rate;
    let local_property = property_tax.local_annual_property_tax;

    IncomeSelection {
        work_situation: WorkSituation::Standard,
        selected_income: Some(income),
        selected_after_tax_income: local_property.map(|p| round_whole(income - total - p)),
        national_baseline: Some(national_baseline(income, &property_tax, rates)),
        tax_breakdown: Some(TaxBreakdown {
            source,
            jurisdiction: None,
            jurisdiction_matched: false,
            federal_tax: None,
            state_tax: None,
            total_income_tax: total,
            effective_rate: rate,
            property_tax: local_property,
        }),
        property_tax,
    }
}

/// Explicit override first, then the profile's own state.
fn tax_jurisdiction<'a>(
    profile: &'a CityFinancialProfile,
    persona: &'a PersonaConfiguration,
) -> Option<&'a str> {
    persona
        .state_override
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| profile.jurisdiction())
}

fn with_table_tax(
    work_situation: WorkSituation,
    income: Money,
    tax: IncomeTax,
    property_tax: PropertyTaxEstimate,
    rates: &dyn RateProvider,
) -> IncomeSelection {
    let local_property = property_tax.local_annual_property_tax;
    let after_tax =
        local_property.map(|p| round_whole(income - tax.federal_tax - tax.state_tax - p));

    IncomeSelection {
        work_situation,
        selected_income: Some(income),
        selected_after_tax_income: after_tax,
        national_baseline: Some(national_baseline(income, &property_tax, rates)),
        tax_breakdown: Some(TaxBreakdown {
            source: TaxSource::Computed,
            jurisdiction_matched: tax.jurisdiction_matched,
            federal_tax: Some(tax.federal_tax),
            state_tax: Some(tax.state_tax),
            total_income_tax: tax.total_tax(),
            effective_rate: tax.combined_effective_rate,
            jurisdiction: tax.jurisdiction,
            property_tax: local_property,
        }),
        property_tax,
    }
}

/// The same income taxed at the reference jurisdiction, less the national
/// property-tax equivalent.
fn national_baseline(income: Money, property_tax: &PropertyTaxEstimate, rates: &dyn RateProvider) -> Money {
    let reference = national_reference_tax(income, rates);
    income - reference.total_tax() - property_tax.national_annual_property_tax
}
