use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::combiner::{combine, ComputationResult};
use crate::housing::{adjust_cost_index, CostIndexMethod};
use crate::income::{select_income, TaxSource};
use crate::persona::{HousingSituation, PersonaConfiguration};
use crate::profile::CityFinancialProfile;
use crate::rates::RateProvider;
use crate::types::{with_metadata, ComputationOutput};
use crate::PurchasingPowerResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityAnalysisInput {
    pub profile: CityFinancialProfile,
    #[serde(default)]
    pub persona: PersonaConfiguration,
}

/// Run the full pipeline for one city.
///
/// Pure: borrows its inputs, reads only the rate provider, never fails.
/// Missing data shows up as `None` fields in the result.
pub fn compute_purchasing_power(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    rates: &dyn RateProvider,
) -> ComputationResult {
    let income = select_income(profile, persona, rates);
    let housing = adjust_cost_index(profile, persona, rates);
    let result = combine(housing, income);
    debug!(
        state = ?profile.state,
        tpp = ?result.true_purchasing_power,
        index = ?result.true_purchasing_power_index,
        "purchasing power computed"
    );
    result
}

/// Validate the persona, run the pipeline and wrap the result in the standard
/// output envelope, listing every fallback the pipeline took.
pub fn analyze_city(
    input: &CityAnalysisInput,
    rates: &dyn RateProvider,
) -> PurchasingPowerResult<ComputationOutput<ComputationResult>> {
    let start = Instant::now();
    input.persona.validate()?;

    let result = compute_purchasing_power(&input.profile, &input.persona, rates);
    let warnings = collect_warnings(&input.profile, &input.persona, &result);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology(&input.persona),
        &serde_json::json!({
            "housing_situation": input.persona.housing_situation,
            "work_situation": input.persona.work_situation,
            "include_utilities": input.persona.include_utilities,
            "national_median_household_income": rates.national().median_household_income.to_string(),
            "average_state_rate": rates.average_state_rate().to_string(),
            "historical_purchase_factor": rates.heuristics().historical_purchase_factor.to_string(),
        }),
        warnings,
        elapsed,
        rates.tax_year(),
        result,
    ))
}

fn methodology(persona: &PersonaConfiguration) -> &'static str {
    match persona.housing_situation {
        HousingSituation::Renter => "True Purchasing Power (renter, all-items RPP)",
        HousingSituation::Homeowner => {
            "True Purchasing Power (homeowner, goods and services RPP, historical-basis property tax)"
        }
        HousingSituation::ProspectiveBuyer => {
            "True Purchasing Power (prospective buyer, amortized mortgage housing index)"
        }
    }
}

pub(crate) fn collect_warnings(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    result: &ComputationResult,
) -> Vec<String> {
    let mut warnings = Vec::new();

    match result.housing.method {
        CostIndexMethod::Unavailable => {
            warnings.push("No adjusted cost index: required price parities are missing".into())
        }
        CostIndexMethod::AllItemsFallback => warnings.push(format!(
            "{:?} cost formula lacked inputs; all-items RPP used instead",
            persona.housing_situation
        )),
        CostIndexMethod::GoodsOnly => {
            warnings.push("Other-services RPP missing; goods RPP used alone".into())
        }
        _ => {}
    }

    if persona.include_utilities
        && persona.housing_situation == HousingSituation::Renter
        && profile.price_parities.utilities.is_none()
    {
        warnings.push("Utilities requested but no utilities RPP is available".into());
    }

    if let Some(tax) = &result.tax_breakdown {
        match tax.source {
            TaxSource::Computed if !tax.jurisdiction_matched => warnings.push(format!(
                "Unknown jurisdiction {:?}; average state rate applied",
                persona.state_override.as_deref().or(profile.state.as_deref()).unwrap_or("")
            )),
            TaxSource::ProfileEffectiveRate => warnings.push(
                "No jurisdiction; profile effective tax rate used (capped)".into(),
            ),
            TaxSource::NationalAverageRate => warnings
                .push("No jurisdiction or effective rate; national average tax rate used".into()),
            _ => {}
        }
    }

    if result.selected_after_tax_income.is_none() {
        warnings.push("After-tax income unavailable: income or home price data missing".into());
    }
    warnings
}
