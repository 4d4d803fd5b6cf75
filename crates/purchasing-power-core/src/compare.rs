use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::combiner::{ComputationResult, Ratings};
use crate::engine::{collect_warnings, compute_purchasing_power};
use crate::income::select_income_at;
use crate::persona::{PersonaConfiguration, WorkSituation};
use crate::profile::{CityFinancialProfile, NamedCityProfile};
use crate::rates::RateProvider;
use crate::types::{round_one_dp, round_whole, with_metadata, ComputationOutput, IndexValue, Money};
use crate::PurchasingPowerResult;

const MAX_BISECTION_ITERATIONS: u32 = 100;
const MAX_BRACKET_DOUBLINGS: u32 = 40;
const INCOME_TOLERANCE: Decimal = dec!(0.5);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub origin: NamedCityProfile,
    pub target: NamedCityProfile,
    #[serde(default)]
    pub persona: PersonaConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySummary {
    pub name: String,
    pub true_purchasing_power: Option<Money>,
    pub true_purchasing_power_index: Option<IndexValue>,
    pub adjusted_cost_index: Option<IndexValue>,
    pub selected_income: Option<Money>,
    pub ratings: Ratings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityComparison {
    pub origin: CitySummary,
    pub target: CitySummary,
    /// Target purchasing power over origin purchasing power.
    pub purchasing_power_ratio: Option<Decimal>,
    /// Target index minus origin index, in index points.
    pub index_difference: Option<IndexValue>,
    /// Gross income the target city needs to match the origin's purchasing
    /// power. Not defined for local earners, whose income is city data.
    pub equivalent_income: Option<Money>,
}

pub fn compare_cities(
    input: &ComparisonInput,
    rates: &dyn RateProvider,
) -> PurchasingPowerResult<ComputationOutput<CityComparison>> {
    let start = Instant::now();
    input.persona.validate()?;

    let origin = compute_purchasing_power(&input.origin.profile, &input.persona, rates);
    let target = compute_purchasing_power(&input.target.profile, &input.persona, rates);

    let mut warnings: Vec<String> = Vec::new();
    for (city, result) in [(&input.origin, &origin), (&input.target, &target)] {
        warnings.extend(
            collect_warnings(&city.profile, &input.persona, result)
                .into_iter()
                .map(|w| format!("{}: {}", city.name, w)),
        );
    }

    let purchasing_power_ratio = origin
        .true_purchasing_power
        .zip(target.true_purchasing_power)
        .filter(|(o, _)| *o > Decimal::ZERO)
        .map(|(o, t)| (t / o).round_dp(4));
    let index_difference = origin
        .true_purchasing_power_index
        .zip(target.true_purchasing_power_index)
        .map(|(o, t)| round_one_dp(t - o));

    let equivalent_income = match input.persona.work_situation {
        WorkSituation::LocalEarner => None,
        WorkSituation::Standard | WorkSituation::Retiree => origin
            .true_purchasing_power
            .zip(target.adjusted_cost_index)
            .filter(|(_, idx)| *idx > Decimal::ZERO)
            .and_then(|(tpp, idx)| {
                equivalent_income(
                    &input.target.profile,
                    &input.persona,
                    tpp * idx / dec!(100),
                    rates,
                )
            }),
    };
    if equivalent_income.is_none() && input.persona.work_situation != WorkSituation::LocalEarner {
        warnings.push("Equivalent income could not be solved".into());
    }

    let output = CityComparison {
        origin: summarize(&input.origin.name, &origin),
        target: summarize(&input.target.name, &target),
        purchasing_power_ratio,
        index_difference,
        equivalent_income,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "True Purchasing Power comparison (equivalent income by bisection)",
        &serde_json::json!({
            "origin": input.origin.name,
            "target": input.target.name,
            "housing_situation": input.persona.housing_situation,
            "work_situation": input.persona.work_situation,
        }),
        warnings,
        elapsed,
        rates.tax_year(),
        output,
    ))
}

fn summarize(name: &str, result: &ComputationResult) -> CitySummary {
    CitySummary {
        name: name.to_string(),
        true_purchasing_power: result.true_purchasing_power,
        true_purchasing_power_index: result.true_purchasing_power_index,
        adjusted_cost_index: result.adjusted_cost_index,
        selected_income: result.selected_income,
        ratings: result.ratings.clone(),
    }
}

/// Gross income (to within half a dollar) whose after-tax amount in
/// `target` reaches `needed_after_tax`. The income is taxed exactly as the
/// persona's own income would be there: jurisdiction tables when one is known,
/// otherwise the profile's effective rate or the national average rate.
///
/// The effective-rate table makes after-tax income step down at thresholds,
/// so the search brackets first and then bisects.
pub fn equivalent_income(
    target: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    needed_after_tax: Money,
    rates: &dyn RateProvider,
) -> Option<Money> {
    let after_tax_at = |gross: Money| -> Option<Money> {
        select_income_at(target, persona, gross, rates)?.selected_after_tax_income
    };

    if needed_after_tax <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut lo = Decimal::ZERO;
    let mut hi = needed_after_tax.max(dec!(1000));
    let mut doublings = 0;
    while after_tax_at(hi)? < needed_after_tax {
        lo = hi;
        hi *= dec!(2);
        doublings += 1;
        if doublings > MAX_BRACKET_DOUBLINGS {
            return None;
        }
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        if hi - lo < INCOME_TOLERANCE {
            break;
        }
        let mid = (lo + hi) / dec!(2);
        if after_tax_at(mid)? >= needed_after_tax {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Some(round_whole(hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateTables;
    use rust_decimal_macros::dec;

    fn named(name: &str, state: &str, all_items: Decimal) -> NamedCityProfile {
        NamedCityProfile {
            name: name.to_string(),
            profile: CityFinancialProfile::new(state).with_all_items(all_items),
        }
    }

    #[test]
    fn test_identical_cities_compare_even() {
        let rates = RateTables::default();
        let input = ComparisonInput {
            origin: named("A", "Colorado", dec!(100)),
            target: named("B", "Colorado", dec!(100)),
            persona: PersonaConfiguration::renter(),
        };
        let out = compare_cities(&input, &rates).unwrap().result;
        assert_eq!(out.purchasing_power_ratio, Some(dec!(1)));
        assert_eq!(out.index_difference, Some(dec!(0)));
        let income = out.equivalent_income.unwrap();
        assert!((income - dec!(74_580)).abs() <= dec!(3), "got {income}");
    }

    #[test]
    fn test_expensive_target_needs_more_income() {
        let rates = RateTables::default();
        let input = ComparisonInput {
            origin: named("Austin", "Texas", dec!(100)),
            target: named("San Francisco", "California", dec!(130)),
            persona: PersonaConfiguration::renter(),
        };
        let out = compare_cities(&input, &rates).unwrap().result;
        assert!(out.purchasing_power_ratio.unwrap() < Decimal::ONE);
        assert!(out.index_difference.unwrap() < Decimal::ZERO);
        assert!(out.equivalent_income.unwrap() > dec!(74_580) * dec!(1.3));
    }

    #[test]
    fn test_equivalent_income_reaches_needed_after_tax() {
        let rates = RateTables::default();
        let target = CityFinancialProfile::new("Oregon").with_all_items(dec!(105));
        let persona = PersonaConfiguration::renter();
        let needed = dec!(70_000);
        let gross = equivalent_income(&target, &persona, needed, &rates).unwrap();
        let after_tax = select_income_at(&target, &persona, gross, &rates)
            .unwrap()
            .selected_after_tax_income
            .unwrap();
        assert!(after_tax >= needed - dec!(1), "after tax {after_tax}");
    }

    #[test]
    fn test_stateless_target_uses_profile_effective_rate() {
        let rates = RateTables::default();
        let mut target = CityFinancialProfile::default().with_all_items(dec!(100));
        target.effective_tax_rate_pct = Some(dec!(20));
        // 75,000 * (1 - 0.20) = 60,000
        let gross =
            equivalent_income(&target, &PersonaConfiguration::renter(), dec!(60_000), &rates)
                .unwrap();
        assert!((gross - dec!(75_000)).abs() <= dec!(1), "got {gross}");
    }

    #[test]
    fn test_stateless_target_uses_national_average_rate() {
        let rates = RateTables::default();
        let target = CityFinancialProfile::default().with_all_items(dec!(100));
        // 80,000 * (1 - 0.15) = 68,000
        let gross =
            equivalent_income(&target, &PersonaConfiguration::renter(), dec!(68_000), &rates)
                .unwrap();
        assert!((gross - dec!(80_000)).abs() <= dec!(1), "got {gross}");
    }

    #[test]
    fn test_local_earner_has_no_equivalent_income() {
        let rates = RateTables::default();
        let input = ComparisonInput {
            origin: named("A", "Colorado", dec!(100)),
            target: named("B", "Texas", dec!(95)),
            persona: PersonaConfiguration::renter().with_work_situation(WorkSituation::LocalEarner),
        };
        let out = compare_cities(&input, &rates).unwrap();
        assert_eq!(out.result.equivalent_income, None);
    }
}
