use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::info;

use crate::combiner::ComputationResult;
use crate::engine::{collect_warnings, compute_purchasing_power};
use crate::persona::PersonaConfiguration;
use crate::profile::NamedCityProfile;
use crate::rates::RateProvider;
use crate::types::{with_metadata, ComputationOutput, IndexValue};
use crate::PurchasingPowerResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub cities: Vec<NamedCityProfile>,
    #[serde(default)]
    pub persona: PersonaConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCity {
    /// 1-based; `None` for cities without a purchasing power index.
    pub rank: Option<u32>,
    /// Position of the city in the input list.
    pub input_position: usize,
    pub name: String,
    pub result: ComputationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub rankings: Vec<RankedCity>,
    pub evaluated: usize,
    pub ranked: usize,
    pub best: Option<String>,
    pub worst: Option<String>,
}

/// Evaluate every city in parallel and order them by purchasing power index,
/// highest first. Cities without an index sort last; ties break on name.
pub fn rank_cities(
    cities: &[NamedCityProfile],
    persona: &PersonaConfiguration,
    rates: &dyn RateProvider,
) -> Vec<RankedCity> {
    let mut evaluated: Vec<RankedCity> = cities
        .par_iter()
        .enumerate()
        .map(|(input_position, city)| RankedCity {
            rank: None,
            input_position,
            name: city.name.clone(),
            result: compute_purchasing_power(&city.profile, persona, rates),
        })
        .collect();

    evaluated.sort_by(|a, b| {
        compare_index(
            a.result.true_purchasing_power_index,
            b.result.true_purchasing_power_index,
        )
        .then_with(|| a.name.cmp(&b.name))
    });

    let mut next_rank = 0u32;
    for city in evaluated.iter_mut() {
        if city.result.true_purchasing_power_index.is_some() {
            next_rank += 1;
            city.rank = Some(next_rank);
        }
    }
    evaluated
}

/// Descending, with `None` after every value.
fn compare_index(a: Option<IndexValue>, b: Option<IndexValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn analyze_cities(
    input: &BatchInput,
    rates: &dyn RateProvider,
) -> PurchasingPowerResult<ComputationOutput<BatchOutput>> {
    let start = Instant::now();
    input.persona.validate()?;

    let rankings = rank_cities(&input.cities, &input.persona, rates);

    let mut warnings = Vec::new();
    for city in &input.cities {
        if city.name.trim().is_empty() {
            warnings.push("City with an empty name in batch input".to_string());
        }
    }
    for ranked in &rankings {
        let profile = &input.cities[ranked.input_position].profile;
        warnings.extend(
            collect_warnings(profile, &input.persona, &ranked.result)
                .into_iter()
                .map(|w| format!("{}: {}", ranked.name, w)),
        );
    }

    let ranked = rankings.iter().filter(|r| r.rank.is_some()).count();
    let best = rankings
        .iter()
        .find(|r| r.rank.is_some())
        .map(|r| r.name.clone());
    let worst = rankings
        .iter()
        .rev()
        .find(|r| r.rank.is_some())
        .map(|r| r.name.clone());
    info!(evaluated = rankings.len(), ranked, "batch ranked");

    let output = BatchOutput {
        evaluated: rankings.len(),
        ranked,
        best,
        worst,
        rankings,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "True Purchasing Power ranking (parallel evaluation, index descending)",
        &serde_json::json!({
            "housing_situation": input.persona.housing_situation,
            "work_situation": input.persona.work_situation,
            "city_count": input.cities.len(),
        }),
        warnings,
        elapsed,
        rates.tax_year(),
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CityFinancialProfile;
    use crate::rates::RateTables;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn city(name: &str, state: &str, all_items: Option<Decimal>) -> NamedCityProfile {
        let mut profile = CityFinancialProfile::new(state);
        profile.price_parities.all_items = all_items;
        NamedCityProfile {
            name: name.to_string(),
            profile,
        }
    }

    #[test]
    fn test_rank_orders_by_index_descending() {
        let rates = RateTables::default();
        let cities = vec![
            city("San Jose", "California", Some(dec!(118))),
            city("Houston", "Texas", Some(dec!(97))),
            city("Nowhere", "Texas", None),
            city("Denver", "Colorado", Some(dec!(108))),
        ];
        let ranked = rank_cities(&cities, &PersonaConfiguration::renter(), &rates);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Houston", "Denver", "San Jose", "Nowhere"]);
        assert_eq!(ranked[0].rank, Some(1));
        assert_eq!(ranked[2].rank, Some(3));
        assert_eq!(ranked[3].rank, None);
    }

    #[test]
    fn test_ties_break_on_name() {
        let rates = RateTables::default();
        let cities = vec![
            city("Beta", "Texas", Some(dec!(100))),
            city("Alpha", "Texas", Some(dec!(100))),
        ];
        let ranked = rank_cities(&cities, &PersonaConfiguration::renter(), &rates);
        assert_eq!(ranked[0].name, "Alpha");
        assert_eq!(ranked[1].name, "Beta");
    }

    #[test]
    fn test_analyze_cities_summary() {
        let rates = RateTables::default();
        let input = BatchInput {
            cities: vec![
                city("Austin", "Texas", Some(dec!(102))),
                city("Boston", "Massachusetts", Some(dec!(115))),
                city("Blank", "Ohio", None),
            ],
            persona: PersonaConfiguration::renter(),
        };
        let output = analyze_cities(&input, &rates).unwrap();
        assert_eq!(output.result.evaluated, 3);
        assert_eq!(output.result.ranked, 2);
        assert_eq!(output.result.best.as_deref(), Some("Austin"));
        assert_eq!(output.result.worst.as_deref(), Some("Boston"));
        assert!(output.warnings.iter().any(|w| w.starts_with("Blank:")));
    }

    #[test]
    fn test_empty_batch() {
        let rates = RateTables::default();
        let ranked = rank_cities(&[], &PersonaConfiguration::renter(), &rates);
        assert!(ranked.is_empty());
    }
}
