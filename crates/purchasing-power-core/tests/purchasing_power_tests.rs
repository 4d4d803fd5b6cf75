use purchasing_power_core::combiner::{CostOfLivingRating, OverallValueRating};
use purchasing_power_core::housing::compress_housing_index;
use purchasing_power_core::mortgage::monthly_mortgage_payment;
use purchasing_power_core::{
    compute_purchasing_power, CityFinancialProfile, HousingSituation, IncomeFigures,
    PersonaConfiguration, RateTables, RegionalPriceParities, WorkSituation,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Renter persona
// ===========================================================================

#[test]
fn test_renter_without_all_items_propagates_none() {
    let rates = RateTables::default();
    for work in [
        WorkSituation::Standard,
        WorkSituation::LocalEarner,
        WorkSituation::Retiree,
    ] {
        let persona = PersonaConfiguration::renter().with_work_situation(work);
        let profile = CityFinancialProfile::new("Colorado").with_price_parities(RegionalPriceParities {
            all_items: None,
            goods: Some(dec!(98)),
            housing: Some(dec!(120)),
            utilities: Some(dec!(101)),
            other_services: Some(dec!(103)),
        });
        let result = compute_purchasing_power(&profile, &persona, &rates);
        assert_eq!(result.adjusted_cost_index, None, "{work:?}");
        assert_eq!(result.true_purchasing_power, None, "{work:?}");
        assert_eq!(result.true_purchasing_power_index, None, "{work:?}");
        assert_eq!(result.ratings.cost_of_living, None);
        assert_eq!(result.ratings.overall_value, None);
    }
}

#[test]
fn test_renter_at_national_index_keeps_after_tax_income() {
    let rates = RateTables::default();
    let profile = CityFinancialProfile::new("Ohio")
        .with_all_items(dec!(100))
        .with_income(IncomeFigures {
            per_capita_income: Some(dec!(58_000)),
            per_capita_disposable_income: Some(dec!(51_000)),
        });

    for work in [
        WorkSituation::Standard,
        WorkSituation::LocalEarner,
        WorkSituation::Retiree,
    ] {
        let persona = PersonaConfiguration::renter().with_work_situation(work);
        let result = compute_purchasing_power(&profile, &persona, &rates);
        assert_eq!(result.adjusted_cost_index, Some(dec!(100)), "{work:?}");
        assert!(result.selected_after_tax_income.is_some(), "{work:?}");
        assert_eq!(
            result.true_purchasing_power, result.selected_after_tax_income,
            "{work:?}"
        );
    }
}

// ===========================================================================
// Homeowner persona
// ===========================================================================

#[test]
fn test_homeowner_ignores_housing_index() {
    let rates = RateTables::default();
    let persona = PersonaConfiguration::homeowner();
    let results: Vec<_> = [dec!(60), dec!(100), dec!(180), dec!(320)]
        .into_iter()
        .map(|housing| {
            let profile = CityFinancialProfile::new("Washington")
                .with_price_parities(RegionalPriceParities {
                    all_items: Some(dec!(112)),
                    goods: Some(dec!(103)),
                    housing: Some(housing),
                    utilities: Some(dec!(92)),
                    other_services: Some(dec!(106)),
                })
                .with_median_home_price(dec!(610_000));
            compute_purchasing_power(&profile, &persona, &rates)
        })
        .collect();

    for r in &results[1..] {
        assert_eq!(r.adjusted_cost_index, results[0].adjusted_cost_index);
        assert_eq!(r.true_purchasing_power, results[0].true_purchasing_power);
    }
    assert_eq!(results[0].housing.monthly_mortgage, None);
}

#[test]
fn test_homeowner_property_tax_reduces_purchasing_power() {
    let rates = RateTables::default();
    let base = CityFinancialProfile::new("Texas")
        .with_price_parities(RegionalPriceParities {
            all_items: Some(dec!(97)),
            goods: Some(dec!(99)),
            housing: Some(dec!(90)),
            utilities: Some(dec!(100)),
            other_services: Some(dec!(96)),
        })
        .with_median_home_price(dec!(300_000));
    let low_tax = base.clone().with_property_tax_rate(dec!(0.008));
    let high_tax = base.with_property_tax_rate(dec!(0.022));

    let persona = PersonaConfiguration::homeowner();
    let low = compute_purchasing_power(&low_tax, &persona, &rates);
    let high = compute_purchasing_power(&high_tax, &persona, &rates);
    assert!(high.true_purchasing_power < low.true_purchasing_power);
    assert_eq!(high.national_baseline, low.national_baseline);
}

// ===========================================================================
// Prospective buyer persona
// ===========================================================================

#[test]
fn test_mortgage_formula_round_trip() {
    let p = dec!(400000);
    let r = dec!(0.07) / dec!(12);
    let m = monthly_mortgage_payment(p, r, 360).unwrap();

    let mut growth = Decimal::ONE;
    for _ in 0..360 {
        growth *= Decimal::ONE + r;
    }
    let lhs = m * (growth - Decimal::ONE);
    let rhs = p * r * growth;
    let relative = ((lhs - rhs) / rhs).abs();
    assert!(relative < dec!(0.000001), "relative error {relative}");
}

#[test]
fn test_compression_continuous_and_increasing() {
    let below = compress_housing_index(dec!(149.9999));
    let at = compress_housing_index(dec!(150));
    let above = compress_housing_index(dec!(150.0001));
    assert!(at - below < dec!(0.001));
    assert!(above - at < dec!(0.001));
    assert!(below < at && at < above);

    let mut previous = at;
    let mut raw = dec!(150.5);
    while raw < dec!(2000) {
        let value = compress_housing_index(raw);
        assert!(value > previous, "not increasing at {raw}");
        previous = value;
        raw += dec!(37.5);
    }
}

#[test]
fn test_expensive_market_ranks_worse_but_bounded() {
    let rates = RateTables::default();
    let persona = PersonaConfiguration::buyer();
    let city = |price| {
        CityFinancialProfile::new("California")
            .with_all_items(dec!(118))
            .with_median_home_price(price)
    };
    let pricey = compute_purchasing_power(&city(dec!(1_200_000)), &persona, &rates);
    let extreme = compute_purchasing_power(&city(dec!(2_400_000)), &persona, &rates);

    let pricey_idx = pricey.adjusted_cost_index.unwrap();
    let extreme_idx = extreme.adjusted_cost_index.unwrap();
    assert!(extreme_idx > pricey_idx);

    let raw = extreme.housing.raw_housing_index.unwrap();
    let compressed = extreme.housing.housing_index.unwrap();
    assert!(raw > dec!(350));
    assert!(compressed < dec!(200));
    // property tax stays inside the housing index for buyers
    assert_eq!(extreme.property_tax.local_annual_property_tax, Some(Decimal::ZERO));
}

#[test]
fn test_buyer_zero_rate_mortgage_is_straight_line() {
    let rates = RateTables::default();
    let persona = PersonaConfiguration::buyer().with_mortgage_rate(Decimal::ZERO);
    let profile = CityFinancialProfile::new("Idaho").with_median_home_price(dec!(450_000));
    let result = compute_purchasing_power(&profile, &persona, &rates);
    assert_eq!(result.housing.monthly_mortgage, Some(dec!(1000)));
}

// ===========================================================================
// End-to-end reference cases
// ===========================================================================

#[test]
fn test_colorado_standard_renter_is_national_reference() {
    let rates = RateTables::default();
    let profile = CityFinancialProfile::new("Colorado").with_all_items(dec!(100));
    let result = compute_purchasing_power(&profile, &PersonaConfiguration::renter(), &rates);

    assert_eq!(result.selected_income, Some(dec!(74_580)));
    let index = result.true_purchasing_power_index.unwrap();
    assert!((index - dec!(100)).abs() <= dec!(1), "index {index}");
    assert_eq!(result.ratings.cost_of_living, Some(CostOfLivingRating::Moderate));
    assert_eq!(result.ratings.overall_value, Some(OverallValueRating::Moderate));
}

#[test]
fn test_california_expensive_renter_is_very_poor_value() {
    let rates = RateTables::default();
    let profile = CityFinancialProfile::new("California").with_all_items(dec!(150));
    let result = compute_purchasing_power(&profile, &PersonaConfiguration::renter(), &rates);

    assert_eq!(result.ratings.overall_value, Some(OverallValueRating::VeryPoor));
    assert_eq!(result.ratings.cost_of_living, Some(CostOfLivingRating::VeryHigh));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["ratings"]["overall_value"], "very-poor");
    assert_eq!(json["ratings"]["cost_of_living"], "very-high");
}

#[test]
fn test_unknown_jurisdiction_retiree_still_has_result() {
    let rates = RateTables::default();
    let persona = PersonaConfiguration::renter().with_work_situation(WorkSituation::Retiree);
    for state in ["", "   ", "Atlantis"] {
        let profile = CityFinancialProfile::new(state).with_all_items(dec!(104));
        let result = compute_purchasing_power(&profile, &persona, &rates);
        assert!(result.true_purchasing_power.is_some(), "state {state:?}");
        assert!(result.true_purchasing_power_index.is_some());
    }
}

#[test]
fn test_no_income_tax_state_beats_reference_at_same_prices() {
    let rates = RateTables::default();
    let persona = PersonaConfiguration::renter();
    let texas = compute_purchasing_power(
        &CityFinancialProfile::new("Texas").with_all_items(dec!(100)),
        &persona,
        &rates,
    );
    let colorado = compute_purchasing_power(
        &CityFinancialProfile::new("Colorado").with_all_items(dec!(100)),
        &persona,
        &rates,
    );
    assert!(texas.true_purchasing_power_index > colorado.true_purchasing_power_index);
}

// ===========================================================================
// Purity
// ===========================================================================

#[test]
fn test_inputs_are_not_mutated() {
    let rates = RateTables::default();
    let profile = CityFinancialProfile::new("Vermont")
        .with_all_items(dec!(99))
        .with_median_home_price(dec!(330_000));
    let persona = PersonaConfiguration::new(HousingSituation::ProspectiveBuyer, WorkSituation::Retiree)
        .with_retiree_income(dec!(65_000));
    let profile_before = profile.clone();
    let persona_before = persona.clone();

    let first = compute_purchasing_power(&profile, &persona, &rates);
    let second = compute_purchasing_power(&profile, &persona, &rates);

    assert_eq!(profile, profile_before);
    assert_eq!(persona, persona_before);
    assert_eq!(first, second);
}

#[test]
fn test_custom_rate_tables_change_result() {
    let mut rates = RateTables::default();
    let profile = CityFinancialProfile::new("Colorado").with_all_items(dec!(100));
    let persona = PersonaConfiguration::renter();
    let base = compute_purchasing_power(&profile, &persona, &rates);

    if let Some(co) = rates.states.iter_mut().find(|s| s.code == "CO") {
        co.rate = Decimal::ZERO;
    }
    let untaxed = compute_purchasing_power(&profile, &persona, &rates);
    assert!(untaxed.true_purchasing_power > base.true_purchasing_power);
    assert_eq!(untaxed.national_baseline, base.national_baseline);
}
