use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mortgage::monthly_mortgage_payment;
use crate::persona::{HousingSituation, PersonaConfiguration};
use crate::profile::{CityFinancialProfile, RegionalPriceParities};
use crate::rates::RateProvider;
use crate::types::{IndexValue, Money};

/// Weight of the utilities deviation added to a renter's all-items index.
const UTILITIES_WEIGHT: Decimal = dec!(0.05);

const HOMEOWNER_GOODS_WEIGHT: Decimal = dec!(0.70);
const HOMEOWNER_SERVICES_WEIGHT: Decimal = dec!(0.30);

const BUYER_HOUSING_WEIGHT: Decimal = dec!(0.35);
const BUYER_GOODS_WEIGHT: Decimal = dec!(0.35);
const BUYER_SERVICES_WEIGHT: Decimal = dec!(0.30);

/// Raw housing index above which log compression applies (1.5x national).
const COMPRESSION_THRESHOLD: Decimal = dec!(150);
const COMPRESSION_SCALE: Decimal = dec!(50);

const NATIONAL_INDEX: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which formula produced the adjusted cost index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostIndexMethod {
    AllItems,
    AllItemsWithUtilities,
    GoodsAndServices,
    GoodsOnly,
    MortgageBlend,
    /// A persona-specific formula lacked inputs; all-items was used instead.
    AllItemsFallback,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingAdjustment {
    pub adjusted_cost_index: Option<IndexValue>,
    pub method: CostIndexMethod,
    /// Sub-indices the adjustment was computed from.
    pub components: RegionalPriceParities,
    /// Prospective buyer only.
    pub monthly_mortgage: Option<Money>,
    pub monthly_property_tax: Option<Money>,
    pub total_monthly_housing: Option<Money>,
    pub raw_housing_index: Option<IndexValue>,
    /// Raw housing index after log compression.
    pub housing_index: Option<IndexValue>,
}

impl HousingAdjustment {
    fn from_index(
        index: Option<IndexValue>,
        method: CostIndexMethod,
        components: &RegionalPriceParities,
    ) -> Self {
        Self {
            method: if index.is_some() {
                method
            } else {
                CostIndexMethod::Unavailable
            },
            adjusted_cost_index: index,
            components: components.clone(),
            monthly_mortgage: None,
            monthly_property_tax: None,
            total_monthly_housing: None,
            raw_housing_index: None,
            housing_index: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Adjustment
// ---------------------------------------------------------------------------

/// Persona-specific cost-of-living index for one city.
pub fn adjust_cost_index(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    rates: &dyn RateProvider,
) -> HousingAdjustment {
    let adjustment = match persona.housing_situation {
        HousingSituation::Renter => renter_index(profile, persona),
        HousingSituation::Homeowner => homeowner_index(profile),
        HousingSituation::ProspectiveBuyer => buyer_index(profile, persona, rates),
    };
    debug!(
        housing = ?persona.housing_situation,
        method = ?adjustment.method,
        index = ?adjustment.adjusted_cost_index,
        "cost index adjusted"
    );
    adjustment
}

/// Renters feel the full regional price level, optionally nudged by utilities.
fn renter_index(profile: &CityFinancialProfile, persona: &PersonaConfiguration) -> HousingAdjustment {
    let rpp = &profile.price_parities;
    let Some(all_items) = rpp.all_items else {
        return HousingAdjustment::from_index(None, CostIndexMethod::Unavailable, rpp);
    };

    match (persona.include_utilities, rpp.utilities) {
        (true, Some(utilities)) => HousingAdjustment::from_index(
            Some(all_items + (utilities - NATIONAL_INDEX) * UTILITIES_WEIGHT),
            CostIndexMethod::AllItemsWithUtilities,
            rpp,
        ),
        _ => HousingAdjustment::from_index(Some(all_items), CostIndexMethod::AllItems, rpp),
    }
}

/// A fixed-rate mortgage insulates owners from regional housing swings, so
/// housing is left out of the blend entirely.
fn homeowner_index(profile: &CityFinancialProfile) -> HousingAdjustment {
    let rpp = &profile.price_parities;
    match (rpp.goods, rpp.other_services) {
        (Some(goods), Some(services)) => HousingAdjustment::from_index(
            Some(HOMEOWNER_GOODS_WEIGHT * goods + HOMEOWNER_SERVICES_WEIGHT * services),
            CostIndexMethod::GoodsAndServices,
            rpp,
        ),
        (Some(goods), None) => {
            HousingAdjustment::from_index(Some(goods), CostIndexMethod::GoodsOnly, rpp)
        }
        (None, _) => {
            HousingAdjustment::from_index(rpp.all_items, CostIndexMethod::AllItemsFallback, rpp)
        }
    }
}

/// Buyers face today's prices: the housing component is rebuilt from the cost
/// of financing a median home at current rates.
fn buyer_index(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    rates: &dyn RateProvider,
) -> HousingAdjustment {
    let rpp = &profile.price_parities;
    let fallback =
        || HousingAdjustment::from_index(rpp.all_items, CostIndexMethod::AllItemsFallback, rpp);

    let Some(home_price) = profile.median_home_price else {
        return fallback();
    };

    let defaults = rates.mortgage();
    let national = rates.national();
    let annual_rate = persona.current_mortgage_rate.unwrap_or(defaults.annual_rate);
    let down_payment = persona
        .down_payment_fraction
        .unwrap_or(defaults.down_payment_fraction);
    let principal = home_price * (Decimal::ONE - down_payment);

    let Some(monthly_mortgage) =
        monthly_mortgage_payment(principal, annual_rate / dec!(12), defaults.term_months)
    else {
        return fallback();
    };
    if national.average_monthly_housing_cost <= Decimal::ZERO {
        return fallback();
    }

    let property_tax_rate = profile
        .property_tax_rate
        .unwrap_or(national.average_property_tax_rate);
    let monthly_property_tax = home_price * property_tax_rate / dec!(12);
    let total_monthly_housing = monthly_mortgage + monthly_property_tax;

    let raw_housing_index = total_monthly_housing / national.average_monthly_housing_cost * NATIONAL_INDEX;
    let housing_index = compress_housing_index(raw_housing_index);

    let goods = rpp.goods.unwrap_or(NATIONAL_INDEX);
    let services = rpp.other_services.unwrap_or(NATIONAL_INDEX);
    let blended = BUYER_HOUSING_WEIGHT * housing_index
        + BUYER_GOODS_WEIGHT * goods
        + BUYER_SERVICES_WEIGHT * services;

    HousingAdjustment {
        adjusted_cost_index: Some(blended),
        method: CostIndexMethod::MortgageBlend,
        components: rpp.clone(),
        monthly_mortgage: Some(monthly_mortgage),
        monthly_property_tax: Some(monthly_property_tax),
        total_monthly_housing: Some(total_monthly_housing),
        raw_housing_index: Some(raw_housing_index),
        housing_index: Some(housing_index),
    }
}

/// Logarithmic compression above 1.5x national.
///
/// `150 + 50 * log10(1 + (raw - 150) / 50)`: continuous at the seam and
/// strictly increasing, so expensive markets still rank worse without the
/// penalty growing without bound.
pub fn compress_housing_index(raw: IndexValue) -> IndexValue {
    if raw <= COMPRESSION_THRESHOLD {
        return raw;
    }
    let excess = (raw - COMPRESSION_THRESHOLD) / COMPRESSION_SCALE;
    COMPRESSION_THRESHOLD + COMPRESSION_SCALE * (Decimal::ONE + excess).log10()
}
