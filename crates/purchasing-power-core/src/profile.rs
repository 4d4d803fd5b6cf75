use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{IndexValue, Money, Rate};

// ---------------------------------------------------------------------------
// City financial profile
// ---------------------------------------------------------------------------

/// Regional Price Parity sub-indices, each centered at 100 = national average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalPriceParities {
    pub all_items: Option<IndexValue>,
    pub goods: Option<IndexValue>,
    pub housing: Option<IndexValue>,
    pub utilities: Option<IndexValue>,
    pub other_services: Option<IndexValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeFigures {
    pub per_capita_income: Option<Money>,
    pub per_capita_disposable_income: Option<Money>,
}

/// Immutable snapshot of the raw inputs known for one city.
///
/// Every field may be absent. Absence is not an error: the engine propagates
/// it as `None` through every figure that depends on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityFinancialProfile {
    /// Jurisdiction (state) name or USPS code.
    pub state: Option<String>,
    pub price_parities: RegionalPriceParities,
    pub income: IncomeFigures,
    /// Pre-computed effective tax rate as a percentage (18.5 = 18.5%).
    pub effective_tax_rate_pct: Option<Decimal>,
    pub median_home_price: Option<Money>,
    /// Local property-tax rate as a fraction (0.011 = 1.1%).
    pub property_tax_rate: Option<Rate>,
}

impl CityFinancialProfile {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            ..Default::default()
        }
    }

    pub fn with_all_items(mut self, index: IndexValue) -> Self {
        self.price_parities.all_items = Some(index);
        self
    }

    pub fn with_price_parities(mut self, parities: RegionalPriceParities) -> Self {
        self.price_parities = parities;
        self
    }

    pub fn with_income(mut self, income: IncomeFigures) -> Self {
        self.income = income;
        self
    }

    pub fn with_median_home_price(mut self, price: Money) -> Self {
        self.median_home_price = Some(price);
        self
    }

    pub fn with_property_tax_rate(mut self, rate: Rate) -> Self {
        self.property_tax_rate = Some(rate);
        self
    }

    /// Non-empty jurisdiction name, if one was supplied.
    pub fn jurisdiction(&self) -> Option<&str> {
        self.state
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A profile tagged with the display name the caller uses for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCityProfile {
    pub name: String,
    pub profile: CityFinancialProfile,
}
