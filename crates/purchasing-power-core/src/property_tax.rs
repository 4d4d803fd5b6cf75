use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::persona::{HousingSituation, PersonaConfiguration};
use crate::profile::CityFinancialProfile;
use crate::rates::RateProvider;
use crate::types::Money;

/// Annual property tax for the household and its national equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTaxEstimate {
    /// `None` when a homeowner's city has no median home price.
    pub local_annual_property_tax: Option<Money>,
    pub national_annual_property_tax: Money,
}

impl PropertyTaxEstimate {
    pub fn zero() -> Self {
        Self {
            local_annual_property_tax: Some(Decimal::ZERO),
            national_annual_property_tax: Decimal::ZERO,
        }
    }
}

/// Property tax burden carried by the income side of the pipeline.
///
/// Only homeowners pay here. A prospective buyer's property tax is already
/// inside the mortgage-based housing index and renters pay none.
///
/// Homeowners are assessed on an estimated historical purchase price (a fixed
/// fraction of today's median) and the national figure uses the same fraction,
/// so both sides sit on a consistent basis.
pub fn estimate_property_tax(
    profile: &CityFinancialProfile,
    persona: &PersonaConfiguration,
    rates: &dyn RateProvider,
) -> PropertyTaxEstimate {
    match persona.housing_situation {
        HousingSituation::Renter | HousingSituation::ProspectiveBuyer => PropertyTaxEstimate::zero(),
        HousingSituation::Homeowner => {
            let national = rates.national();
            let factor = rates.heuristics().historical_purchase_factor;
            let local_rate = profile
                .property_tax_rate
                .unwrap_or(national.average_property_tax_rate);

            PropertyTaxEstimate {
                local_annual_property_tax: profile
                    .median_home_price
                    .map(|price| price * factor * local_rate),
                national_annual_property_tax: national.median_home_price
                    * factor
                    * national.average_property_tax_rate,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateTables;
    use rust_decimal_macros::dec;

    fn profile() -> CityFinancialProfile {
        CityFinancialProfile::new("Texas")
            .with_median_home_price(dec!(300_000))
            .with_property_tax_rate(dec!(0.018))
    }

    #[test]
    fn test_renter_pays_nothing() {
        let rates = RateTables::default();
        let est = estimate_property_tax(&profile(), &PersonaConfiguration::renter(), &rates);
        assert_eq!(est, PropertyTaxEstimate::zero());
    }

    #[test]
    fn test_buyer_not_double_counted() {
        let rates = RateTables::default();
        let est = estimate_property_tax(&profile(), &PersonaConfiguration::buyer(), &rates);
        assert_eq!(est.local_annual_property_tax, Some(Decimal::ZERO));
        assert_eq!(est.national_annual_property_tax, Decimal::ZERO);
    }

    #[test]
    fn test_homeowner_uses_historical_basis() {
        let rates = RateTables::default();
        let est = estimate_property_tax(&profile(), &PersonaConfiguration::homeowner(), &rates);
        // 300k * 0.60 * 1.8%
        assert_eq!(est.local_annual_property_tax, Some(dec!(3240)));
        // 412,300 * 0.60 * 1.02%
        assert_eq!(est.national_annual_property_tax, dec!(2523.276));
    }

    #[test]
    fn test_homeowner_missing_rate_uses_national_average() {
        let rates = RateTables::default();
        let mut p = profile();
        p.property_tax_rate = None;
        let est = estimate_property_tax(&p, &PersonaConfiguration::homeowner(), &rates);
        assert_eq!(est.local_annual_property_tax, Some(dec!(1836)));
    }

    #[test]
    fn test_homeowner_missing_price_is_none() {
        let rates = RateTables::default();
        let p = CityFinancialProfile::new("Texas");
        let est = estimate_property_tax(&p, &PersonaConfiguration::homeowner(), &rates);
        assert_eq!(est.local_annual_property_tax, None);
        assert!(est.national_annual_property_tax > Decimal::ZERO);
    }
}
