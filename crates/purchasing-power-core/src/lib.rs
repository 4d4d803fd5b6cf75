pub mod combiner;
pub mod compare;
pub mod engine;
pub mod error;
pub mod housing;
pub mod income;
pub mod mortgage;
pub mod persona;
pub mod profile;
pub mod property_tax;
pub mod rates;
pub mod tax;
pub mod types;

#[cfg(feature = "batch")]
pub mod batch;

pub use combiner::ComputationResult;
pub use engine::{analyze_city, compute_purchasing_power, CityAnalysisInput};
pub use error::PurchasingPowerError;
pub use persona::{HousingSituation, PersonaConfiguration, WorkSituation};
pub use profile::{CityFinancialProfile, IncomeFigures, NamedCityProfile, RegionalPriceParities};
pub use rates::{RateProvider, RateTables};
pub use types::*;

/// Standard result type for all purchasing-power operations
pub type PurchasingPowerResult<T> = Result<T, PurchasingPowerError>;
