use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PurchasingPowerError;
use crate::types::{Money, Rate};
use crate::PurchasingPowerResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HousingSituation {
    #[default]
    Renter,
    Homeowner,
    ProspectiveBuyer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkSituation {
    /// National median household income, identical for every city.
    #[default]
    Standard,
    /// The city's own per-capita income figures.
    LocalEarner,
    /// A fixed retirement income taxed where the retiree lives.
    Retiree,
}

/// Assumptions selecting which branch of the engine applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfiguration {
    pub housing_situation: HousingSituation,
    pub work_situation: WorkSituation,
    pub include_utilities: bool,
    /// Annual mortgage rate for the prospective buyer (0.065 = 6.5%).
    pub current_mortgage_rate: Option<Rate>,
    pub retiree_income: Option<Money>,
    /// Jurisdiction used for tax instead of the profile's own state.
    pub state_override: Option<String>,
    pub down_payment_fraction: Option<Rate>,
}

impl PersonaConfiguration {
    pub fn new(housing_situation: HousingSituation, work_situation: WorkSituation) -> Self {
        Self {
            housing_situation,
            work_situation,
            ..Default::default()
        }
    }

    pub fn renter() -> Self {
        Self::new(HousingSituation::Renter, WorkSituation::Standard)
    }

    pub fn homeowner() -> Self {
        Self::new(HousingSituation::Homeowner, WorkSituation::Standard)
    }

    pub fn buyer() -> Self {
        Self::new(HousingSituation::ProspectiveBuyer, WorkSituation::Standard)
    }

    pub fn with_work_situation(mut self, work_situation: WorkSituation) -> Self {
        self.work_situation = work_situation;
        self
    }

    pub fn with_utilities(mut self, include: bool) -> Self {
        self.include_utilities = include;
        self
    }

    pub fn with_mortgage_rate(mut self, rate: Rate) -> Self {
        self.current_mortgage_rate = Some(rate);
        self
    }

    pub fn with_retiree_income(mut self, income: Money) -> Self {
        self.retiree_income = Some(income);
        self
    }

    pub fn with_state_override(mut self, state: impl Into<String>) -> Self {
        self.state_override = Some(state.into());
        self
    }

    pub fn with_down_payment(mut self, fraction: Rate) -> Self {
        self.down_payment_fraction = Some(fraction);
        self
    }

    /// Reject overrides that cannot describe a real household.
    ///
    /// Called at the boundary before the pipeline runs; the pipeline itself
    /// never fails.
    pub fn validate(&self) -> PurchasingPowerResult<()> {
        if let Some(rate) = self.current_mortgage_rate {
            if rate.is_sign_negative() || rate > Decimal::ONE {
                return Err(PurchasingPowerError::InvalidInput {
                    field: "current_mortgage_rate".into(),
                    reason: "must be a fraction between 0 and 1".into(),
                });
            }
        }
        if let Some(dp) = self.down_payment_fraction {
            if dp.is_sign_negative() || dp >= Decimal::ONE {
                return Err(PurchasingPowerError::InvalidInput {
                    field: "down_payment_fraction".into(),
                    reason: "must be in [0, 1)".into(),
                });
            }
        }
        if let Some(income) = self.retiree_income {
            if income.is_sign_negative() {
                return Err(PurchasingPowerError::InvalidInput {
                    field: "retiree_income".into(),
                    reason: "must not be negative".into(),
                });
            }
        }
        Ok(())
    }
}
