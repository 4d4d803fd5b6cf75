pub mod analyze;
pub mod batch;
pub mod compare;
pub mod mortgage;
pub mod rates;
pub mod tax;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use purchasing_power_core::{HousingSituation, PersonaConfiguration, WorkSituation};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HousingArg {
    Renter,
    Homeowner,
    Buyer,
}

impl From<HousingArg> for HousingSituation {
    fn from(arg: HousingArg) -> Self {
        match arg {
            HousingArg::Renter => HousingSituation::Renter,
            HousingArg::Homeowner => HousingSituation::Homeowner,
            HousingArg::Buyer => HousingSituation::ProspectiveBuyer,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WorkArg {
    Standard,
    LocalEarner,
    Retiree,
}

impl From<WorkArg> for WorkSituation {
    fn from(arg: WorkArg) -> Self {
        match arg {
            WorkArg::Standard => WorkSituation::Standard,
            WorkArg::LocalEarner => WorkSituation::LocalEarner,
            WorkArg::Retiree => WorkSituation::Retiree,
        }
    }
}

/// Persona flags shared by the city commands. Each flag given on the command
/// line overrides the matching field of a persona read from input.
#[derive(Args, Debug, Default)]
pub struct PersonaArgs {
    /// Housing situation
    #[arg(long)]
    pub housing: Option<HousingArg>,

    /// Work situation
    #[arg(long)]
    pub work: Option<WorkArg>,

    /// Fold the utilities price parity into a renter's index; pass `false`
    /// to turn it off for a persona read from input
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub include_utilities: Option<bool>,

    /// Annual mortgage rate for a prospective buyer (0.065 = 6.5%)
    #[arg(long)]
    pub mortgage_rate: Option<Decimal>,

    /// Gross retirement income
    #[arg(long)]
    pub retiree_income: Option<Decimal>,

    /// Tax jurisdiction to use instead of the city's state
    #[arg(long)]
    pub state_override: Option<String>,

    /// Down payment fraction for a prospective buyer (0.2 = 20%)
    #[arg(long)]
    pub down_payment: Option<Decimal>,
}

impl PersonaArgs {
    pub fn apply(self, mut persona: PersonaConfiguration) -> PersonaConfiguration {
        if let Some(h) = self.housing {
            persona.housing_situation = h.into();
        }
        if let Some(w) = self.work {
            persona.work_situation = w.into();
        }
        if let Some(u) = self.include_utilities {
            persona.include_utilities = u;
        }
        if self.mortgage_rate.is_some() {
            persona.current_mortgage_rate = self.mortgage_rate;
        }
        if self.retiree_income.is_some() {
            persona.retiree_income = self.retiree_income;
        }
        if self.state_override.is_some() {
            persona.state_override = self.state_override;
        }
        if self.down_payment.is_some() {
            persona.down_payment_fraction = self.down_payment;
        }
        persona
    }
}
