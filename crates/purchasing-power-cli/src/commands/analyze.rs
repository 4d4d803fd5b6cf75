use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use purchasing_power_core::{
    analyze_city, CityAnalysisInput, CityFinancialProfile, IncomeFigures, PersonaConfiguration,
    RateTables, RegionalPriceParities,
};

use super::PersonaArgs;
use crate::input;

/// Arguments for a single-city analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input file with `profile` and `persona` (overrides city flags)
    #[arg(long)]
    pub input: Option<String>,

    /// State name or USPS code
    #[arg(long)]
    pub state: Option<String>,

    /// All-items regional price parity (100 = national)
    #[arg(long)]
    pub all_items: Option<Decimal>,

    /// Goods price parity
    #[arg(long)]
    pub goods: Option<Decimal>,

    /// Housing (rents) price parity
    #[arg(long)]
    pub housing_rpp: Option<Decimal>,

    /// Utilities price parity
    #[arg(long)]
    pub utilities: Option<Decimal>,

    /// Other services price parity
    #[arg(long)]
    pub other_services: Option<Decimal>,

    /// Per-capita personal income
    #[arg(long)]
    pub per_capita_income: Option<Decimal>,

    /// Per-capita disposable income
    #[arg(long)]
    pub disposable_income: Option<Decimal>,

    /// Effective tax rate in percent, used only without a state
    #[arg(long)]
    pub effective_tax_rate: Option<Decimal>,

    /// Median home price
    #[arg(long)]
    pub median_home_price: Option<Decimal>,

    /// Annual property tax rate (0.011 = 1.1%)
    #[arg(long)]
    pub property_tax_rate: Option<Decimal>,

    #[command(flatten)]
    pub persona: PersonaArgs,
}

impl AnalyzeArgs {
    fn profile_from_flags(&self) -> CityFinancialProfile {
        CityFinancialProfile {
            state: self.state.clone(),
            price_parities: RegionalPriceParities {
                all_items: self.all_items,
                goods: self.goods,
                housing: self.housing_rpp,
                utilities: self.utilities,
                other_services: self.other_services,
            },
            income: IncomeFigures {
                per_capita_income: self.per_capita_income,
                per_capita_disposable_income: self.disposable_income,
            },
            effective_tax_rate_pct: self.effective_tax_rate,
            median_home_price: self.median_home_price,
            property_tax_rate: self.property_tax_rate,
        }
    }
}

pub fn run_analyze(args: AnalyzeArgs, rates: &RateTables) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis: CityAnalysisInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        if args.state.is_none() && args.all_items.is_none() && args.median_home_price.is_none() {
            return Err("--state, --all-items or --median-home-price is required (or provide --input)".into());
        }
        CityAnalysisInput {
            profile: args.profile_from_flags(),
            persona: PersonaConfiguration::default(),
        }
    };

    let analysis = CityAnalysisInput {
        persona: args.persona.apply(analysis.persona),
        profile: analysis.profile,
    };

    let output = analyze_city(&analysis, rates)?;
    Ok(serde_json::to_value(output)?)
}
