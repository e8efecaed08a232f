use crate::core::prompt::ReportTemplate;
use crate::domain::model::{HouseholdProfile, RecycledMaterial, TransportMode};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "greenme")]
#[command(about = "Estimate your household carbon footprint and get personalised eco tips")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "greenme.toml")]
    pub config: String,

    #[arg(long, alias = "name", default_value = "")]
    pub nickname: String,

    #[arg(long, alias = "location", default_value = "")]
    pub region: String,

    #[arg(long, alias = "household-size", default_value_t = 1)]
    pub family_size: u32,

    /// Monthly energy use (kWh)
    #[arg(long, default_value_t = 0.0)]
    pub energy_kwh: f64,

    /// Share of energy from renewables (%)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub renewable_percent: u8,

    /// Monthly water use (liters)
    #[arg(long, default_value_t = 0.0)]
    pub water_liters: f64,

    /// Weekly travel distance (km)
    #[arg(long, alias = "weekly-commute-km", default_value_t = 0.0)]
    pub weekly_travel_km: f64,

    #[arg(long, alias = "vehicle", value_enum, default_value_t = TransportMode::Car)]
    pub transport_mode: TransportMode,

    /// Weekly waste (kg)
    #[arg(long, default_value_t = 0.0)]
    pub weekly_waste_kg: f64,

    /// Recycled materials, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub recycle: Vec<RecycledMaterial>,

    /// Country code sent to the carbon API (defaults to carbon.default_country)
    #[arg(long)]
    pub country: Option<String>,

    /// Override report.template from config
    #[arg(long, value_enum)]
    pub template: Option<ReportTemplate>,

    /// Write the emissions breakdown to this CSV file (dry runs export the static breakdown)
    #[arg(long)]
    pub export_csv: Option<String>,

    /// Show the prompt and static estimate without calling any service
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn profile(&self) -> HouseholdProfile {
        HouseholdProfile {
            nickname: self.nickname.clone(),
            region: self.region.clone(),
            family_size: self.family_size,
            monthly_energy_kwh: self.energy_kwh,
            renewable_percent: self.renewable_percent,
            monthly_water_liters: self.water_liters,
            weekly_travel_km: self.weekly_travel_km,
            transport_mode: self.transport_mode,
            weekly_waste_kg: self.weekly_waste_kg,
            recycled: self.recycle.clone(),
        }
    }
}
