use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_negative, validate_range, Validate};

/// Number of successful carbon API calls made on one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub count: u32,
}

/// A `UsageRecord` as stored, with the id the table assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
    pub id: i64,
    pub date: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TransportMode {
    Car,
    Bike,
    Bus,
    Train,
    #[cfg_attr(feature = "cli", value(name = "electric-vehicle", alias = "ev"))]
    ElectricVehicle,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportMode::Car => "Car",
            TransportMode::Bike => "Bike",
            TransportMode::Bus => "Bus",
            TransportMode::Train => "Train",
            TransportMode::ElectricVehicle => "Electric Vehicle",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RecycledMaterial {
    Plastic,
    Glass,
    Paper,
    #[cfg_attr(feature = "cli", value(name = "e-waste", alias = "ewaste"))]
    EWaste,
    Other,
}

impl fmt::Display for RecycledMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecycledMaterial::Plastic => "Plastic",
            RecycledMaterial::Glass => "Glass",
            RecycledMaterial::Paper => "Paper",
            RecycledMaterial::EWaste => "E-waste",
            RecycledMaterial::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Lifestyle inputs for a single submission. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdProfile {
    pub nickname: String,
    pub region: String,
    pub family_size: u32,
    pub monthly_energy_kwh: f64,
    pub renewable_percent: u8,
    pub monthly_water_liters: f64,
    pub weekly_travel_km: f64,
    pub transport_mode: TransportMode,
    pub weekly_waste_kg: f64,
    pub recycled: Vec<RecycledMaterial>,
}

impl HouseholdProfile {
    /// Comma separated materials, or `none` when nothing is recycled.
    pub fn recycle_types(&self) -> String {
        if self.recycled.is_empty() {
            return "none".to_string();
        }
        self.recycled
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Validate for HouseholdProfile {
    fn validate(&self) -> Result<()> {
        if self.family_size < 1 {
            return Err(crate::utils::error::GreenMeError::ValidationError {
                message: "family_size must be at least 1".to_string(),
            });
        }
        validate_range("renewable_percent", self.renewable_percent, 0, 100)?;
        validate_non_negative("monthly_energy_kwh", self.monthly_energy_kwh)?;
        validate_non_negative("monthly_water_liters", self.monthly_water_liters)?;
        validate_non_negative("weekly_travel_km", self.weekly_travel_km)?;
        validate_non_negative("weekly_waste_kg", self.weekly_waste_kg)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Api,
    Static,
}

impl fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateSource::Api => f.write_str("api"),
            EstimateSource::Static => f.write_str("static"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionsEstimate {
    pub source: EstimateSource,
    pub value_kg_co2: f64,
}

/// A non-fatal problem the user should hear about after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    QuotaReached { count: u32, limit: u32 },
    EstimateApiFailed { message: String },
    UsageUnavailable { message: String },
    UsageNotRecorded { message: String },
    ReportFailed { message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::QuotaReached { count, limit } => write!(
                f,
                "API limit reached ({}/{} today)! Using static calculation.",
                count, limit
            ),
            Notice::EstimateApiFailed { message } => write!(
                f,
                "Error fetching emissions data: {}. Using static calculation.",
                message
            ),
            Notice::UsageUnavailable { message } => {
                write!(f, "Error reading API usage data: {}", message)
            }
            Notice::UsageNotRecorded { message } => {
                write!(f, "Error updating API usage data: {}", message)
            }
            Notice::ReportFailed { message } => write!(f, "Error generating tips: {}", message),
        }
    }
}

/// Per-category emissions plotted for the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FootprintBreakdown {
    pub energy_kg: f64,
    pub commute_kg: f64,
}

impl FootprintBreakdown {
    pub fn categories(&self) -> [(&'static str, f64); 2] {
        [("Energy", self.energy_kg), ("Commute", self.commute_kg)]
    }

    pub fn total_kg(&self) -> f64 {
        self.energy_kg + self.commute_kg
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Category", "CO2 Emissions (kg)"])?;
        for (category, value) in self.categories() {
            writer.write_record([category.to_string(), format!("{:.2}", value)])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::utils::error::GreenMeError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| crate::utils::error::GreenMeError::ValidationError {
            message: format!("CSV output is not UTF-8: {}", e),
        })
    }
}
