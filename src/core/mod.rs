pub mod emissions;
pub mod engine;
pub mod prompt;
pub mod report;
pub mod usage_counter;

pub use crate::domain::model::{
    EmissionsEstimate, EstimateSource, FootprintBreakdown, HouseholdProfile, Notice,
};
pub use crate::domain::ports::{CarbonApi, Clock, TextGenerator, UsageTable};
pub use crate::utils::error::Result;
