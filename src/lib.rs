pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::GreenMeConfig;

pub use app::{build_engine, ConfiguredEngine};
pub use core::engine::{GreenMeEngine, Preview, Submission};
pub use domain::model::{HouseholdProfile, Notice, RecycledMaterial, TransportMode};
pub use utils::error::{GreenMeError, Result};
