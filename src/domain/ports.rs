use crate::domain::model::{UsageRecord, UsageRow};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

/// Generic query interface over the daily usage table.
pub trait UsageTable: Send + Sync {
    fn select_by_date(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<UsageRow>>> + Send;
    fn insert(&self, record: UsageRecord) -> impl std::future::Future<Output = Result<()>> + Send;
    fn update_count(
        &self,
        id: i64,
        count: u32,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Electricity-to-carbon conversion offered by a remote service.
#[async_trait]
pub trait CarbonApi: Send + Sync {
    /// Returns the estimate in metric tons of CO2.
    async fn estimate_electricity(&self, usage_kwh: f64, country: &str) -> Result<f64>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
