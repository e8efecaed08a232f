use crate::core::usage_counter::UsageCounter;
use crate::domain::model::{EmissionsEstimate, EstimateSource, Notice};
use crate::domain::ports::{CarbonApi, UsageTable};

/// Successful carbon API calls allowed per UTC day.
pub const DAILY_API_LIMIT: u32 = 3;

/// Fallback factor, kg CO2 per kWh.
pub const STATIC_KG_PER_KWH: f64 = 0.5;

/// kg CO2 per km travelled, whatever the mode.
pub const COMMUTE_KG_PER_KM: f64 = 0.12;

pub const DEFAULT_COUNTRY: &str = "US";

pub fn static_emissions(usage_kwh: f64) -> f64 {
    sanitize(usage_kwh) * STATIC_KG_PER_KWH
}

pub fn commute_emissions(weekly_travel_km: f64) -> f64 {
    sanitize(weekly_travel_km) * COMMUTE_KG_PER_KM
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EstimateOutcome {
    pub estimate: EmissionsEstimate,
    pub notices: Vec<Notice>,
}

impl EstimateOutcome {
    fn from_static(usage_kwh: f64, notices: Vec<Notice>) -> Self {
        Self {
            estimate: EmissionsEstimate {
                source: EstimateSource::Static,
                value_kg_co2: static_emissions(usage_kwh),
            },
            notices,
        }
    }
}

/// Quota-gated electricity emissions with a static fallback.
pub struct EmissionsEstimator<T: UsageTable, A: CarbonApi> {
    counter: UsageCounter<T>,
    api: A,
    default_country: String,
}

impl<T: UsageTable, A: CarbonApi> EmissionsEstimator<T, A> {
    pub fn new(counter: UsageCounter<T>, api: A) -> Self {
        Self {
            counter,
            api,
            default_country: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn with_default_country(mut self, country: &str) -> Self {
        self.default_country = country.to_string();
        self
    }

    pub fn counter(&self) -> &UsageCounter<T> {
        &self.counter
    }

    pub async fn estimate(&self, usage_kwh: f64, country: Option<&str>) -> EstimateOutcome {
        let mut notices = Vec::new();
        let usage_kwh = sanitize(usage_kwh);
        let country = country.unwrap_or(self.default_country.as_str());

        let used_today = match self.counter.try_today_count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Error reading API usage data: {}", e);
                notices.push(Notice::UsageUnavailable {
                    message: e.to_string(),
                });
                0
            }
        };

        if used_today >= DAILY_API_LIMIT {
            tracing::warn!(
                "API limit reached ({}/{}), using static calculation",
                used_today,
                DAILY_API_LIMIT
            );
            notices.push(Notice::QuotaReached {
                count: used_today,
                limit: DAILY_API_LIMIT,
            });
            return EstimateOutcome::from_static(usage_kwh, notices);
        }

        match self.api.estimate_electricity(usage_kwh, country).await {
            Ok(carbon_mt) if !(carbon_mt * 1000.0).is_finite() => {
                tracing::error!("Carbon API estimate out of range: {} metric tons", carbon_mt);
                notices.push(Notice::EstimateApiFailed {
                    message: format!("the carbon service returned an unusable estimate ({})", carbon_mt),
                });
                EstimateOutcome::from_static(usage_kwh, notices)
            }
            Ok(carbon_mt) => {
                if let Err(e) = self.counter.try_increment().await {
                    tracing::error!("Error updating API usage data: {}", e);
                    notices.push(Notice::UsageNotRecorded {
                        message: e.to_string(),
                    });
                }
                let value_kg_co2 = carbon_mt * 1000.0;
                tracing::info!("Carbon API estimate: {:.2} kg CO2 for {} kWh", value_kg_co2, usage_kwh);
                EstimateOutcome {
                    estimate: EmissionsEstimate {
                        source: EstimateSource::Api,
                        value_kg_co2,
                    },
                    notices,
                }
            }
            Err(e) => {
                tracing::error!("Error fetching emissions data: {} ({:?})", e, e.category());
                notices.push(Notice::EstimateApiFailed {
                    message: e.user_friendly_message(),
                });
                EstimateOutcome::from_static(usage_kwh, notices)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryUsageTable;
    use crate::domain::model::{UsageRecord, UsageRow};
    use crate::domain::ports::FixedClock;
    use crate::utils::error::{GreenMeError, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[derive(Clone)]
    struct StubApi {
        carbon_mt: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl StubApi {
        fn returning(carbon_mt: f64) -> Self {
            Self {
                carbon_mt: Some(carbon_mt),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                carbon_mt: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CarbonApi for StubApi {
        async fn estimate_electricity(&self, _usage_kwh: f64, _country: &str) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.carbon_mt.ok_or_else(|| GreenMeError::UnexpectedStatus {
                service: "stub".to_string(),
                status: 500,
                body: String::new(),
            })
        }
    }

    struct ReadOnlyTable;

    impl UsageTable for ReadOnlyTable {
        async fn select_by_date(&self, _date: NaiveDate) -> Result<Vec<UsageRow>> {
            Ok(Vec::new())
        }

        async fn insert(&self, _record: UsageRecord) -> Result<()> {
            Err(GreenMeError::usage_store("read-only"))
        }

        async fn update_count(&self, _id: i64, _count: u32) -> Result<()> {
            Err(GreenMeError::usage_store("read-only"))
        }
    }

    struct UnreachableTable;

    impl UsageTable for UnreachableTable {
        async fn select_by_date(&self, _date: NaiveDate) -> Result<Vec<UsageRow>> {
            Err(GreenMeError::usage_store("timeout"))
        }

        async fn insert(&self, _record: UsageRecord) -> Result<()> {
            Err(GreenMeError::usage_store("timeout"))
        }

        async fn update_count(&self, _id: i64, _count: u32) -> Result<()> {
            Err(GreenMeError::usage_store("timeout"))
        }
    }

    fn table_with_count(count: u32) -> MemoryUsageTable {
        MemoryUsageTable::with_rows(vec![UsageRow {
            id: 1,
            date: today(),
            count,
        }])
    }

    fn estimator<T: UsageTable>(table: T, api: StubApi) -> EmissionsEstimator<T, StubApi> {
        EmissionsEstimator::new(UsageCounter::with_clock(table, FixedClock(today())), api)
    }

    #[test]
    fn test_static_formula() {
        for usage in [0.0, 1.0, 100.0, 12.34] {
            assert_eq!(static_emissions(usage), usage * 0.5);
        }
        assert_eq!(static_emissions(-5.0), 0.0);
        assert_eq!(static_emissions(f64::NAN), 0.0);
    }

    #[test]
    fn test_commute_formula() {
        assert!((commute_emissions(50.0) - 6.0).abs() < 1e-9);
        assert_eq!(commute_emissions(0.0), 0.0);
    }

    #[tokio::test]
    async fn test_api_success_converts_tons_and_counts_call() {
        let table = MemoryUsageTable::new();
        let api = StubApi::returning(0.05);
        let estimator = estimator(table.clone(), api.clone());

        let outcome = estimator.estimate(100.0, None).await;

        assert_eq!(outcome.estimate.source, EstimateSource::Api);
        assert!((outcome.estimate.value_kg_co2 - 50.0).abs() < 1e-9);
        assert!(outcome.notices.is_empty());
        assert_eq!(api.calls(), 1);
        assert_eq!(table.rows().await[0].count, 1);
    }

    #[tokio::test]
    async fn test_quota_reached_skips_api() {
        let table = table_with_count(3);
        let api = StubApi::returning(0.05);
        let estimator = estimator(table.clone(), api.clone());

        let outcome = estimator.estimate(100.0, None).await;

        assert_eq!(api.calls(), 0);
        assert_eq!(outcome.estimate.source, EstimateSource::Static);
        assert_eq!(outcome.estimate.value_kg_co2, 50.0);
        assert_eq!(
            outcome.notices,
            vec![Notice::QuotaReached { count: 3, limit: 3 }]
        );
        assert_eq!(table.rows().await[0].count, 3);
    }

    #[tokio::test]
    async fn test_last_allowed_call_still_uses_api() {
        let table = table_with_count(2);
        let api = StubApi::returning(0.01);
        let estimator = estimator(table.clone(), api.clone());

        let outcome = estimator.estimate(20.0, Some("GB")).await;

        assert_eq!(api.calls(), 1);
        assert_eq!(outcome.estimate.source, EstimateSource::Api);
        assert_eq!(table.rows().await[0].count, 3);
    }

    #[tokio::test]
    async fn test_api_failure_falls_back_without_counting() {
        let table = table_with_count(1);
        let api = StubApi::failing();
        let estimator = estimator(table.clone(), api.clone());

        let outcome = estimator.estimate(100.0, None).await;

        assert_eq!(api.calls(), 1);
        assert_eq!(outcome.estimate.source, EstimateSource::Static);
        assert_eq!(outcome.estimate.value_kg_co2, 50.0);
        assert!(matches!(
            outcome.notices.as_slice(),
            [Notice::EstimateApiFailed { .. }]
        ));
        assert_eq!(table.rows().await[0].count, 1);
    }

    #[tokio::test]
    async fn test_overflowing_api_value_falls_back_without_counting() {
        let table = table_with_count(1);
        let api = StubApi::returning(1e306);
        let estimator = estimator(table.clone(), api.clone());

        let outcome = estimator.estimate(100.0, None).await;

        assert_eq!(api.calls(), 1);
        assert_eq!(outcome.estimate.source, EstimateSource::Static);
        assert_eq!(outcome.estimate.value_kg_co2, 50.0);
        assert!(outcome.estimate.value_kg_co2.is_finite());
        assert!(matches!(
            outcome.notices.as_slice(),
            [Notice::EstimateApiFailed { .. }]
        ));
        assert_eq!(table.rows().await[0].count, 1);
    }

    #[tokio::test]
    async fn test_failed_usage_write_keeps_api_value() {
        let api = StubApi::returning(0.2);
        let estimator = estimator(ReadOnlyTable, api.clone());

        let outcome = estimator.estimate(400.0, None).await;

        assert_eq!(outcome.estimate.source, EstimateSource::Api);
        assert!((outcome.estimate.value_kg_co2 - 200.0).abs() < 1e-9);
        assert!(matches!(
            outcome.notices.as_slice(),
            [Notice::UsageNotRecorded { .. }]
        ));
    }

    #[tokio::test]
    async fn test_unreadable_usage_counts_as_zero() {
        let api = StubApi::returning(0.05);
        let estimator = estimator(UnreachableTable, api.clone());

        let outcome = estimator.estimate(100.0, None).await;

        assert_eq!(api.calls(), 1);
        assert_eq!(outcome.estimate.source, EstimateSource::Api);
        assert!(matches!(
            outcome.notices.as_slice(),
            [Notice::UsageUnavailable { .. }, Notice::UsageNotRecorded { .. }]
        ));
    }
}
