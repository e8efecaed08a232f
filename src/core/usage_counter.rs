use crate::domain::model::UsageRecord;
use crate::domain::ports::{Clock, UsageTable, UtcClock};
use crate::utils::error::Result;

/// Per-day count of successful carbon API calls.
///
/// The read-then-write in `increment` is not atomic: two submissions racing
/// on the same day can lose an update.
pub struct UsageCounter<T: UsageTable> {
    table: T,
    clock: Box<dyn Clock>,
}

impl<T: UsageTable> UsageCounter<T> {
    pub fn new(table: T) -> Self {
        Self::with_clock(table, UtcClock)
    }

    pub fn with_clock(table: T, clock: impl Clock + 'static) -> Self {
        Self {
            table,
            clock: Box::new(clock),
        }
    }

    pub async fn try_today_count(&self) -> Result<u32> {
        let today = self.clock.today();
        let rows = self.table.select_by_date(today).await?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// Today's count, or 0 when the table cannot be read.
    pub async fn today_count(&self) -> u32 {
        match self.try_today_count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Error reading API usage data: {}", e);
                0
            }
        }
    }

    pub async fn try_increment(&self) -> Result<()> {
        let today = self.clock.today();
        let rows = self.table.select_by_date(today).await?;

        match rows.first() {
            Some(row) => {
                let new_count = row.count.saturating_add(1);
                tracing::debug!("Usage for {} now {}", today, new_count);
                self.table.update_count(row.id, new_count).await
            }
            None => {
                tracing::debug!("First API call recorded for {}", today);
                self.table
                    .insert(UsageRecord {
                        date: today,
                        count: 1,
                    })
                    .await
            }
        }
    }

    /// Best effort: a failed write is logged and dropped.
    pub async fn increment(&self) {
        if let Err(e) = self.try_increment().await {
            tracing::error!("Error updating API usage data: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryUsageTable;
    use crate::domain::model::UsageRow;
    use crate::domain::ports::FixedClock;
    use crate::utils::error::GreenMeError;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    struct BrokenTable;

    impl UsageTable for BrokenTable {
        async fn select_by_date(&self, _date: NaiveDate) -> Result<Vec<UsageRow>> {
            Err(GreenMeError::usage_store("connection refused"))
        }

        async fn insert(&self, _record: UsageRecord) -> Result<()> {
            Err(GreenMeError::usage_store("connection refused"))
        }

        async fn update_count(&self, _id: i64, _count: u32) -> Result<()> {
            Err(GreenMeError::usage_store("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_count_is_zero_without_record() {
        let counter = UsageCounter::with_clock(MemoryUsageTable::new(), FixedClock(day(18)));
        assert_eq!(counter.today_count().await, 0);
    }

    #[tokio::test]
    async fn test_count_only_reads_today() {
        let table = MemoryUsageTable::with_rows(vec![UsageRow {
            id: 1,
            date: day(17),
            count: 3,
        }]);
        let counter = UsageCounter::with_clock(table, FixedClock(day(18)));
        assert_eq!(counter.today_count().await, 0);
    }

    #[tokio::test]
    async fn test_increment_creates_record_with_count_one() {
        let table = MemoryUsageTable::new();
        let counter = UsageCounter::with_clock(table.clone(), FixedClock(day(18)));

        counter.increment().await;

        let rows = table.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(18));
        assert_eq!(rows[0].count, 1);
    }

    #[tokio::test]
    async fn test_increment_existing_record_adds_one() {
        let table = MemoryUsageTable::with_rows(vec![UsageRow {
            id: 4,
            date: day(18),
            count: 2,
        }]);
        let counter = UsageCounter::with_clock(table.clone(), FixedClock(day(18)));

        counter.increment().await;

        assert_eq!(counter.today_count().await, 3);
        assert_eq!(table.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn test_broken_table_reads_as_zero_and_ignores_writes() {
        let counter = UsageCounter::with_clock(BrokenTable, FixedClock(day(18)));

        assert_eq!(counter.today_count().await, 0);
        assert!(counter.try_today_count().await.is_err());

        counter.increment().await;
        assert!(counter.try_increment().await.is_err());
    }
}
