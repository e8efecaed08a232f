use crate::domain::model::{UsageRecord, UsageRow};
use crate::domain::ports::UsageTable;
use crate::utils::error::{GreenMeError, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

fn next_id(rows: &[UsageRow]) -> i64 {
    rows.iter().map(|r| r.id).max().unwrap_or(0) + 1
}

fn insert_row(rows: &mut Vec<UsageRow>, record: UsageRecord) -> Result<()> {
    if rows.iter().any(|r| r.date == record.date) {
        return Err(GreenMeError::usage_store(format!(
            "a usage record for {} already exists",
            record.date
        )));
    }
    let id = next_id(rows);
    rows.push(UsageRow {
        id,
        date: record.date,
        count: record.count,
    });
    Ok(())
}

fn update_row(rows: &mut [UsageRow], id: i64, count: u32) -> Result<()> {
    let row = rows
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| GreenMeError::usage_store(format!("no usage record with id {}", id)))?;
    row.count = count;
    Ok(())
}

/// Process-local table. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryUsageTable {
    rows: Arc<Mutex<Vec<UsageRow>>>,
}

impl MemoryUsageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<UsageRow>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    pub async fn rows(&self) -> Vec<UsageRow> {
        self.rows.lock().await.clone()
    }
}

impl UsageTable for MemoryUsageTable {
    async fn select_by_date(&self, date: NaiveDate) -> Result<Vec<UsageRow>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|r| r.date == date).copied().collect())
    }

    async fn insert(&self, record: UsageRecord) -> Result<()> {
        let mut rows = self.rows.lock().await;
        insert_row(&mut rows, record)
    }

    async fn update_count(&self, id: i64, count: u32) -> Result<()> {
        let mut rows = self.rows.lock().await;
        update_row(&mut rows, id, count)
    }
}

/// Table kept as a JSON array of rows in a single local file.
#[derive(Debug, Clone)]
pub struct JsonFileUsageTable {
    path: PathBuf,
}

impl JsonFileUsageTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<UsageRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&self.path)?;
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    fn save(&self, rows: &[UsageRow]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(rows)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl UsageTable for JsonFileUsageTable {
    async fn select_by_date(&self, date: NaiveDate) -> Result<Vec<UsageRow>> {
        let rows = self.load()?;
        Ok(rows.into_iter().filter(|r| r.date == date).collect())
    }

    async fn insert(&self, record: UsageRecord) -> Result<()> {
        let mut rows = self.load()?;
        insert_row(&mut rows, record)?;
        tracing::debug!("Writing {} usage rows to {}", rows.len(), self.path.display());
        self.save(&rows)
    }

    async fn update_count(&self, id: i64, count: u32) -> Result<()> {
        let mut rows = self.load()?;
        update_row(&mut rows, id, count)?;
        self.save(&rows)
    }
}
