use super::{build_client, ensure_success};
use crate::domain::model::{UsageRecord, UsageRow};
use crate::domain::ports::UsageTable;
use crate::utils::error::Result;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;

const SERVICE: &str = "Supabase";

/// Usage table served by a Supabase (PostgREST) project.
#[derive(Debug, Clone)]
pub struct SupabaseUsageTable {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

#[derive(Serialize)]
struct CountPatch {
    count: u32,
}

impl SupabaseUsageTable {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout_seconds: u64) -> Self {
        Self {
            client: build_client(timeout_seconds),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

impl UsageTable for SupabaseUsageTable {
    async fn select_by_date(&self, date: NaiveDate) -> Result<Vec<UsageRow>> {
        tracing::debug!("Selecting usage rows for {} from {}", date, self.table);
        let request = self
            .client
            .get(self.table_url())
            .query(&[("date", format!("eq.{}", date)), ("select", "*".to_string())]);
        let response = self.authorized(request).send().await?;
        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json::<Vec<UsageRow>>().await?)
    }

    async fn insert(&self, record: UsageRecord) -> Result<()> {
        tracing::debug!("Inserting usage row {:?} into {}", record, self.table);
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=minimal")
            .json(&record);
        let response = self.authorized(request).send().await?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    async fn update_count(&self, id: i64, count: u32) -> Result<()> {
        tracing::debug!("Updating usage row {} to count {}", id, count);
        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(&CountPatch { count });
        let response = self.authorized(request).send().await?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }
}
