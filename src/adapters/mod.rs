// Adapters layer: concrete implementations of the domain ports (usage tables, carbon API, text generation).

pub mod carbon_interface;
pub mod cohere;
pub mod supabase;
pub mod usage_table;

pub use carbon_interface::CarbonInterfaceClient;
pub use cohere::CohereGenerator;
pub use supabase::SupabaseUsageTable;
pub use usage_table::{JsonFileUsageTable, MemoryUsageTable};

use crate::utils::error::{GreenMeError, Result};
use std::time::Duration;

pub(crate) fn build_client(timeout_seconds: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// Turns a non-2xx response into `UnexpectedStatus`, keeping a short body excerpt.
pub(crate) async fn ensure_success(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    tracing::debug!("{} response status: {}", service, status);
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GreenMeError::UnexpectedStatus {
        service: service.to_string(),
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}
