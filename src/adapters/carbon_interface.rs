use super::{build_client, ensure_success};
use crate::domain::ports::CarbonApi;
use crate::utils::error::{GreenMeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "Carbon Interface";

pub const DEFAULT_ENDPOINT: &str = "https://www.carboninterface.com/api/v1";

#[derive(Debug, Serialize)]
struct ElectricityEstimateRequest<'a> {
    r#type: &'a str,
    electricity_unit: &'a str,
    electricity_value: f64,
    country: &'a str,
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    data: EstimateData,
}

#[derive(Debug, Deserialize)]
struct EstimateData {
    attributes: EstimateAttributes,
}

#[derive(Debug, Deserialize)]
struct EstimateAttributes {
    carbon_mt: f64,
}

pub struct CarbonInterfaceClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl CarbonInterfaceClient {
    pub fn new(endpoint: &str, api_key: &str, timeout_seconds: u64) -> Self {
        Self {
            client: build_client(timeout_seconds),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl CarbonApi for CarbonInterfaceClient {
    async fn estimate_electricity(&self, usage_kwh: f64, country: &str) -> Result<f64> {
        let url = format!("{}/estimates", self.endpoint);
        let body = ElectricityEstimateRequest {
            r#type: "electricity",
            electricity_unit: "kwh",
            electricity_value: usage_kwh,
            country,
        };

        tracing::debug!("Requesting electricity estimate from {} ({} kWh, {})", url, usage_kwh, country);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let text = response.text().await?;
        let parsed: EstimateResponse = serde_json::from_str(&text)
            .map_err(|e| GreenMeError::malformed(SERVICE, e.to_string()))?;

        let carbon_mt = parsed.data.attributes.carbon_mt;
        if !carbon_mt.is_finite() || carbon_mt < 0.0 {
            return Err(GreenMeError::malformed(
                SERVICE,
                format!("carbon_mt must be a non-negative number, got {}", carbon_mt),
            ));
        }
        Ok(carbon_mt)
    }
}
