// App layer: wires configuration into concrete adapters and the submission engine.

use crate::adapters::{
    CarbonInterfaceClient, CohereGenerator, JsonFileUsageTable, MemoryUsageTable,
    SupabaseUsageTable,
};
use crate::config::{GreenMeConfig, UsageBackend};
use crate::core::emissions::EmissionsEstimator;
use crate::core::engine::GreenMeEngine;
use crate::core::prompt::ReportTemplate;
use crate::core::report::ReportComposer;
use crate::core::usage_counter::UsageCounter;
use crate::domain::model::{UsageRecord, UsageRow};
use crate::domain::ports::UsageTable;
use crate::utils::error::{GreenMeError, Result};
use chrono::NaiveDate;

/// Usage table chosen at runtime from `[usage].backend`.
pub enum ConfiguredUsageTable {
    File(JsonFileUsageTable),
    Supabase(SupabaseUsageTable),
    Memory(MemoryUsageTable),
}

impl ConfiguredUsageTable {
    pub fn from_config(config: &GreenMeConfig) -> Result<Self> {
        match config.usage.backend {
            UsageBackend::File => Ok(Self::File(JsonFileUsageTable::new(config.usage_path()))),
            UsageBackend::Supabase => {
                let url = config.usage.supabase_url.as_deref().ok_or_else(|| {
                    GreenMeError::MissingConfigError {
                        field: "usage.supabase_url".to_string(),
                    }
                })?;
                let key = config.usage.supabase_key.as_deref().ok_or_else(|| {
                    GreenMeError::MissingConfigError {
                        field: "usage.supabase_key".to_string(),
                    }
                })?;
                Ok(Self::Supabase(SupabaseUsageTable::new(
                    url,
                    key,
                    config.usage_table(),
                    config.usage_timeout(),
                )))
            }
            UsageBackend::Memory => Ok(Self::Memory(MemoryUsageTable::new())),
        }
    }
}

impl UsageTable for ConfiguredUsageTable {
    async fn select_by_date(&self, date: NaiveDate) -> Result<Vec<UsageRow>> {
        match self {
            Self::File(table) => table.select_by_date(date).await,
            Self::Supabase(table) => table.select_by_date(date).await,
            Self::Memory(table) => table.select_by_date(date).await,
        }
    }

    async fn insert(&self, record: UsageRecord) -> Result<()> {
        match self {
            Self::File(table) => table.insert(record).await,
            Self::Supabase(table) => table.insert(record).await,
            Self::Memory(table) => table.insert(record).await,
        }
    }

    async fn update_count(&self, id: i64, count: u32) -> Result<()> {
        match self {
            Self::File(table) => table.update_count(id, count).await,
            Self::Supabase(table) => table.update_count(id, count).await,
            Self::Memory(table) => table.update_count(id, count).await,
        }
    }
}

pub type ConfiguredEngine = GreenMeEngine<ConfiguredUsageTable, CarbonInterfaceClient, CohereGenerator>;

/// Builds the engine from validated configuration. `template` overrides `[report].template`.
pub fn build_engine(
    config: &GreenMeConfig,
    template: Option<ReportTemplate>,
) -> Result<ConfiguredEngine> {
    let table = ConfiguredUsageTable::from_config(config)?;
    let carbon = CarbonInterfaceClient::new(
        config.carbon_endpoint(),
        &config.carbon.api_key,
        config.carbon_timeout(),
    );
    let estimator = EmissionsEstimator::new(UsageCounter::new(table), carbon)
        .with_default_country(config.default_country());

    let generator = CohereGenerator::new(config.llm_endpoint(), &config.llm.api_key, config.llm_timeout())
        .with_model(config.llm.model.clone())
        .with_sampling(config.max_tokens(), config.temperature());
    let template = template.unwrap_or(config.report.template);
    tracing::debug!("Using {} report template, {:?} usage backend", template, config.usage.backend);

    Ok(GreenMeEngine::new(
        estimator,
        ReportComposer::new(generator, template),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(usage: &str) -> GreenMeConfig {
        GreenMeConfig::from_toml_str(&format!(
            r#"
[carbon]
api_key = "carbon-key"

[llm]
api_key = "cohere-key"

{}
"#,
            usage
        ))
        .unwrap()
    }

    #[test]
    fn test_backend_selection() {
        let table = ConfiguredUsageTable::from_config(&config("")).unwrap();
        assert!(matches!(table, ConfiguredUsageTable::File(_)));

        let table = ConfiguredUsageTable::from_config(&config("[usage]\nbackend = \"memory\"")).unwrap();
        assert!(matches!(table, ConfiguredUsageTable::Memory(_)));

        let table = ConfiguredUsageTable::from_config(&config(
            "[usage]\nbackend = \"supabase\"\nsupabase_url = \"https://x.supabase.co\"\nsupabase_key = \"k\"",
        ))
        .unwrap();
        assert!(matches!(table, ConfiguredUsageTable::Supabase(_)));
    }

    #[test]
    fn test_supabase_without_url_fails() {
        let result = ConfiguredUsageTable::from_config(&config("[usage]\nbackend = \"supabase\""));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_build_engine_with_template_override() {
        let engine = build_engine(&config("[usage]\nbackend = \"memory\""), Some(ReportTemplate::Detailed));
        assert!(engine.is_ok());
    }
}
