use crate::adapters::{carbon_interface, cohere};
use crate::core::emissions::DEFAULT_COUNTRY;
use crate::core::prompt::ReportTemplate;
use crate::utils::error::{GreenMeError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_required_field, validate_secret, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_USAGE_PATH: &str = "./greenme-usage.json";
const DEFAULT_USAGE_TABLE: &str = "api_usage";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreenMeConfig {
    pub carbon: CarbonConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub usage: UsageConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonConfig {
    pub endpoint: Option<String>,
    pub api_key: String,
    pub default_country: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: Option<String>,
    pub api_key: String,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageBackend {
    #[default]
    File,
    Supabase,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageConfig {
    #[serde(default)]
    pub backend: UsageBackend,
    pub path: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub table: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub template: ReportTemplate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub level: Option<String>,
}

impl GreenMeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GreenMeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GreenMeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CARBON_API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GreenMeError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("carbon.endpoint", self.carbon_endpoint())?;
        validate_secret("carbon.api_key", &self.carbon.api_key)?;
        validate_non_empty_string("carbon.default_country", self.default_country())?;
        validate_positive_number("carbon.timeout_seconds", self.carbon_timeout(), 1)?;

        validate_url("llm.endpoint", self.llm_endpoint())?;
        validate_secret("llm.api_key", &self.llm.api_key)?;
        validate_positive_number("llm.max_tokens", u64::from(self.max_tokens()), 1)?;
        validate_range("llm.temperature", self.temperature(), 0.0, 5.0)?;
        validate_positive_number("llm.timeout_seconds", self.llm_timeout(), 1)?;

        match self.usage.backend {
            UsageBackend::File => validate_path("usage.path", self.usage_path())?,
            UsageBackend::Supabase => {
                let url = validate_required_field("usage.supabase_url", &self.usage.supabase_url)?;
                validate_url("usage.supabase_url", url)?;
                let key = validate_required_field("usage.supabase_key", &self.usage.supabase_key)?;
                validate_secret("usage.supabase_key", key)?;
                validate_non_empty_string("usage.table", self.usage_table())?;
            }
            UsageBackend::Memory => {}
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.log_format()) {
            return Err(GreenMeError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: self.log_format().to_string(),
                reason: format!("Unsupported format. Valid formats: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }

    pub fn carbon_endpoint(&self) -> &str {
        self.carbon
            .endpoint
            .as_deref()
            .unwrap_or(carbon_interface::DEFAULT_ENDPOINT)
    }

    pub fn default_country(&self) -> &str {
        self.carbon
            .default_country
            .as_deref()
            .unwrap_or(DEFAULT_COUNTRY)
    }

    pub fn carbon_timeout(&self) -> u64 {
        self.carbon.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn llm_endpoint(&self) -> &str {
        self.llm.endpoint.as_deref().unwrap_or(cohere::DEFAULT_ENDPOINT)
    }

    pub fn max_tokens(&self) -> u32 {
        self.llm.max_tokens.unwrap_or(cohere::DEFAULT_MAX_TOKENS)
    }

    pub fn temperature(&self) -> f64 {
        self.llm.temperature.unwrap_or(cohere::DEFAULT_TEMPERATURE)
    }

    pub fn llm_timeout(&self) -> u64 {
        self.llm.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn usage_path(&self) -> &str {
        self.usage.path.as_deref().unwrap_or(DEFAULT_USAGE_PATH)
    }

    pub fn usage_table(&self) -> &str {
        self.usage.table.as_deref().unwrap_or(DEFAULT_USAGE_TABLE)
    }

    pub fn usage_timeout(&self) -> u64 {
        self.usage.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn log_format(&self) -> &str {
        self.logging.format.as_deref().unwrap_or("compact")
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.level.as_deref()
    }
}

impl Validate for GreenMeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
