use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreenMeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{service} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("Usage store error: {message}")]
    UsageStoreError { message: String },

    #[error("Prompt template is missing variable '{variable}'")]
    TemplateError { variable: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    ExternalService,
    Storage,
    Configuration,
    Input,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GreenMeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GreenMeError::ApiError(_) => ErrorCategory::Network,
            GreenMeError::UnexpectedStatus { .. } | GreenMeError::MalformedResponse { .. } => {
                ErrorCategory::ExternalService
            }
            GreenMeError::IoError(_) | GreenMeError::UsageStoreError { .. } => {
                ErrorCategory::Storage
            }
            GreenMeError::ConfigError { .. }
            | GreenMeError::ConfigValidationError { .. }
            | GreenMeError::InvalidConfigValueError { .. }
            | GreenMeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            GreenMeError::ValidationError { .. } => ErrorCategory::Input,
            GreenMeError::CsvError(_)
            | GreenMeError::SerializationError(_)
            | GreenMeError::TemplateError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::ExternalService => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GreenMeError::ApiError(_) => "Check your network connection and try again",
            GreenMeError::UnexpectedStatus { status, .. } if *status == 401 || *status == 403 => {
                "Check that the API key in your configuration is valid"
            }
            GreenMeError::UnexpectedStatus { status, .. } if *status == 429 => {
                "The service is rate limiting requests, wait a moment before retrying"
            }
            GreenMeError::UnexpectedStatus { .. } | GreenMeError::MalformedResponse { .. } => {
                "The remote service may be unavailable, try again later"
            }
            GreenMeError::IoError(_) => "Check file paths and permissions",
            GreenMeError::UsageStoreError { .. } => {
                "Check the [usage] section of your configuration"
            }
            GreenMeError::ConfigError { .. }
            | GreenMeError::ConfigValidationError { .. }
            | GreenMeError::InvalidConfigValueError { .. } => {
                "Review your greenme.toml against the sample configuration"
            }
            GreenMeError::MissingConfigError { .. } => {
                "Add the missing value to greenme.toml or export the referenced environment variable"
            }
            GreenMeError::ValidationError { .. } => "Correct the household details and submit again",
            GreenMeError::CsvError(_)
            | GreenMeError::SerializationError(_)
            | GreenMeError::TemplateError { .. } => "This is a bug, please report it",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GreenMeError::ApiError(_) => "Could not reach a remote service".to_string(),
            GreenMeError::UnexpectedStatus {
                service, status, ..
            } => format!("{} answered with HTTP {}", service, status),
            GreenMeError::MalformedResponse { service, .. } => {
                format!("{} sent a response we could not understand", service)
            }
            GreenMeError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            GreenMeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            GreenMeError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn usage_store(message: impl Into<String>) -> Self {
        GreenMeError::UsageStoreError {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(service: &str, message: impl Into<String>) -> Self {
        GreenMeError::MalformedResponse {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GreenMeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = GreenMeError::MissingConfigError {
            field: "carbon.api_key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("carbon.api_key"));
    }

    #[test]
    fn test_unauthorized_status_suggests_checking_key() {
        let err = GreenMeError::UnexpectedStatus {
            service: "Carbon Interface".to_string(),
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("API key"));
    }
}
