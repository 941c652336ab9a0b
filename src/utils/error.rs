use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration parse error in {field}: {message}")]
    ConfigParseError { field: String, message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Source data error: {message}")]
    SourceError { message: String },

    #[error("XML serialization error: {message}")]
    XmlError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Network,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl BridgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::ConfigParseError { .. }
            | BridgeError::MissingConfigError { .. }
            | BridgeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BridgeError::CsvError(_)
            | BridgeError::SpreadsheetError(_)
            | BridgeError::IoError(_)
            | BridgeError::SourceError { .. } => ErrorCategory::Source,
            BridgeError::ApiError(_) => ErrorCategory::Network,
            BridgeError::SerializationError(_) | BridgeError::XmlError { .. } => {
                ErrorCategory::Serialization
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Serialization => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Source => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            BridgeError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            BridgeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            BridgeError::ConfigParseError { message, .. } => {
                format!("Could not read configuration: {}", message)
            }
            BridgeError::IoError(e) => format!("File access failed: {}", e),
            BridgeError::SpreadsheetError(e) => format!("Could not read spreadsheet: {}", e),
            BridgeError::CsvError(e) => format!("Could not read CSV file: {}", e),
            BridgeError::SourceError { message } => format!("Source data problem: {}", message),
            BridgeError::ApiError(e) => format!("Could not reach the KoBo server: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check that the config file exists and sets parent_data_path, api_token and project_uuid"
            }
            ErrorCategory::Source => {
                "Check parent_data_path points to a readable .xlsx/.xls/.ods/.csv file with a header row"
            }
            ErrorCategory::Network => "Check network access to the endpoint and that the API token is valid",
            ErrorCategory::Serialization => "Inspect the offending row for characters XML cannot carry",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = BridgeError::MissingConfigError {
            field: "api_token".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("api_token"));
    }

    #[test]
    fn test_source_errors_are_critical() {
        let err = BridgeError::SourceError {
            message: "no sheets".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
