use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatusError { status: u16, url: String },

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

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CollectorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CollectorError::HttpError(_) | CollectorError::UpstreamStatusError { .. } => {
                ErrorCategory::Network
            }
            CollectorError::ConfigError { .. }
            | CollectorError::ConfigValidationError { .. }
            | CollectorError::InvalidConfigValueError { .. }
            | CollectorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CollectorError::IoError(_)
            | CollectorError::CsvError(_)
            | CollectorError::StorageError { .. } => ErrorCategory::Storage,
            CollectorError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 搜尋頁抓取失敗可重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CollectorError::HttpError(_) => {
                "Check network connectivity and the search/database endpoints, then retry"
            }
            CollectorError::UpstreamStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Verify the secret key and that the schema is exposed to the API"
            }
            CollectorError::UpstreamStatusError { .. } => {
                "The remote service rejected the request; retry later"
            }
            CollectorError::ConfigError { .. }
            | CollectorError::ConfigValidationError { .. }
            | CollectorError::InvalidConfigValueError { .. } => {
                "Review collector.toml against the documented sections"
            }
            CollectorError::MissingConfigError { .. } => {
                "Set the missing value in collector.toml or in the .env file"
            }
            CollectorError::IoError(_) | CollectorError::CsvError(_) => {
                "Check that the output directory exists and is writable"
            }
            CollectorError::StorageError { .. } => "Inspect the storage backend and retry the run",
            CollectorError::SerializationError(_) => {
                "The payload shape changed upstream; inspect the raw response"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Storage => format!("Could not persist results: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;
