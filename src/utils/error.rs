use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status} for {endpoint}: {body}")]
    ApiStatusError {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Not signed in: {message}")]
    Unauthenticated { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::ApiError(_) => ErrorCategory::Network,
            DashError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Authentication
            }
            DashError::ApiStatusError { .. } => ErrorCategory::Network,
            DashError::Unauthenticated { .. } => ErrorCategory::Authentication,
            DashError::ConfigError { .. }
            | DashError::ConfigValidationError { .. }
            | DashError::MissingConfigError { .. }
            | DashError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DashError::SerializationError(_)
            | DashError::CsvError(_)
            | DashError::ValidationError { .. } => ErrorCategory::Data,
            DashError::IoError(_) | DashError::ZipError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常重試即可
            DashError::ApiError(_) => ErrorSeverity::Medium,
            DashError::ApiStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            DashError::ApiStatusError { .. } => ErrorSeverity::High,
            DashError::ValidationError { .. } => ErrorSeverity::High,
            DashError::Unauthenticated { .. } => ErrorSeverity::High,
            DashError::SerializationError(_) | DashError::CsvError(_) => ErrorSeverity::High,
            DashError::ConfigError { .. }
            | DashError::ConfigValidationError { .. }
            | DashError::MissingConfigError { .. }
            | DashError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
            DashError::IoError(_) | DashError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DashError::ApiError(_) => {
                "Check that the dashboard API is running and reachable, then retry".to_string()
            }
            DashError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                "The session token was rejected; sign in again and pass the new token".to_string()
            }
            DashError::ApiStatusError { status, .. } if *status >= 500 => {
                "The API failed internally; retry later".to_string()
            }
            DashError::ApiStatusError { .. } => {
                "Check the identifiers and values sent to the API".to_string()
            }
            DashError::Unauthenticated { .. } => {
                "Pass --token, set LIFEBOARD_TOKEN, or point --session-file at a saved session"
                    .to_string()
            }
            DashError::ConfigError { .. } | DashError::ConfigValidationError { .. } => {
                "Review the configuration file syntax and values".to_string()
            }
            DashError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            DashError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            DashError::ValidationError { .. } => "Fix the input values and try again".to_string(),
            DashError::SerializationError(_) | DashError::CsvError(_) => {
                "The API response did not match the expected shape".to_string()
            }
            DashError::IoError(_) | DashError::ZipError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not talk to the dashboard API ({})", self),
            ErrorCategory::Authentication => format!("Authentication problem: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::Storage => format!("Could not write output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
