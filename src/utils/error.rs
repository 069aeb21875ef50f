use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Server returned {status} for {endpoint}")]
    HttpStatusError { endpoint: String, status: u16 },

    #[error("Unexpected response from {endpoint}: {message}")]
    DecodeError { endpoint: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Decode,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScheduleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScheduleError::NetworkError(_) | ScheduleError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            ScheduleError::DecodeError { .. } => ErrorCategory::Decode,
            ScheduleError::ConfigError { .. }
            | ScheduleError::InvalidConfigValueError { .. }
            | ScheduleError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScheduleError::IoError(_) | ScheduleError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    /// Fetch failures are retryable; configuration problems stop the binary.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Decode => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.severity() <= ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScheduleError::NetworkError(_) => "Could not reach the schedule server".to_string(),
            ScheduleError::HttpStatusError { status, .. } => {
                format!("The schedule server answered with status {}", status)
            }
            ScheduleError::DecodeError { .. } => {
                "The schedule server sent data in an unexpected format".to_string()
            }
            ScheduleError::IoError(e) => format!("File system error: {}", e),
            ScheduleError::SerializationError(e) => format!("Could not render output: {}", e),
            ScheduleError::ConfigError { message } => format!("Invalid configuration: {}", message),
            ScheduleError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            ScheduleError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScheduleError::NetworkError(_) => "Check connectivity and the base URL, then retry",
            ScheduleError::HttpStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check that the access token is valid"
            }
            ScheduleError::HttpStatusError { .. } => "Retry later; the server may be unavailable",
            ScheduleError::DecodeError { .. } => {
                "Verify that the base URL points at a compatible schedule API"
            }
            ScheduleError::IoError(_) => "Check file permissions and paths",
            ScheduleError::SerializationError(_) => "Retry without --json and report the issue",
            ScheduleError::ConfigError { .. }
            | ScheduleError::InvalidConfigValueError { .. }
            | ScheduleError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line arguments"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
