use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request to {endpoint} failed with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to aggregate issuers for portfolio {portfolio_id}: {source}")]
    Aggregation {
        portfolio_id: String,
        #[source]
        source: Box<ConnectorError>,
    },

    #[error("carta-connector: failed to list {resource_type}: {source}")]
    List {
        resource_type: String,
        #[source]
        source: Box<ConnectorError>,
    },

    #[error("Invalid page token: {reason}")]
    InvalidPageToken { reason: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Data processing error: {message}")]
    Processing { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Protocol,
    Data,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConnectorError {
    /// 用於日誌與退出碼的錯誤分類
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) => ErrorCategory::Network,
            Self::Status { .. } => ErrorCategory::Protocol,
            Self::Aggregation { source, .. } | Self::List { source, .. } => source.category(),
            Self::Decode { .. }
            | Self::InvalidPageToken { .. }
            | Self::Serialization(_)
            | Self::Csv(_)
            | Self::Processing { .. } => ErrorCategory::Data,
            Self::Url(_)
            | Self::Config { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorCategory::Configuration,
            Self::Io(_) | Self::Zip(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Transport(_) => ErrorSeverity::Medium,
            Self::Status { status, .. } if *status >= 500 || *status == 429 => {
                ErrorSeverity::Medium
            }
            Self::Aggregation { source, .. } | Self::List { source, .. } => source.severity(),
            Self::Status { .. }
            | Self::Decode { .. }
            | Self::InvalidPageToken { .. }
            | Self::Serialization(_)
            | Self::Csv(_)
            | Self::Processing { .. } => ErrorSeverity::High,
            Self::Url(_)
            | Self::Config { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorSeverity::High,
            Self::Io(_) | Self::Zip(_) => ErrorSeverity::Critical,
        }
    }

    /// HTTP status carried by this error or by the error it wraps.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Aggregation { source, .. } | Self::List { source, .. } => source.status_code(),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::Transport(_) => "Check network connectivity and the configured base URL".to_string(),
            Self::Status { status: 401, .. } | Self::Status { status: 403, .. } => {
                "Check that the access token is valid and has the required scopes".to_string()
            }
            Self::Status { status: 404, .. } => {
                "Check the base URL and API version of the configured endpoint".to_string()
            }
            Self::Status { status, .. } if *status >= 500 => {
                "The remote service failed, try again later".to_string()
            }
            Self::Status { .. } => "Inspect the request parameters sent to the API".to_string(),
            Self::Aggregation { source, .. } | Self::List { source, .. } => {
                source.recovery_suggestion()
            }
            Self::Decode { .. } => {
                "The API returned an unexpected payload; verify the API version".to_string()
            }
            Self::InvalidPageToken { .. } => {
                "Restart the listing with an empty page token".to_string()
            }
            Self::Url(_) | Self::Config { .. } | Self::InvalidConfigValue { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            Self::MissingConfig { field } => format!("Provide a value for '{}'", field),
            Self::Io(_) | Self::Zip(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            Self::Serialization(_) | Self::Csv(_) | Self::Processing { .. } => {
                "Run again with --verbose and inspect the logs".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Transport(_) => "Could not reach the Carta API".to_string(),
            Self::Status { status, .. } => format!("The Carta API rejected the request ({})", status),
            Self::Aggregation { portfolio_id, .. } => {
                format!("Could not load the issuers of portfolio {}", portfolio_id)
            }
            Self::List { resource_type, source } => format!(
                "Could not list {}: {}",
                resource_type,
                source.user_friendly_message()
            ),
            Self::Decode { .. } => "The Carta API returned a malformed response".to_string(),
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                format!("Invalid configuration: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
