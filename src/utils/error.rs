use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShipmentError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Label decoding error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Shipment already created: {shipment} has shipment id {shipment_id}")]
    ShipmentAlreadyCreated {
        shipment: String,
        shipment_id: String,
    },

    #[error("Shipment {shipment} has no shipment id yet")]
    ShipmentNotCreated { shipment: String },

    #[error("Action '{action}' is not available for {shipment}: {reason}")]
    ActionUnavailable {
        action: String,
        shipment: String,
        reason: String,
    },

    #[error("No row {index} in quote table of {available} services")]
    InvalidSelection { index: usize, available: usize },

    #[error("Remote call {method} failed: {message}")]
    RemoteError { method: String, message: String },

    #[error("Unexpected response from {method}: {message}")]
    UnexpectedResponse { method: String, message: String },

    #[error("No shipping label available for shipment {shipment_id}")]
    LabelUnavailable { shipment_id: String },

    #[error("No tracking number available for shipment {shipment_id}")]
    TrackingUnavailable { shipment_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Precondition,
    Remote,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ShipmentError {
    pub fn remote(method: &str, message: impl Into<String>) -> Self {
        ShipmentError::RemoteError {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn unexpected(method: &str, message: impl Into<String>) -> Self {
        ShipmentError::UnexpectedResponse {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ShipmentError::ShipmentAlreadyCreated { .. }
            | ShipmentError::ShipmentNotCreated { .. }
            | ShipmentError::ActionUnavailable { .. }
            | ShipmentError::InvalidSelection { .. }
            | ShipmentError::ValidationError { .. } => ErrorCategory::Precondition,
            ShipmentError::ApiError(_)
            | ShipmentError::RemoteError { .. }
            | ShipmentError::LabelUnavailable { .. }
            | ShipmentError::TrackingUnavailable { .. } => ErrorCategory::Remote,
            ShipmentError::ConfigError { .. }
            | ShipmentError::ConfigValidationError { .. }
            | ShipmentError::InvalidConfigValueError { .. }
            | ShipmentError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ShipmentError::SerializationError(_)
            | ShipmentError::DecodeError(_)
            | ShipmentError::UrlError(_)
            | ShipmentError::UnexpectedResponse { .. } => ErrorCategory::Data,
            ShipmentError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Precondition => ErrorSeverity::Low,
            ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ShipmentError::ShipmentAlreadyCreated { .. } => {
                "Use Print Shipping Label or Track Status for the existing shipment"
            }
            ShipmentError::ShipmentNotCreated { .. } => {
                "Fetch shipping rates and select a service first"
            }
            ShipmentError::ActionUnavailable { .. } => "Reload the shipment and check its status",
            ShipmentError::InvalidSelection { .. } => "Pick one of the listed rows",
            ShipmentError::ValidationError { .. } => {
                "Complete the addresses and parcels on the shipment"
            }
            ShipmentError::ApiError(_) | ShipmentError::RemoteError { .. } => {
                "Check the server connection and try the action again"
            }
            ShipmentError::LabelUnavailable { .. } | ShipmentError::TrackingUnavailable { .. } => {
                "Wait for the provider to process the shipment and try again"
            }
            ShipmentError::ConfigError { .. }
            | ShipmentError::ConfigValidationError { .. }
            | ShipmentError::InvalidConfigValueError { .. }
            | ShipmentError::MissingConfigError { .. } => "Fix the configuration file",
            ShipmentError::SerializationError(_)
            | ShipmentError::DecodeError(_)
            | ShipmentError::UrlError(_)
            | ShipmentError::UnexpectedResponse { .. } => {
                "Check the server version; the response was not understood"
            }
            ShipmentError::IoError(_) => "Check file permissions and free disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ShipmentError::ShipmentAlreadyCreated { .. } => "Shipment already created".to_string(),
            ShipmentError::RemoteError { message, .. } => message.clone(),
            ShipmentError::ApiError(e) if e.is_timeout() => {
                "The server did not answer in time".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShipmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_errors_are_low_severity() {
        let err = ShipmentError::ShipmentAlreadyCreated {
            shipment: "SHIPMENT-0001".to_string(),
            shipment_id: "42".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Precondition);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.user_friendly_message(), "Shipment already created");
    }

    #[test]
    fn test_remote_error_shows_server_message() {
        let err = ShipmentError::remote("create_shipment", "Carrier rejected parcel");
        assert_eq!(err.category(), ErrorCategory::Remote);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "Carrier rejected parcel");
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = ShipmentError::MissingConfigError {
            field: "server.base_url".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.recovery_suggestion(), "Fix the configuration file");
    }
}
