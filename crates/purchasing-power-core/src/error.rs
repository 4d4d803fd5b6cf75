use thiserror::Error;

#[derive(Debug, Error)]
pub enum PurchasingPowerError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid rate table: {0}")]
    InvalidRateTable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PurchasingPowerError {
    fn from(e: serde_json::Error) -> Self {
        PurchasingPowerError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for PurchasingPowerError {
    fn from(e: serde_yaml::Error) -> Self {
        PurchasingPowerError::SerializationError(e.to_string())
    }
}
