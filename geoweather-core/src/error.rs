use std::path::PathBuf;

/// The geolocation service was unreachable or returned unusable data.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Can't determine public IP address: {0}")]
    PublicIp(String),

    #[error("Can't get location info for IP {ip}: {reason}")]
    LocationInfo { ip: String, reason: String },

    #[error("Malformed location '{0}', expected \"<latitude>,<longitude>\"")]
    MalformedLocation(String),

    #[error("Coordinates out of range: latitude {latitude}, longitude {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Why a weather lookup failed.
///
/// Callers only ever see [`ApiServiceError`]; the cause is kept so logs and
/// tests can tell a broken payload from an unknown condition code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiFailure {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("payload is not valid JSON: {0}")]
    MalformedPayload(String),

    #[error("payload does not match the expected shape: {0}")]
    Schema(String),

    #[error("payload has no weather condition")]
    MissingCondition,

    #[error("unrecognized weather condition code {0}")]
    UnknownCondition(i64),

    #[error("temperature {0} is out of range")]
    InvalidTemperature(f64),

    #[error("{field} timestamp {value} is out of range")]
    InvalidTimestamp { field: &'static str, value: i64 },
}

/// The weather provider failed or returned a payload we can't use.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Weather service error: {cause}")]
pub struct ApiServiceError {
    cause: ApiFailure,
}

impl ApiServiceError {
    pub fn failure(&self) -> &ApiFailure {
        &self.cause
    }
}

impl From<ApiFailure> for ApiServiceError {
    fn from(cause: ApiFailure) -> Self {
        Self { cause }
    }
}

/// The history backend could not be read or written, or holds a corrupt log.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to access history file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History file {} is not a valid record list: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
