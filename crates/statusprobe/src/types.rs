//! Status record decoded from a polled server.

use serde::{Deserialize, Deserializer, Serialize};

/// Status codes at or above this value are treated as server errors.
pub const SERVER_ERROR_THRESHOLD: i64 = 500;

/// Status reported by a polled web server for one poll cycle.
///
/// `status_code`, `api_version` and `error_message` come from the server's
/// JSON payload. `latency_ms` is the prober's own measurement of the round
/// trip and is never read from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStatus {
    /// Status code reported inside the payload, not the HTTP status line
    #[serde(rename = "status", deserialize_with = "null_as_default")]
    pub status_code: i64,

    /// Free-form API version identifier
    #[serde(rename = "version", deserialize_with = "null_as_default")]
    pub api_version: String,

    /// Round trip duration in whole milliseconds
    #[serde(skip)]
    pub latency_ms: u64,

    /// Error description, empty unless the server reports one
    #[serde(rename = "error", deserialize_with = "null_as_default")]
    pub error_message: String,
}

/// `null` leaves the field at its zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ServerStatus {
    /// Decode a status payload.
    ///
    /// Unknown keys are ignored; missing or `null` keys take their zero
    /// value, and a `null` body decodes to the zero record. `latency_ms` is
    /// left at zero for the caller to fill in.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let status: Option<Self> = serde_json::from_slice(body)?;
        Ok(status.unwrap_or_default())
    }

    /// Whether the server reported a 5xx-or-above status in its payload
    pub fn is_server_error(&self) -> bool {
        self.status_code >= SERVER_ERROR_THRESHOLD
    }
}
