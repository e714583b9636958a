//! AQUADATA wire protocol - command/response types and newline framing
//!
//! The command channel is UTF-8 text over the BLE UART service: one JSON
//! object per line, terminated by `\n`. The device trims surrounding
//! whitespace before decoding. Both halves of the link use this crate: the
//! device engine decodes [`Command`]s and encodes [`Response`]s, the
//! controller does the reverse.

pub mod ble;
mod framer;

pub use framer::{FrameError, Framer, DEFAULT_BUFFER_CAP};

use serde::{Deserialize, Serialize};

/// Response status reported to the central.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Info,
    Success,
    Error,
}

/// Credentials carried by a `wifi_config` command.
///
/// Missing fields decode as empty strings rather than failing; a join with
/// an empty SSID simply fails fast downstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WifiConfig {
    #[serde(default)]
    pub ssid: String,
    #[serde(default)]
    pub password: String,
}

/// A decoded inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    WifiConfig(WifiConfig),
}

/// Why a record could not be decoded into a [`Command`].
///
/// The two variants are reported to the central with distinct messages, so
/// they stay distinct here.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unknown command type: {0:?}")]
    UnknownType(Option<String>),
}

impl Command {
    /// Decode one trimmed command record.
    pub fn parse(record: &str) -> Result<Command, ParseError> {
        let value: serde_json::Value = serde_json::from_str(record)?;
        match value.get("type").and_then(|t| t.as_str()) {
            Some("wifi_config") => Ok(Command::WifiConfig(WifiConfig::deserialize(&value)?)),
            other => Err(ParseError::UnknownType(other.map(str::to_string))),
        }
    }
}

/// Per-sensor counters in a telemetry record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCounters {
    pub ph: u32,
    #[serde(rename = "do")]
    pub dissolved_oxygen: u32,
}

/// One water-quality telemetry record.
///
/// `None` readings serialize as `null` - the app renders them as a sensor
/// dropout. `timestamp` is device uptime formatted `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    pub ph: Option<f64>,
    pub do_conc: Option<f64>,
    pub do_sat: Option<f64>,
    pub temp: Option<f64>,
    pub timestamp: String,
    pub status: String,
    pub readings_count: SensorCounters,
    pub errors_count: SensorCounters,
    pub wifi_status: String,
}

/// An outbound record, tagged by its `type` field on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    WifiConfigResponse { status: Status, message: String },
    CommandResponse { status: Status, message: String },
    StatusUpdate { message: String },
    SensorData(SensorReadings),
}

impl Response {
    pub fn invalid_json() -> Self {
        Response::CommandResponse {
            status: Status::Error,
            message: "Invalid JSON format.".to_string(),
        }
    }

    pub fn unknown_command() -> Self {
        Response::CommandResponse {
            status: Status::Error,
            message: "Unknown command type.".to_string(),
        }
    }

    pub fn provisioning_started(ssid: &str) -> Self {
        Response::WifiConfigResponse {
            status: Status::Info,
            message: format!("Attempting to connect to {ssid}..."),
        }
    }

    pub fn provisioned(ssid: &str) -> Self {
        Response::WifiConfigResponse {
            status: Status::Success,
            message: format!("Successfully connected to {ssid}"),
        }
    }

    pub fn provisioning_failed(ssid: &str) -> Self {
        Response::WifiConfigResponse {
            status: Status::Error,
            message: format!("Failed to connect to {ssid}. Check credentials."),
        }
    }

    pub fn heartbeat() -> Self {
        Response::StatusUpdate {
            message: "AQUADATA device is alive.".to_string(),
        }
    }

    /// Serialize to one newline-terminated wire record.
    pub fn to_record(&self) -> String {
        // No non-string map keys anywhere in the enum, so this cannot fail
        let mut record = serde_json::to_string(self).expect("response serialization cannot fail");
        record.push('\n');
        record
    }
}
