//! AQUADATA Device Engine
//!
//! The firmware-side half of the provisioning link: turns radio-delivered
//! byte fragments into JSON commands, joins a WiFi network with bounded
//! retries, and pushes responses and telemetry back over the notify channel.
//!
//! This crate is platform-agnostic. MCU integrations implement the
//! collaborator traits and route their radio callbacks through
//! [`LinkEvents`]:
//! - [`Wifi`] - the platform join primitive
//! - [`Transmitter`] - the outbound notification characteristic
//! - [`Clock`] - time source for polling, heartbeat and telemetry cadence
//! - [`Storage`] - persistent credential store (NVS on ESP32)
//! - [`Sensors`] - the probe head
//!
//! Wire types and framing live in `aquadata-proto`.

pub mod engine;
pub mod link;
pub mod provision;
pub mod storage;
pub mod telemetry;
pub mod wifi;

pub use engine::*;
pub use link::*;
pub use provision::*;
pub use storage::*;
pub use telemetry::*;
pub use wifi::*;
