//! BLE constants for the AQUADATA command channel
//!
//! The device exposes a Nordic UART service: the central writes
//! newline-terminated JSON commands to the RX characteristic and receives
//! responses as notifications on the TX characteristic. These UUIDs are the
//! contract with the mobile app and must match on both sides.

/// Advertised device name
pub const DEVICE_NAME: &str = "AQUADATA-2.0";

/// UART service UUID
pub const SERVICE_UUID: &str = "6e400001-b5a3-f393-e0a9-e50e24dcca9e";

/// RX characteristic UUID (central -> device, write)
pub const RX_CHAR_UUID: &str = "6e400002-b5a3-f393-e0a9-e50e24dcca9e";

/// TX characteristic UUID (device -> central, notify)
///
/// Notifications only work once the standard CCCD (0x2902) descriptor is
/// registered on this characteristic; the radio glue owns that.
pub const TX_CHAR_UUID: &str = "6e400003-b5a3-f393-e0a9-e50e24dcca9e";
