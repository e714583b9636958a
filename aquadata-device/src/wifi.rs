//! WiFi Abstraction Trait
//!
//! The engine only needs to start a join, poll its status, and tear it
//! down; everything else about the network stack stays platform-side.

/// WiFi connection status as reported by the join primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Trait for the platform WiFi driver.
///
/// MCU-specific crates implement this trait using their WiFi stack.
pub trait Wifi {
    /// Error type for WiFi operations
    type Error;

    /// Begin joining the given network; completion is observed via `status`
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;

    /// Drop any current or in-progress association; idempotent
    fn disconnect(&mut self) -> Result<(), Self::Error>;

    /// Current connection status
    fn status(&self) -> WifiStatus;

    /// Check if connected
    fn is_connected(&self) -> bool {
        self.status() == WifiStatus::Connected
    }
}
