//! Persistent Storage Abstraction Trait
//!
//! Credential persistence lives outside the provisioning state machine:
//! the engine saves credentials after a successful join and replays them
//! at boot via `auto_connect`.

/// Trait for persistent credential storage.
///
/// MCU-specific crates implement this trait using their storage backend
/// (NVS for ESP32, flash for Pico, etc.)
pub trait Storage {
    /// Error type for storage operations
    type Error;

    /// Get WiFi credentials (SSID, password)
    fn get_wifi_credentials(&self) -> Result<Option<(String, String)>, Self::Error>;

    /// Save WiFi credentials
    fn set_wifi_credentials(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;

    /// Clear WiFi credentials
    fn clear_wifi_credentials(&mut self) -> Result<(), Self::Error>;
}

/// In-memory storage for host builds and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    credentials: Option<(String, String)>,
}

impl Storage for MemoryStorage {
    type Error = std::convert::Infallible;

    fn get_wifi_credentials(&self) -> Result<Option<(String, String)>, Self::Error> {
        Ok(self.credentials.clone())
    }

    fn set_wifi_credentials(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error> {
        self.credentials = Some((ssid.to_string(), password.to_string()));
        Ok(())
    }

    fn clear_wifi_credentials(&mut self) -> Result<(), Self::Error> {
        self.credentials = None;
        Ok(())
    }
}
