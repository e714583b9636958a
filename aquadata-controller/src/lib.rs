//! AQUADATA Controller
//!
//! BLE client for provisioning AQUADATA devices from a desktop, standing in
//! for the mobile app: same UART service, same newline-delimited JSON
//! records.
//!
//! # Example
//!
//! ```ignore
//! use aquadata_controller::ble;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Scan for devices
//!     let devices = ble::scan(5).await?;
//!     for device in &devices {
//!         println!("{} ({})", device.name, device.address);
//!     }
//!
//!     // Provision a device and wait for its verdict
//!     ble::provision(None, "MySSID", "MyPassword", 30).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod ble;
