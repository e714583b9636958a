//! BLE client for the AQUADATA command channel
//!
//! Provides functions to scan for devices and push WiFi credentials over
//! the UART service: write the command record to RX, then follow the
//! notification stream on TX until the device reports a terminal verdict.

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use log::{debug, info, warn};
use std::time::Duration;
use uuid::Uuid;

use aquadata_proto::ble::{RX_CHAR_UUID, SERVICE_UUID, TX_CHAR_UUID};
use aquadata_proto::{Framer, Response, Status};

/// A discovered BLE device
#[derive(Debug, Clone)]
pub struct AquadataDevice {
    pub name: String,
    pub address: String,
    pub rssi: Option<i16>,
    pub is_aquadata: bool,
}

/// Parse UUID string into uuid::Uuid
fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("invalid UUID in aquadata_proto")
}

/// Get the default Bluetooth adapter
pub async fn get_adapter() -> Result<Adapter, Box<dyn std::error::Error>> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters
        .into_iter()
        .next()
        .ok_or_else(|| "No Bluetooth adapter found".into())
}

/// Scan for BLE devices
///
/// Returns a list of discovered devices. AQUADATA devices have
/// `is_aquadata = true`, recognized by the advertised UART service or name.
pub async fn scan(duration_secs: u64) -> Result<Vec<AquadataDevice>, Box<dyn std::error::Error>> {
    let adapter = get_adapter().await?;
    let service_uuid = parse_uuid(SERVICE_UUID);

    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(Duration::from_secs(duration_secs)).await;

    let peripherals = adapter.peripherals().await?;
    let mut devices = Vec::new();

    for peripheral in peripherals {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_else(|| "Unknown".to_string());
            let address = peripheral.address().to_string();
            let rssi = props.rssi;
            let is_aquadata =
                name.starts_with("AQUADATA") || props.services.contains(&service_uuid);

            devices.push(AquadataDevice {
                name,
                address,
                rssi,
                is_aquadata,
            });
        }
    }

    adapter.stop_scan().await?;
    Ok(devices)
}

/// Find a device by name/address pattern, or find any AQUADATA device
pub async fn find_device(target: Option<&str>) -> Result<Peripheral, Box<dyn std::error::Error>> {
    let adapter = get_adapter().await?;
    let service_uuid = parse_uuid(SERVICE_UUID);

    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let peripherals = adapter.peripherals().await?;

    for peripheral in peripherals {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_default();
            let addr = peripheral.address().to_string();

            let matches = match target {
                Some(t) => name.contains(t) || addr.contains(t),
                None => name.starts_with("AQUADATA") || props.services.contains(&service_uuid),
            };

            if matches {
                adapter.stop_scan().await?;
                return Ok(peripheral);
            }
        }
    }

    adapter.stop_scan().await?;
    Err("No AQUADATA device found".into())
}

/// Provision a device with WiFi credentials and wait for its verdict
///
/// # Arguments
/// * `target` - Device name/address pattern, or None to find any AQUADATA device
/// * `ssid` - WiFi network name
/// * `password` - WiFi password
/// * `timeout_secs` - How long to wait for the terminal response
///
/// The device blocks for up to ~15s while it polls the join, so the timeout
/// should comfortably exceed that.
pub async fn provision(
    target: Option<&str>,
    ssid: &str,
    password: &str,
    timeout_secs: u64,
) -> Result<String, Box<dyn std::error::Error>> {
    let device = find_device(target).await?;

    device.connect().await?;
    device.discover_services().await?;

    let characteristics = device.characteristics();
    let rx_uuid = parse_uuid(RX_CHAR_UUID);
    let tx_uuid = parse_uuid(TX_CHAR_UUID);

    let rx_char = characteristics
        .iter()
        .find(|c| c.uuid == rx_uuid)
        .ok_or("RX characteristic not found")?;

    let tx_char = characteristics
        .iter()
        .find(|c| c.uuid == tx_uuid)
        .ok_or("TX characteristic not found")?;

    device.subscribe(tx_char).await?;
    let mut notifications = device.notifications().await?;

    let record = serde_json::json!({
        "type": "wifi_config",
        "ssid": ssid,
        "password": password,
    })
    .to_string()
        + "\n";
    device
        .write(rx_char, record.as_bytes(), WriteType::WithResponse)
        .await?;
    info!("sent wifi_config for {ssid}");

    let verdict = tokio::time::timeout(Duration::from_secs(timeout_secs), async {
        let mut framer = Framer::new();
        while let Some(notification) = notifications.next().await {
            if notification.uuid != tx_uuid {
                continue;
            }
            if let Err(e) = framer.push(&notification.value) {
                warn!("{e}");
            }
            while let Some(line) = framer.next_record() {
                match serde_json::from_str::<Response>(&line) {
                    Ok(Response::WifiConfigResponse { status, message }) => match status {
                        Status::Info => info!("device: {message}"),
                        Status::Success => return Ok(message),
                        Status::Error => return Err(message),
                    },
                    Ok(Response::CommandResponse { message, .. }) => return Err(message),
                    Ok(other) => debug!("ignoring {other:?}"),
                    Err(e) => warn!("unparseable record {line:?}: {e}"),
                }
            }
        }
        Err("notification stream closed".to_string())
    })
    .await;

    let _ = device.disconnect().await;

    match verdict {
        Ok(Ok(message)) => Ok(message),
        Ok(Err(message)) => Err(message.into()),
        Err(_) => Err("timed out waiting for the device verdict".into()),
    }
}
