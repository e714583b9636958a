//! BLE provisioning tool for AQUADATA devices
//!
//! Scans for devices and sends WiFi credentials over the UART service.

use clap::{Parser, Subcommand};

use aquadata_controller::ble;

#[derive(Parser)]
#[command(name = "aquadata-controller")]
#[command(about = "BLE provisioning tool for AQUADATA devices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for AQUADATA devices
    Scan {
        /// Scan duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Send WiFi credentials to a device and wait for its verdict
    Provision {
        /// Device name or address to connect to
        #[arg(short, long)]
        device: Option<String>,
        /// WiFi network name
        #[arg(short, long)]
        ssid: String,
        /// WiFi password
        #[arg(short, long)]
        password: String,
        /// Seconds to wait for the device verdict
        #[arg(short, long, default_value = "30")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { duration } => {
            println!("Scanning for AQUADATA devices ({duration} seconds)...");
            let devices = ble::scan(duration).await?;

            println!("\nFound {} devices:", devices.len());
            for device in devices {
                let rssi = device
                    .rssi
                    .map(|r| format!("{r} dBm"))
                    .unwrap_or_else(|| "N/A".to_string());
                let marker = if device.is_aquadata { " [AQUADATA]" } else { "" };
                println!("  {} ({}) RSSI: {}{}", device.name, device.address, rssi, marker);
            }
        }
        Commands::Provision {
            device,
            ssid,
            password,
            timeout,
        } => {
            let message = ble::provision(device.as_deref(), &ssid, &password, timeout).await?;
            println!("{message}");
        }
    }

    Ok(())
}
