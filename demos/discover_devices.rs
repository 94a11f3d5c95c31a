//! Basic example: Discover all nearby Airthings devices
//!
//! Run with: cargo run --example discover_devices

use waveplus_ble::{Result, WaveScanner};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waveplus_ble=debug".parse().unwrap()),
        )
        .init();

    println!("Starting Airthings device discovery...");
    println!("Make sure your devices are within range!\n");

    let scanner = WaveScanner::new().await?;

    let new_devices = scanner
        .discover(WaveScanner::DEFAULT_SCANS, WaveScanner::DEFAULT_SCAN_TIMEOUT)
        .await?;

    println!("\n--- Scan Complete ---");
    println!("New this run: {}", new_devices.len());
    println!("Total devices found: {}", scanner.device_count());

    for device in scanner.found_devices() {
        println!(
            "  {} - {} (RSSI: {:?})",
            device.display_name(),
            device.address,
            device.rssi
        );
    }

    println!("\nDone!");

    Ok(())
}
