//! Full pipeline: read every discovered device and store the results as JSON
//!
//! Run with: cargo run --example read_devices --features serde

use waveplus_ble::{DeviceReport, Result, WaveScanner};

const OUTPUT_FILE: &str = "wave_plus_data.json";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waveplus_ble=info".parse().unwrap()),
        )
        .init();

    println!("Starting Airthings device reading...\n");

    let scanner = WaveScanner::new().await?;
    scanner
        .discover(WaveScanner::DEFAULT_SCANS, WaveScanner::DEFAULT_SCAN_TIMEOUT)
        .await?;

    let mut reports = Vec::new();

    for device in scanner.found_devices() {
        // One failing device must not stop the others.
        match scanner.read_device(&device).await {
            Ok(reading) => {
                println!(
                    "{}: {:.2} °C, {:.1} %RH, radon day avg {}, battery {}%",
                    device.display_name(),
                    reading.temperature,
                    reading.humidity_rel,
                    reading.radon_day_average,
                    reading.battery_percentage
                );
                reports.push(DeviceReport {
                    device_name: device.name.clone(),
                    measurements: reading,
                });
            }
            Err(e) => {
                eprintln!("Failed to read {}: {}", device.display_name(), e);
            }
        }
    }

    let json = serde_json::to_string_pretty(&reports).expect("reports serialize as JSON");
    std::fs::write(OUTPUT_FILE, &json).expect("write output file");

    println!("\nStored {} reading(s) in {}", reports.len(), OUTPUT_FILE);

    Ok(())
}
