// UUID constants keep the standard 8-4-4-4-12 hex grouping
#![allow(clippy::unusual_byte_groupings)]

//! # waveplus-ble
//!
//! A cross-platform Rust library for reading Airthings Wave Plus air
//! quality monitors via Bluetooth Low Energy.
//!
//! This library specifically targets the **Wave Plus** payload layout.
//! Airthings models with different payload layouts are intentionally
//! ignored; devices are recognized by the Airthings vendor identifier in
//! their advertisements.
//!
//! ## Features
//!
//! - **Device Discovery**: Find nearby Airthings devices over repeated
//!   bounded scan passes, deduplicated by address
//! - **One-shot Readings**: Connect, read, and disconnect per device
//! - **Sensor Decoding**: Radon (day/lifetime averages), temperature,
//!   pressure, humidity, CO2 and VOC from the fixed measurement layout
//! - **Command Exchange**: Illuminance and battery status via the
//!   write-then-notify handshake, with a bounded timeout fallback
//! - **Derived Quantities**: Absolute humidity and battery percentage
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use waveplus_ble::{Result, WaveScanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Create a scanner and run the default discovery passes
//!     let scanner = WaveScanner::new().await?;
//!     scanner
//!         .discover(WaveScanner::DEFAULT_SCANS, WaveScanner::DEFAULT_SCAN_TIMEOUT)
//!         .await?;
//!
//!     // Read every discovered device, one at a time
//!     for device in scanner.found_devices() {
//!         let reading = scanner.read_device(&device).await?;
//!         println!(
//!             "{}: {:.2} °C, {:.1} %RH, radon day avg {}",
//!             device.display_name(),
//!             reading.temperature,
//!             reading.humidity_rel,
//!             reading.radon_day_average
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### macOS
//! Bluetooth permission is required; bundled apps need
//! `NSBluetoothAlwaysUsageDescription` in their Info.plist.
//!
//! ### Linux
//! Needs BlueZ; membership in the `bluetooth` group may be required.
//!
//! ### Windows
//! Windows 10 or later with Bluetooth LE support.
//!
//! ## Feature Flags
//!
//! - `serde`: serialization/deserialization derives for the reading types

pub mod ble;
pub mod data;
pub mod error;
pub mod protocol;
pub mod utils;

// Crate-root re-exports
pub use error::{Error, Result};
pub use utils::{absolute_humidity, battery_percentage, saturation_vapor_pressure};

pub use ble::scanner::{DeviceIdentity, WaveScanner};
pub use ble::session::WaveSession;
pub use data::{DeviceReport, WaveReading};
pub use protocol::{CommandData, CommandResponse, SensorData, COMMAND_TRIGGER};
