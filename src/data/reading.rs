//! Assembled device readings.
//!
//! Contains the per-device measurement record and its output wrapper.

use chrono::{DateTime, Utc};

/// A complete reading assembled from one device session.
///
/// Field names double as the wire keys when the `serde` feature is enabled.
/// `Default` is the all-zero degraded reading returned for a device that
/// reports no services.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaveReading {
    /// Radon concentration averaged over the last day, raw sensor units.
    pub radon_day_average: u16,

    /// Radon concentration averaged over the device lifetime, raw sensor units.
    pub radon_total_average: u16,

    /// Air temperature in degrees Celsius.
    pub temperature: f64,

    /// Relative atmospheric pressure in hPa.
    pub pressure: f64,

    /// CO2 level, raw sensor units.
    pub co2: f64,

    /// VOC level, raw sensor units.
    pub voc: f64,

    /// When this reading was assembled (UTC). `None` only in the degraded
    /// no-services reading.
    pub timestamp: Option<DateTime<Utc>>,

    /// Device model number and serial number, concatenated.
    pub serial_no: String,

    /// Ambient illuminance, raw sensor units.
    pub illuminance: u8,

    /// Battery potential in volts.
    pub battery_voltage: f64,

    /// Battery charge estimate, 0-100.
    pub battery_percentage: u8,

    /// Relative humidity in percent.
    pub humidity_rel: f64,

    /// Absolute humidity in grams per cubic meter, derived from relative
    /// humidity, temperature and pressure.
    pub humidity_abs: f64,
}

/// One device's reading paired with its advertised name.
///
/// A run over several devices serializes as a list of these records.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceReport {
    /// The device name seen during discovery, if it advertised one.
    pub device_name: Option<String>,

    /// The assembled reading.
    pub measurements: WaveReading,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_reading_is_all_zero() {
        let reading = WaveReading::default();

        assert_eq!(reading.radon_day_average, 0);
        assert_eq!(reading.radon_total_average, 0);
        assert_eq!(reading.temperature, 0.0);
        assert_eq!(reading.pressure, 0.0);
        assert_eq!(reading.co2, 0.0);
        assert_eq!(reading.voc, 0.0);
        assert_eq!(reading.timestamp, None);
        assert_eq!(reading.serial_no, "");
        assert_eq!(reading.illuminance, 0);
        assert_eq!(reading.battery_voltage, 0.0);
        assert_eq!(reading.battery_percentage, 0);
        assert_eq!(reading.humidity_rel, 0.0);
        assert_eq!(reading.humidity_abs, 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_serializes_with_wire_keys() {
        let report = DeviceReport {
            device_name: Some("Airthings Wave+".to_string()),
            measurements: WaveReading::default(),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["device_name"], "Airthings Wave+");

        let measurements = &value["measurements"];
        for key in [
            "radon_day_average",
            "radon_total_average",
            "temperature",
            "pressure",
            "co2",
            "voc",
            "timestamp",
            "serial_no",
            "illuminance",
            "battery_voltage",
            "battery_percentage",
            "humidity_rel",
            "humidity_abs",
        ] {
            assert!(
                measurements.get(key).is_some(),
                "missing wire key: {}",
                key
            );
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_reading_round_trips_through_json() {
        let reading = WaveReading {
            radon_day_average: 55,
            temperature: 22.15,
            serial_no: "2930123456".to_string(),
            humidity_rel: 60.0,
            ..WaveReading::default()
        };

        let json = serde_json::to_string(&reading).unwrap();
        let back: WaveReading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }
}
