//! Derived-quantity functions for the waveplus-ble crate.

/// Lowest battery potential of the discharge curve, in volts.
pub const BATTERY_VOLTAGE_MIN: f64 = 2.2;

/// Highest battery potential of the discharge curve, in volts.
pub const BATTERY_VOLTAGE_MAX: f64 = 3.2;

/// Calculate saturation vapor pressure in hPa.
///
/// Uses the Magnus formula over water with an enhancement factor for moist
/// air. `pressure` must be non-zero; the enhancement factor divides by it.
///
/// # Arguments
///
/// * `temperature` - Air temperature in degrees Celsius
/// * `pressure` - Atmospheric pressure in hPa
///
/// # Returns
///
/// Saturation vapor pressure in hPa
///
/// # Example
///
/// ```
/// use waveplus_ble::saturation_vapor_pressure;
///
/// let svp = saturation_vapor_pressure(20.0, 1013.0);
/// assert!((svp - 23.4).abs() < 0.1);
/// ```
#[inline]
pub fn saturation_vapor_pressure(temperature: f64, pressure: f64) -> f64 {
    let equilibrium = 6.112 * ((17.62 * temperature) / (243.12 + temperature)).exp();
    let enhancement = 1.0016 + 3.15e-6 * pressure - 0.074 / pressure;
    enhancement * equilibrium
}

/// Calculate absolute humidity in grams per cubic meter.
///
/// # Arguments
///
/// * `relative_humidity` - Relative humidity in percent
/// * `temperature` - Air temperature in degrees Celsius
/// * `pressure` - Atmospheric pressure in hPa
///
/// # Returns
///
/// Water vapor mass per air volume in g/m³
///
/// # Example
///
/// ```
/// use waveplus_ble::absolute_humidity;
///
/// let humidity = absolute_humidity(50.0, 20.0, 1013.0);
/// assert!((humidity - 8.66).abs() < 0.01);
/// ```
#[inline]
pub fn absolute_humidity(relative_humidity: f64, temperature: f64, pressure: f64) -> f64 {
    let svp = saturation_vapor_pressure(temperature, pressure);
    let vapor_density = (relative_humidity * svp) / (461.5 * (temperature + 273.15));
    vapor_density * 1000.0
}

/// Map a battery potential onto a 0-100 charge percentage.
///
/// Linear over the 2.2 V - 3.2 V discharge curve, clamped at both ends.
///
/// # Arguments
///
/// * `voltage` - Battery potential in volts
///
/// # Returns
///
/// Battery charge estimate, 0-100
///
/// # Example
///
/// ```
/// use waveplus_ble::battery_percentage;
///
/// assert_eq!(battery_percentage(2.7), 50);
/// ```
#[inline]
pub fn battery_percentage(voltage: f64) -> u8 {
    let span = BATTERY_VOLTAGE_MAX - BATTERY_VOLTAGE_MIN;
    let percentage = (voltage - BATTERY_VOLTAGE_MIN) / span * 100.0;
    percentage.round().clamp(0.0, 100.0) as u8
}
