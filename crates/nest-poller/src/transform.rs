//! Device snapshot → thermostat readings.
//!
//! The readings carry the full label set for a thermostat; clearing the
//! previous cycle's mode, state and target labels happens in
//! [`NestMetrics::publish`](nest_metrics::NestMetrics::publish).

use nest_core::{Device, DeviceCollection, HvacMode, TemperatureScale};
use nest_metrics::ThermostatReading;

/// Boolean device properties exported under `nest_state`.
pub fn state_properties(device: &Device) -> [(&'static str, bool); 7] {
    [
        ("is_online", device.is_online),
        ("can_cool", device.can_cool),
        ("can_heat", device.can_heat),
        ("is_using_emergency_heat", device.is_using_emergency_heat),
        ("has_fan", device.has_fan),
        ("fan_timer_active", device.fan_timer_active),
        ("has_leaf", device.has_leaf),
    ]
}

/// Target temperature samples for the device's current mode.
///
/// Eco mode reports the away thresholds rather than the target thresholds;
/// that is where the vendor exposes the eco range. Off (and any
/// unrecognised mode) yields nothing.
pub fn target_temperatures(device: &Device, scale: TemperatureScale) -> Vec<(&'static str, f64)> {
    match device.hvac_mode {
        HvacMode::Heat | HvacMode::Cool => {
            vec![("target_temperature", device.target_temperature(scale))]
        }
        HvacMode::HeatCool => vec![
            ("target_temperature_high", device.target_temperature_high(scale)),
            ("target_temperature_low", device.target_temperature_low(scale)),
        ],
        HvacMode::Eco => vec![
            ("away_temperature_high", device.away_temperature_high(scale)),
            ("away_temperature_low", device.away_temperature_low(scale)),
        ],
        HvacMode::Off | HvacMode::Other(_) => Vec::new(),
    }
}

/// Everything one thermostat publishes this cycle.
pub fn reading(device: &Device, scale: TemperatureScale) -> ThermostatReading {
    ThermostatReading {
        thermostat: device.name.clone(),
        states: state_properties(device).to_vec(),
        ambient_temperature: device.ambient_temperature(scale),
        humidity: device.humidity,
        targets: target_temperatures(device, scale),
        hvac_mode: device.hvac_mode.as_str().to_string(),
        hvac_state: device.hvac_state.as_str().to_string(),
    }
}

/// One reading per thermostat in the snapshot, in device-id order.
pub fn collection_readings(devices: &DeviceCollection, scale: TemperatureScale) -> Vec<ThermostatReading> {
    devices
        .thermostats
        .values()
        .map(|device| reading(device, scale))
        .collect()
}
