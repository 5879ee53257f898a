//! Device snapshot types decoded from the vendor devices endpoint.
//!
//! A snapshot is fetched whole on every poll and never mutated. Every
//! field defaults when absent or `null` so a partially populated payload
//! still decodes; only a structurally invalid body fails.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Deserialize `null` as the type's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Collection ─────────────────────────────────────────────────────

/// Response body of `GET /devices.json`, keyed by device category.
///
/// Categories other than thermostats (cameras, smoke alarms) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceCollection {
    /// Thermostats keyed by vendor device id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub thermostats: BTreeMap<String, Device>,
}

impl DeviceCollection {
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

// ── Thermostat ─────────────────────────────────────────────────────

/// One physical thermostat.
///
/// Only the fields that feed a gauge are decoded. The vendor object carries
/// many more (location ids, locale, lock limits, eco thresholds, timers);
/// they are skipped so a type change in one of them cannot fail the poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Device {
    /// Display name, used as the `thermostat` label.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub is_online: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub can_heat: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub can_cool: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_fan: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_leaf: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_using_emergency_heat: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub fan_timer_active: bool,

    /// Relative humidity, 0-100.
    #[serde(deserialize_with = "null_as_default")]
    pub humidity: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub ambient_temperature_c: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ambient_temperature_f: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target_temperature_c: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target_temperature_f: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target_temperature_high_c: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target_temperature_high_f: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target_temperature_low_c: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target_temperature_low_f: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub away_temperature_high_c: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub away_temperature_high_f: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub away_temperature_low_c: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub away_temperature_low_f: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub hvac_mode: HvacMode,
    #[serde(deserialize_with = "null_as_default")]
    pub hvac_state: HvacState,
}

impl Device {
    pub fn ambient_temperature(&self, scale: TemperatureScale) -> f64 {
        scale.pick(self.ambient_temperature_c, self.ambient_temperature_f)
    }

    pub fn target_temperature(&self, scale: TemperatureScale) -> f64 {
        scale.pick(self.target_temperature_c, self.target_temperature_f)
    }

    pub fn target_temperature_high(&self, scale: TemperatureScale) -> f64 {
        scale.pick(self.target_temperature_high_c, self.target_temperature_high_f)
    }

    pub fn target_temperature_low(&self, scale: TemperatureScale) -> f64 {
        scale.pick(self.target_temperature_low_c, self.target_temperature_low_f)
    }

    pub fn away_temperature_high(&self, scale: TemperatureScale) -> f64 {
        scale.pick(self.away_temperature_high_c, self.away_temperature_high_f)
    }

    pub fn away_temperature_low(&self, scale: TemperatureScale) -> f64 {
        scale.pick(self.away_temperature_low_c, self.away_temperature_low_f)
    }
}

// ── Enumerations ───────────────────────────────────────────────────

/// Which vendor temperature fields (`*_c` or `*_f`) get published.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TemperatureScale {
    #[default]
    #[serde(rename = "F", alias = "f", alias = "fahrenheit")]
    Fahrenheit,
    #[serde(rename = "C", alias = "c", alias = "celsius")]
    Celsius,
}

impl TemperatureScale {
    fn pick(self, celsius: f64, fahrenheit: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Fahrenheit => fahrenheit,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            TemperatureScale::Celsius => "C",
            TemperatureScale::Fahrenheit => "F",
        }
    }
}

/// Operating mode selected by the user.
///
/// Unrecognised strings are kept verbatim so they still surface as a label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum HvacMode {
    Heat,
    Cool,
    HeatCool,
    Eco,
    #[default]
    Off,
    Other(String),
}

impl HvacMode {
    pub fn as_str(&self) -> &str {
        match self {
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat-cool",
            HvacMode::Eco => "eco",
            HvacMode::Off => "off",
            HvacMode::Other(s) => s,
        }
    }
}

impl From<String> for HvacMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "heat" => HvacMode::Heat,
            "cool" => HvacMode::Cool,
            "heat-cool" => HvacMode::HeatCool,
            "eco" => HvacMode::Eco,
            "off" => HvacMode::Off,
            _ => HvacMode::Other(s),
        }
    }
}

impl From<HvacMode> for String {
    fn from(mode: HvacMode) -> Self {
        mode.as_str().to_string()
    }
}

/// What the HVAC equipment is doing right now.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum HvacState {
    Heating,
    Cooling,
    #[default]
    Off,
    Other(String),
}

impl HvacState {
    pub fn as_str(&self) -> &str {
        match self {
            HvacState::Heating => "heating",
            HvacState::Cooling => "cooling",
            HvacState::Off => "off",
            HvacState::Other(s) => s,
        }
    }
}

impl From<String> for HvacState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "heating" => HvacState::Heating,
            "cooling" => HvacState::Cooling,
            "off" => HvacState::Off,
            _ => HvacState::Other(s),
        }
    }
}

impl From<HvacState> for String {
    fn from(state: HvacState) -> Self {
        state.as_str().to_string()
    }
}
