//! The six gauge families and the per-cycle publish step.
//!
//! Mode, state and target temperature are single-active dimensions: before
//! a thermostat's new label values are set, the ones it published on the
//! previous cycle are removed from the vec. Publishing holds a write lock
//! that rendering takes for reading, so a scrape never sees half a cycle.

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tokio::sync::RwLock;
use tracing::debug;

pub const STATE: &str = "nest_state";
pub const TEMPERATURE: &str = "nest_temperature";
pub const TARGET_TEMPERATURE: &str = "nest_target_temperature";
pub const HUMIDITY: &str = "nest_humidity";
pub const HVAC_MODE: &str = "nest_hvac_mode";
pub const HVAC_STATE: &str = "nest_hvac_state";

/// Everything published for one thermostat in one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThermostatReading {
    /// Value of the `thermostat` label.
    pub thermostat: String,
    /// Boolean properties, published as 1/0 under `nest_state`.
    pub states: Vec<(&'static str, bool)>,
    pub ambient_temperature: f64,
    pub humidity: f64,
    /// `type` label → temperature. Empty when the mode has no target.
    pub targets: Vec<(&'static str, f64)>,
    pub hvac_mode: String,
    pub hvac_state: String,
}

/// Label values a thermostat set on the previous cycle.
#[derive(Debug, Default)]
struct Published {
    targets: Vec<&'static str>,
    hvac_mode: String,
    hvac_state: String,
}

struct Gauges {
    registry: Registry,
    state: GaugeVec,
    temperature: GaugeVec,
    target_temperature: GaugeVec,
    humidity: GaugeVec,
    hvac_mode: GaugeVec,
    hvac_state: GaugeVec,
    /// thermostat → labels to clear on its next publish.
    published: RwLock<HashMap<String, Published>>,
}

/// Owned Prometheus registry with the exporter's gauge families.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct NestMetrics {
    inner: Arc<Gauges>,
}

fn gauge_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> prometheus::Result<GaugeVec> {
    let vec = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(vec.clone()))?;
    debug!(family = name, "gauge family registered");
    Ok(vec)
}

impl NestMetrics {
    /// Create a registry and register all six families on it.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let state = gauge_vec(
            &registry,
            STATE,
            "Various true/false (1/0) metrics describing nest state",
            &["thermostat", "property"],
        )?;
        let temperature = gauge_vec(&registry, TEMPERATURE, "The ambient temperature", &["thermostat"])?;
        let target_temperature = gauge_vec(
            &registry,
            TARGET_TEMPERATURE,
            "The target temperatures",
            &["thermostat", "type"],
        )?;
        let humidity = gauge_vec(&registry, HUMIDITY, "Current humidity in %", &["thermostat"])?;
        // heat, cool, heat-cool, eco, off
        let hvac_mode = gauge_vec(&registry, HVAC_MODE, "HVAC mode", &["thermostat", "mode"])?;
        let hvac_state = gauge_vec(&registry, HVAC_STATE, "HVAC state", &["thermostat", "state"])?;

        Ok(Self {
            inner: Arc::new(Gauges {
                registry,
                state,
                temperature,
                target_temperature,
                humidity,
                hvac_mode,
                hvac_state,
                published: RwLock::new(HashMap::new()),
            }),
        })
    }

    /// The underlying registry, for gathering or registering extra collectors.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Publish one poll cycle.
    ///
    /// Thermostats absent from `readings` keep whatever they last published.
    pub async fn publish(&self, readings: &[ThermostatReading]) {
        let g = &self.inner;
        let mut published = g.published.write().await;

        for r in readings {
            let name = r.thermostat.as_str();

            if let Some(prev) = published.remove(name) {
                for kind in prev.targets {
                    let _ = g.target_temperature.remove_label_values(&[name, kind]);
                }
                let _ = g.hvac_mode.remove_label_values(&[name, prev.hvac_mode.as_str()]);
                let _ = g.hvac_state.remove_label_values(&[name, prev.hvac_state.as_str()]);
            }

            for (property, on) in &r.states {
                g.state
                    .with_label_values(&[name, *property])
                    .set(if *on { 1.0 } else { 0.0 });
            }
            g.temperature.with_label_values(&[name]).set(r.ambient_temperature);
            g.humidity.with_label_values(&[name]).set(r.humidity);
            for (kind, value) in &r.targets {
                g.target_temperature.with_label_values(&[name, *kind]).set(*value);
            }
            g.hvac_mode.with_label_values(&[name, r.hvac_mode.as_str()]).set(1.0);
            g.hvac_state.with_label_values(&[name, r.hvac_state.as_str()]).set(1.0);

            published.insert(
                r.thermostat.clone(),
                Published {
                    targets: r.targets.iter().map(|(kind, _)| *kind).collect(),
                    hvac_mode: r.hvac_mode.clone(),
                    hvac_state: r.hvac_state.clone(),
                },
            );
        }
    }

    /// Encode every family in the Prometheus text exposition format.
    pub async fn render(&self) -> prometheus::Result<String> {
        let families = {
            let _cycle = self.inner.published.read().await;
            self.inner.registry.gather()
        };

        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(metrics: &NestMetrics, family: &str, labels: &[(&str, &str)]) -> Option<f64> {
        metrics
            .registry()
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == family)
            .flat_map(|mf| mf.get_metric().iter())
            .find(|m| {
                let pairs = m.get_label();
                pairs.len() == labels.len()
                    && labels
                        .iter()
                        .all(|(k, v)| pairs.iter().any(|lp| lp.get_name() == *k && lp.get_value() == *v))
            })
            .map(|m| m.get_gauge().get_value())
    }

    fn count(metrics: &NestMetrics, family: &str) -> usize {
        metrics
            .registry()
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == family)
            .map(|mf| mf.get_metric().len())
            .sum()
    }

    fn reading(name: &str, mode: &str, targets: Vec<(&'static str, f64)>) -> ThermostatReading {
        ThermostatReading {
            thermostat: name.to_string(),
            states: vec![("is_online", true), ("has_fan", false)],
            ambient_temperature: 69.0,
            humidity: 45.0,
            targets,
            hvac_mode: mode.to_string(),
            hvac_state: "off".to_string(),
        }
    }

    #[tokio::test]
    async fn registers_six_families() {
        let metrics = NestMetrics::new().unwrap();
        metrics
            .publish(&[reading("Den", "heat", vec![("target_temperature", 70.0)])])
            .await;
        let names: Vec<String> = metrics
            .registry()
            .gather()
            .iter()
            .map(|mf| mf.get_name().to_string())
            .collect();
        assert_eq!(names.len(), 6);
        for family in [STATE, TEMPERATURE, TARGET_TEMPERATURE, HUMIDITY, HVAC_MODE, HVAC_STATE] {
            assert!(names.iter().any(|n| n == family), "missing {family}");
        }

        // Duplicate registration of any family is rejected by the registry.
        let dup = GaugeVec::new(Opts::new(HVAC_MODE, "dup"), &["thermostat", "mode"]).unwrap();
        assert!(metrics.registry().register(Box::new(dup)).is_err());
    }

    #[tokio::test]
    async fn publish_sets_all_families() {
        let metrics = NestMetrics::new().unwrap();
        metrics
            .publish(&[reading("Den", "heat", vec![("target_temperature", 70.0)])])
            .await;

        assert_eq!(sample(&metrics, STATE, &[("thermostat", "Den"), ("property", "is_online")]), Some(1.0));
        assert_eq!(sample(&metrics, STATE, &[("thermostat", "Den"), ("property", "has_fan")]), Some(0.0));
        assert_eq!(sample(&metrics, TEMPERATURE, &[("thermostat", "Den")]), Some(69.0));
        assert_eq!(sample(&metrics, HUMIDITY, &[("thermostat", "Den")]), Some(45.0));
        assert_eq!(
            sample(&metrics, TARGET_TEMPERATURE, &[("thermostat", "Den"), ("type", "target_temperature")]),
            Some(70.0)
        );
        assert_eq!(sample(&metrics, HVAC_MODE, &[("thermostat", "Den"), ("mode", "heat")]), Some(1.0));
        assert_eq!(sample(&metrics, HVAC_STATE, &[("thermostat", "Den"), ("state", "off")]), Some(1.0));
    }

    #[tokio::test]
    async fn mode_change_removes_previous_labels() {
        let metrics = NestMetrics::new().unwrap();
        metrics
            .publish(&[reading("Den", "heat", vec![("target_temperature", 70.0)])])
            .await;
        metrics
            .publish(&[reading(
                "Den",
                "eco",
                vec![("away_temperature_high", 80.0), ("away_temperature_low", 62.0)],
            )])
            .await;

        assert_eq!(count(&metrics, HVAC_MODE), 1);
        assert_eq!(sample(&metrics, HVAC_MODE, &[("thermostat", "Den"), ("mode", "heat")]), None);
        assert_eq!(count(&metrics, TARGET_TEMPERATURE), 2);
        assert_eq!(
            sample(&metrics, TARGET_TEMPERATURE, &[("thermostat", "Den"), ("type", "target_temperature")]),
            None
        );
    }

    #[tokio::test]
    async fn switching_off_removes_targets() {
        let metrics = NestMetrics::new().unwrap();
        metrics
            .publish(&[reading(
                "Den",
                "heat-cool",
                vec![("target_temperature_high", 72.0), ("target_temperature_low", 68.0)],
            )])
            .await;
        metrics.publish(&[reading("Den", "off", Vec::new())]).await;

        assert_eq!(count(&metrics, TARGET_TEMPERATURE), 0);
    }

    #[tokio::test]
    async fn clearing_is_per_thermostat() {
        let metrics = NestMetrics::new().unwrap();
        metrics
            .publish(&[
                reading("Den", "heat", vec![("target_temperature", 70.0)]),
                reading("Hallway", "cool", vec![("target_temperature", 75.0)]),
            ])
            .await;
        // Only Den reports this cycle; Hallway keeps its last values.
        metrics.publish(&[reading("Den", "off", Vec::new())]).await;

        assert_eq!(count(&metrics, HVAC_MODE), 2);
        assert_eq!(
            sample(&metrics, TARGET_TEMPERATURE, &[("thermostat", "Hallway"), ("type", "target_temperature")]),
            Some(75.0)
        );
        assert_eq!(sample(&metrics, HVAC_MODE, &[("thermostat", "Den"), ("mode", "off")]), Some(1.0));
    }

    #[tokio::test]
    async fn clones_share_registry() {
        let metrics = NestMetrics::new().unwrap();
        let writer = metrics.clone();
        writer.publish(&[reading("Den", "off", Vec::new())]).await;
        assert_eq!(sample(&metrics, TEMPERATURE, &[("thermostat", "Den")]), Some(69.0));
    }

    #[tokio::test]
    async fn render_uses_text_format() {
        let metrics = NestMetrics::new().unwrap();
        metrics.publish(&[reading("Den", "off", Vec::new())]).await;
        let output = metrics.render().await.unwrap();
        assert!(output.contains("# HELP nest_humidity Current humidity in %"));
        assert!(output.contains("# TYPE nest_hvac_mode gauge"));
        assert!(output.contains("nest_hvac_mode{mode=\"off\",thermostat=\"Den\"} 1"));
        assert!(output.contains("nest_state{property=\"is_online\",thermostat=\"Den\"} 1"));
    }
}
