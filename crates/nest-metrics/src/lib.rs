//! nest-metrics — the Prometheus registry shared by the poller and the HTTP server.
//!
//! `main` creates one [`NestMetrics`], which owns a `prometheus::Registry`
//! with the six gauge families registered, and hands clones of it to the
//! poller (writer) and the router (reader).
//!
//! # Architecture
//!
//! ```text
//! NestMetrics (Arc)
//!   ├── publish(&[ThermostatReading]) ← one call per poll cycle
//!   └── render() → text/plain for the /metrics endpoint (TextEncoder)
//! ```

pub mod gauges;

pub use gauges::{NestMetrics, ThermostatReading};
pub use gauges::{HUMIDITY, HVAC_MODE, HVAC_STATE, STATE, TARGET_TEMPERATURE, TEMPERATURE};
