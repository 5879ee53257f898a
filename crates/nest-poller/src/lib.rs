//! nest-poller — the poll → transform → publish loop.
//!
//! # Architecture
//!
//! ```text
//! Poller
//!   ├── NestClient::fetch_devices() → DeviceCollection
//!   │     └── cached redirect URL reused between polls
//!   ├── transform::collection_readings() → ThermostatReading per thermostat
//!   └── NestMetrics::publish() ← one call per cycle
//! ```
//!
//! A failed fetch is logged and the cycle is skipped; the registry keeps
//! the previous cycle's values until the next successful poll.

pub mod client;
pub mod error;
pub mod poller;
pub mod transform;

pub use client::NestClient;
pub use error::FetchError;
pub use poller::Poller;
