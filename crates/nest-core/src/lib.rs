pub mod config;
pub mod device;

pub use config::{ConfigError, ExporterConfig, expand_home};
pub use device::*;
