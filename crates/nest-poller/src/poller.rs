//! Poll loop — fetch, transform, publish on a fixed interval.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use nest_core::TemperatureScale;
use nest_core::config::DEFAULT_REFRESH_INTERVAL;
use nest_metrics::NestMetrics;

use crate::client::NestClient;
use crate::error::FetchError;
use crate::transform::collection_readings;

/// Periodically publishes the vendor's device snapshot into the gauges.
pub struct Poller {
    client: NestClient,
    metrics: NestMetrics,
    interval: Duration,
    scale: TemperatureScale,
}

impl Poller {
    pub fn new(
        client: NestClient,
        metrics: NestMetrics,
        interval: Duration,
        scale: TemperatureScale,
    ) -> Self {
        // A zero period would make the ticker panic.
        let interval = if interval.is_zero() {
            DEFAULT_REFRESH_INTERVAL
        } else {
            interval
        };
        Self {
            client,
            metrics,
            interval,
            scale,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle. Returns the number of thermostats published.
    ///
    /// On error the gauges are left untouched.
    pub async fn poll_once(&self) -> Result<usize, FetchError> {
        let devices = self.client.fetch_devices().await?;
        let readings = collection_readings(&devices, self.scale);
        self.metrics.publish(&readings).await;
        Ok(readings.len())
    }

    /// Poll immediately, then once per interval, until shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            scale = self.scale.unit(),
            "poller started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(count) => debug!(thermostats = count, "poll cycle published"),
                        Err(e) => warn!(error = %e, "poll cycle skipped"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("poller shutting down");
                    break;
                }
            }
        }
    }
}
