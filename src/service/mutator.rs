//! Random mutation loop
//!
//! Waits a random delay, sets the counter to a random value and re-arms,
//! until the shutdown token is cancelled.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::counter::AdsService;

/// Background task mutating the counter at random intervals
pub struct Mutator {
    service: Arc<AdsService>,
    /// Upper bound (exclusive) of the delay between mutations
    max_delay: Duration,
}

impl Mutator {
    pub fn new(service: Arc<AdsService>, max_delay: Duration) -> Self {
        Self { service, max_delay }
    }

    /// Spawn the loop on the current runtime
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Run until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        loop {
            let delay = self.next_delay();
            debug!(delay_ms = delay.as_millis() as u64, "Next ads mutation armed");

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            let value = rand::thread_rng().gen_range(0..=self.service.max_value());
            self.service.set_async(value).await;
            self.service.record_mutation();
            info!(
                ads_count = value,
                delay_ms = delay.as_millis() as u64,
                "Ads count set to random value"
            );
        }

        debug!("Ads mutation loop stopped");
    }

    fn next_delay(&self) -> Duration {
        let max_ms = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms.max(1)))
    }
}
