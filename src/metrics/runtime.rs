//! Runtime metrics
//!
//! Periodically samples the tokio runtime, uptime and process metrics into
//! gauges.

use metrics::gauge;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::process::ProcessCollector;
use super::{
    RUNTIME_ALIVE_TASKS_GAUGE, RUNTIME_GLOBAL_QUEUE_DEPTH_GAUGE, RUNTIME_WORKERS_GAUGE,
    UPTIME_GAUGE,
};

/// Background task that publishes runtime gauges
pub struct RuntimeSampler {
    interval: Duration,
    started_at: Instant,
    process: ProcessCollector,
}

impl RuntimeSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started_at: Instant::now(),
            process: ProcessCollector::new(),
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Sample on every tick until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => self.sample(),
            }
        }
    }

    fn sample(&self) {
        let runtime = tokio::runtime::Handle::current().metrics();

        gauge!(RUNTIME_WORKERS_GAUGE).set(runtime.num_workers() as f64);
        gauge!(RUNTIME_ALIVE_TASKS_GAUGE).set(runtime.num_alive_tasks() as f64);
        gauge!(RUNTIME_GLOBAL_QUEUE_DEPTH_GAUGE).set(runtime.global_queue_depth() as f64);
        gauge!(UPTIME_GAUGE).set(self.started_at.elapsed().as_secs_f64());

        self.process.collect();
    }
}
