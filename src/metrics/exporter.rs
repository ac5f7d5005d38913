//! Prometheus metrics exporter
//!
//! HTTP endpoint for Prometheus scraping.

use anyhow::{anyhow, Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::MetricsConfig;

use super::runtime::RuntimeSampler;
use super::{
    ADS_COUNT_GAUGE, ADS_MUTATIONS_COUNTER, PROCESS_CPU_SECONDS, PROCESS_OPEN_FDS,
    PROCESS_RESIDENT_MEMORY, PROCESS_START_TIME, PROCESS_VIRTUAL_MEMORY,
    RUNTIME_ALIVE_TASKS_GAUGE, RUNTIME_GLOBAL_QUEUE_DEPTH_GAUGE, RUNTIME_WORKERS_GAUGE,
    UPTIME_GAUGE,
};

/// Running scrape endpoint and runtime sampler
pub struct MetricsExporter {
    bind_addr: SocketAddr,
    listener_task: JoinHandle<()>,
    sampler_task: JoinHandle<()>,
}

impl MetricsExporter {
    /// Bind the scrape endpoint and install the global recorder.
    ///
    /// Must be called from within a tokio runtime. A bind failure is returned
    /// to the caller; nothing is retried.
    pub fn start(config: &MetricsConfig, shutdown: CancellationToken) -> Result<Self> {
        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(config.bind_addr)
            .build()
            .with_context(|| format!("Failed to start metrics endpoint on {}", config.bind_addr))?;

        metrics::set_global_recorder(recorder)
            .map_err(|_| anyhow!("A global metrics recorder is already installed"))?;

        describe_metrics();

        let bind_addr = config.bind_addr;
        let listener_shutdown = shutdown.clone();
        let listener_task = tokio::spawn(async move {
            tokio::select! {
                _ = listener_shutdown.cancelled() => {}
                result = exporter => {
                    // The exporter error type carries no Debug/Display impl
                    if result.is_err() {
                        error!(bind_addr = %bind_addr, "Metrics endpoint failed");
                    }
                }
            }
        });

        let sampler_task = RuntimeSampler::new(config.runtime_sample_interval()).spawn(shutdown);

        info!(bind_addr = %config.bind_addr, "Metrics endpoint started");

        Ok(Self {
            bind_addr: config.bind_addr,
            listener_task,
            sampler_task,
        })
    }

    /// Wait for the endpoint and sampler to stop after shutdown was signalled
    pub async fn stopped(self) {
        let _ = self.listener_task.await;
        let _ = self.sampler_task.await;
        info!(bind_addr = %self.bind_addr, "Metrics endpoint stopped");
    }
}

/// Register metric descriptions
fn describe_metrics() {
    describe_gauge!(ADS_COUNT_GAUGE, "Current ads count.");
    describe_counter!(ADS_MUTATIONS_COUNTER, "Random ads count mutations applied");
    describe_gauge!(RUNTIME_WORKERS_GAUGE, "Async runtime worker threads");
    describe_gauge!(RUNTIME_ALIVE_TASKS_GAUGE, "Tasks alive on the async runtime");
    describe_gauge!(RUNTIME_GLOBAL_QUEUE_DEPTH_GAUGE, "Tasks waiting in the runtime global queue");
    describe_gauge!(UPTIME_GAUGE, "Seconds since the service started");
    describe_gauge!(PROCESS_CPU_SECONDS, "Total user and system CPU time spent in seconds");
    describe_gauge!(PROCESS_RESIDENT_MEMORY, "Resident memory size in bytes");
    describe_gauge!(PROCESS_VIRTUAL_MEMORY, "Virtual memory size in bytes");
    describe_gauge!(PROCESS_OPEN_FDS, "Number of open file descriptors");
    describe_gauge!(PROCESS_START_TIME, "Start time of the process since unix epoch in seconds");
}
