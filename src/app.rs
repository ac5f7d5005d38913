//! Service lifecycle
//!
//! Wires the state store, counter service, background tasks and listeners,
//! and tears them down in order on shutdown.

use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::metrics::MetricsExporter;
use crate::server::HttpServer;
use crate::service::{AdsService, ChaosTimer, CounterMetrics, Mutator};
use crate::state::StateStore;

/// A started service instance
pub struct App {
    service: Arc<AdsService>,
    http: HttpServer,
    /// Stops listeners, samplers and the chaos timer
    shutdown: CancellationToken,
    /// Stops the mutation loop only, so the final save sees a settled value
    mutation_stop: CancellationToken,
    mutator: JoinHandle<()>,
    chaos: Option<JoinHandle<bool>>,
    metrics: Option<MetricsExporter>,
}

impl App {
    /// Start every component. Metrics and HTTP bind failures are fatal.
    pub async fn start(config: &Config) -> Result<Self> {
        let shutdown = CancellationToken::new();

        let metrics = if config.metrics.enabled {
            Some(MetricsExporter::start(&config.metrics, shutdown.clone())?)
        } else {
            None
        };
        let counter_metrics = if metrics.is_some() {
            CounterMetrics::registered()
        } else {
            CounterMetrics::noop()
        };

        let store = StateStore::new(&config.state.path, config.mutation.max_value);
        let service = AdsService::restore(store, counter_metrics);
        info!(ads_count = service.get(), "Ads service initialized");

        let http = HttpServer::bind(config.server.bind_addr, service.clone()).await?;

        let mutation_stop = shutdown.child_token();
        let mutator =
            Mutator::new(service.clone(), config.mutation.max_delay()).spawn(mutation_stop.clone());

        let chaos = if config.chaos.enabled {
            Some(ChaosTimer::from_config(&config.chaos).spawn(shutdown.clone()))
        } else {
            None
        };

        Ok(Self {
            service,
            http,
            shutdown,
            mutation_stop,
            mutator,
            chaos,
            metrics,
        })
    }

    pub fn service(&self) -> &Arc<AdsService> {
        &self.service
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.http.local_addr()
    }

    /// Serve until `signal` resolves or the HTTP server fails, then shut down
    pub async fn run<S>(self, signal: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let Self {
            service,
            http,
            shutdown,
            mutation_stop,
            mutator,
            chaos,
            metrics,
        } = self;

        let mut http_task = tokio::spawn(http.run(shutdown.clone()));

        let early_exit = tokio::select! {
            _ = signal => {
                info!("Shutdown signal received");
                None
            }
            result = &mut http_task => {
                warn!("HTTP server exited before shutdown signal");
                Some(result)
            }
        };

        mutation_stop.cancel();
        let _ = mutator.await;

        info!(ads_count = service.get(), "Saving state on shutdown...");
        service.persist_async().await;

        shutdown.cancel();
        if let Some(chaos) = chaos {
            let _ = chaos.await;
        }
        if let Some(metrics) = metrics {
            metrics.stopped().await;
        }

        let served = match early_exit {
            Some(result) => result,
            None => http_task.await,
        };
        served.context("HTTP server task failed")??;

        info!("Service stopped");
        Ok(())
    }
}
