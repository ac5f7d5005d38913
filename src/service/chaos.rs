//! Fault injection timer
//!
//! Terminates the process once, a fixed delay after startup. Only armed when
//! `[chaos].enabled` is set.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ChaosConfig;

/// One-shot timer that ends the process with a non-zero exit code
pub struct ChaosTimer {
    delay: Duration,
    exit_code: i32,
}

impl ChaosTimer {
    pub fn new(delay: Duration, exit_code: i32) -> Self {
        Self { delay, exit_code }
    }

    pub fn from_config(config: &ChaosConfig) -> Self {
        Self::new(config.delay(), config.exit_code)
    }

    /// Arm the timer; on fire the process exits with the configured code
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<bool> {
        info!(
            delay_secs = self.delay.as_secs(),
            exit_code = self.exit_code,
            "Fault injection armed"
        );
        tokio::spawn(self.run(shutdown, |code| std::process::exit(code)))
    }

    /// Wait for the delay and invoke `on_fire` with the exit code.
    ///
    /// Returns `false` if `shutdown` was cancelled first.
    pub async fn run<F>(self, shutdown: CancellationToken, on_fire: F) -> bool
    where
        F: FnOnce(i32),
    {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!("Fault injection disarmed");
                false
            }
            _ = tokio::time::sleep(self.delay) => {
                error!(
                    after_secs = self.delay.as_secs(),
                    exit_code = self.exit_code,
                    "*** Inducing error as scheduled ***"
                );
                on_fire(self.exit_code);
                true
            }
        }
    }
}
