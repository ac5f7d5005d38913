//! Ads counter demo service
//!
//! Keeps a single counter that is randomly mutated on a timer, persisted to
//! disk, restored on startup, and exposed over HTTP and Prometheus.

pub mod app;
pub mod config;
pub mod metrics;
pub mod server;
pub mod service;
pub mod state;
pub mod util;

pub use app::App;
pub use config::Config;

/// Service version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
