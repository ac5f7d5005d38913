//! Metrics and observability
//!
//! Prometheus scrape endpoint for the ads gauge and runtime metrics.

mod exporter;
mod process;
mod runtime;

pub use exporter::MetricsExporter;
pub use process::{parse_stat, ProcStat, ProcessCollector};
pub use runtime::RuntimeSampler;

/// Current ads count
pub const ADS_COUNT_GAUGE: &str = "demo_ads_count";
/// Random mutations applied since startup
pub const ADS_MUTATIONS_COUNTER: &str = "demo_ads_mutations_total";

pub const RUNTIME_WORKERS_GAUGE: &str = "demo_runtime_workers";
pub const RUNTIME_ALIVE_TASKS_GAUGE: &str = "demo_runtime_alive_tasks";
pub const RUNTIME_GLOBAL_QUEUE_DEPTH_GAUGE: &str = "demo_runtime_global_queue_depth";
pub const UPTIME_GAUGE: &str = "demo_uptime_seconds";

pub const PROCESS_CPU_SECONDS: &str = "process_cpu_seconds_total";
pub const PROCESS_RESIDENT_MEMORY: &str = "process_resident_memory_bytes";
pub const PROCESS_VIRTUAL_MEMORY: &str = "process_virtual_memory_bytes";
pub const PROCESS_OPEN_FDS: &str = "process_open_fds";
pub const PROCESS_START_TIME: &str = "process_start_time_seconds";
