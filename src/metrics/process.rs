//! Process metrics
//!
//! CPU time, memory, open descriptors and start time in the standard
//! Prometheus `process_*` names. Values other than the start time are only
//! available on Linux, where they are read from procfs.

use metrics::gauge;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{
    PROCESS_CPU_SECONDS, PROCESS_OPEN_FDS, PROCESS_RESIDENT_MEMORY, PROCESS_START_TIME,
    PROCESS_VIRTUAL_MEMORY,
};

/// Fields of `/proc/self/stat` the collector publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcStat {
    /// User mode time in clock ticks
    pub utime: u64,
    /// Kernel mode time in clock ticks
    pub stime: u64,
    /// Virtual memory size in bytes
    pub vsize: u64,
    /// Resident set size in pages
    pub rss_pages: u64,
}

/// Parse the single line of `/proc/<pid>/stat`.
///
/// The command name (field 2) may contain spaces and parentheses, so
/// fields are counted from the last `)`.
pub fn parse_stat(contents: &str) -> Option<ProcStat> {
    let rest = &contents[contents.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();

    // fields[0] is field 3 (state)
    let field = |n: usize| fields.get(n - 3)?.parse::<u64>().ok();

    Some(ProcStat {
        utime: field(14)?,
        stime: field(15)?,
        vsize: field(23)?,
        rss_pages: field(24)?,
    })
}

/// Publishes process gauges on each sample
pub struct ProcessCollector {
    start_time_secs: f64,
}

impl ProcessCollector {
    pub fn new() -> Self {
        let start_time_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self { start_time_secs }
    }

    pub fn collect(&self) {
        gauge!(PROCESS_START_TIME).set(self.start_time_secs);

        #[cfg(target_os = "linux")]
        self.collect_procfs();
    }

    #[cfg(target_os = "linux")]
    fn collect_procfs(&self) {
        if let Some(stat) = std::fs::read_to_string("/proc/self/stat")
            .ok()
            .as_deref()
            .and_then(parse_stat)
        {
            // SAFETY: sysconf only reads static system configuration
            let (ticks, page_size) = unsafe {
                (libc::sysconf(libc::_SC_CLK_TCK), libc::sysconf(libc::_SC_PAGESIZE))
            };
            if ticks > 0 {
                let cpu = (stat.utime + stat.stime) as f64 / ticks as f64;
                gauge!(PROCESS_CPU_SECONDS).set(cpu);
            }
            if page_size > 0 {
                gauge!(PROCESS_RESIDENT_MEMORY).set((stat.rss_pages * page_size as u64) as f64);
            }
            gauge!(PROCESS_VIRTUAL_MEMORY).set(stat.vsize as f64);
        }

        if let Ok(entries) = std::fs::read_dir("/proc/self/fd") {
            gauge!(PROCESS_OPEN_FDS).set(entries.count() as f64);
        }
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}
