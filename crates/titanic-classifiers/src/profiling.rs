//! Resource profiling around a unit of work.
//!
//! [`profile`] wraps a closure, measures process memory, global CPU load and
//! wall-clock time before and after, logs one `[PROFILING]` line and hands the
//! closure's value back untouched together with the measurements.

use std::fmt;
use std::time::{Duration, Instant};

use sysinfo::{Pid, System, MINIMUM_CPU_UPDATE_INTERVAL};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Memory and CPU readings at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceSnapshot {
    /// Resident set size of this process in MB.
    pub rss_mb: f64,
    /// Global CPU usage in percent.
    pub cpu_pct: f64,
}

/// Keeps a `System` handle alive between readings.
///
/// sysinfo computes CPU usage over the time between two refreshes, so the CPU
/// figure is refreshed at most once per `MINIMUM_CPU_UPDATE_INTERVAL`; a
/// snapshot taken sooner repeats the previous CPU reading. CPU deltas over
/// short spans are therefore indicative only. Memory is read every time.
pub struct ResourceSampler {
    sys: System,
    pid: Option<Pid>,
    cpu_refreshed: Instant,
    cpu_pct: f64,
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| log::debug!("Could not determine current pid: {}", e))
            .ok();
        let mut sys = System::new();
        sys.refresh_cpu();
        Self {
            sys,
            pid,
            cpu_refreshed: Instant::now(),
            cpu_pct: 0.0,
        }
    }

    pub fn snapshot(&mut self) -> ResourceSnapshot {
        if self.cpu_refreshed.elapsed() >= MINIMUM_CPU_UPDATE_INTERVAL {
            self.sys.refresh_cpu();
            self.cpu_refreshed = Instant::now();
            self.cpu_pct = self.sys.global_cpu_info().cpu_usage() as f64;
        }
        let cpu_pct = self.cpu_pct;
        let rss_mb = match self.pid {
            Some(pid) if self.sys.refresh_process(pid) => self
                .sys
                .process(pid)
                .map_or(0.0, |p| p.memory() as f64 / BYTES_PER_MB),
            _ => 0.0,
        };
        ResourceSnapshot { rss_mb, cpu_pct }
    }
}

/// Before/after readings of one profiled call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceProfile {
    pub before: ResourceSnapshot,
    pub after: ResourceSnapshot,
    pub wall_time: Duration,
}

impl ResourceProfile {
    pub fn memory_delta_mb(&self) -> f64 {
        self.after.rss_mb - self.before.rss_mb
    }

    pub fn cpu_delta_pct(&self) -> f64 {
        self.after.cpu_pct - self.before.cpu_pct
    }
}

impl fmt::Display for ResourceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RAM used: {:.2} MB | CPU change: {:.2}% | Time: {:.2}s",
            self.memory_delta_mb(),
            self.cpu_delta_pct(),
            self.wall_time.as_secs_f64()
        )
    }
}

/// Run `f`, log its resource usage under `label` and return its value.
///
/// Errors carried inside `T` are not inspected; a `Result` comes back
/// exactly as the closure produced it.
pub fn profile<T, F>(label: &str, f: F) -> (T, ResourceProfile)
where
    F: FnOnce() -> T,
{
    let mut sampler = ResourceSampler::new();
    let before = sampler.snapshot();
    let start = Instant::now();

    let value = f();

    let wall_time = start.elapsed();
    let after = sampler.snapshot();
    let profile = ResourceProfile {
        before,
        after,
        wall_time,
    };
    log::info!("[PROFILING] {}: {}", label, profile);
    (value, profile)
}
