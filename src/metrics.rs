//! Turns raw process counters into per-tick metrics and keeps their history.

use log::*;
use tokio::time::Instant;

use crate::{
    history::{HISTORY_LEN, MetricHistory},
    proc::{InspectError, Inspector, SystemContext},
};

/// CPU utilisation over the last interval, normalised to all cores.
///
/// Returns 0.0 without a previous reading or when no time has passed.
/// Not clamped: a racy counter read can briefly yield values outside
/// `0..=100`, and those are kept as measured.
pub fn derive_cpu_percent(prev_secs: Option<f64>, curr_secs: f64, elapsed_secs: f64, cores: u32) -> f64 {
    match prev_secs {
        Some(prev) if elapsed_secs > 0.0 => {
            ((curr_secs - prev) / elapsed_secs) * 100.0 / f64::from(cores.max(1))
        }
        _ => 0.0,
    }
}

pub fn derive_memory_percent(memory_mb: f64, total_ram_mb: f64) -> f64 {
    (memory_mb / total_ram_mb) * 100.0
}

/// Metrics derived for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProcessSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_mb: f64,
    pub threads: u32,
}

/// Sampling state for one monitored process.
#[derive(Debug)]
pub struct Sampler {
    pid: u32,
    system: SystemContext,
    last_cpu_secs: Option<f64>,
    last_instant: Instant,
    pub cpu_percent: MetricHistory<f64>,
    pub memory_percent: MetricHistory<f64>,
    pub memory_mb: MetricHistory<f64>,
    pub threads: MetricHistory<u32>,
    threads_available: bool,
}

impl Sampler {
    pub fn new(pid: u32, system: SystemContext, now: Instant) -> Self {
        Self {
            pid,
            system,
            last_cpu_secs: None,
            last_instant: now,
            cpu_percent: MetricHistory::new(HISTORY_LEN, 0.0),
            memory_percent: MetricHistory::new(HISTORY_LEN, 0.0),
            memory_mb: MetricHistory::new(HISTORY_LEN, 0.0),
            threads: MetricHistory::new(HISTORY_LEN, 0),
            threads_available: true,
        }
    }

    /// False once the backend reported it cannot count threads here.
    pub fn threads_available(&self) -> bool {
        self.threads_available
    }

    /// Stop querying a metric the backend does not support. Logged once.
    pub fn disable_threads(&mut self, err: &InspectError) {
        if self.threads_available {
            warn!(target: "Sampler", "Thread count disabled: {}", err);
            self.threads_available = false;
        }
    }

    /// Take one sample and push it into every history.
    ///
    /// A terminal error (process gone, access lost) is returned without
    /// touching the histories. Any other failed read reuses the previous
    /// tick's value for that metric.
    pub fn sample(
        &mut self,
        inspector: &mut dyn Inspector,
        now: Instant,
    ) -> Result<ProcessSnapshot, InspectError> {
        let pid = self.pid;
        recover(inspector.refresh(pid), (), "refresh")?;

        let cpu_percent = match inspector.cpu_time_seconds(pid) {
            Ok(curr) => {
                let elapsed = now.duration_since(self.last_instant).as_secs_f64();
                let percent = derive_cpu_percent(self.last_cpu_secs, curr, elapsed, self.system.cores);
                self.last_cpu_secs = Some(curr);
                self.last_instant = now;
                percent
            }
            // The baseline is kept so the next good read covers the whole gap.
            Err(err) => recover(Err(err), self.cpu_percent.latest(), "cpu time")?,
        };
        let memory_mb = recover(inspector.memory_mb(pid), self.memory_mb.latest(), "memory")?;
        let threads = if self.threads_available {
            match inspector.thread_count(pid) {
                Err(err @ InspectError::Unsupported(_)) => {
                    self.disable_threads(&err);
                    0
                }
                result => recover(result, self.threads.latest(), "thread count")?,
            }
        } else {
            0
        };

        let snapshot = ProcessSnapshot {
            cpu_percent,
            memory_percent: derive_memory_percent(memory_mb, self.system.total_ram_mb),
            memory_mb,
            threads,
        };
        trace!(target: "Sampler", "pid {} {:?}", pid, snapshot);
        self.push(snapshot);
        Ok(snapshot)
    }

    fn push(&mut self, snapshot: ProcessSnapshot) {
        self.cpu_percent.push(snapshot.cpu_percent);
        self.memory_percent.push(snapshot.memory_percent);
        self.memory_mb.push(snapshot.memory_mb);
        self.threads.push(snapshot.threads);
    }
}

fn recover<T>(result: Result<T, InspectError>, fallback: T, what: &str) -> Result<T, InspectError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_terminal() => Err(err),
        Err(err) => {
            warn!(target: "Sampler", "Reusing previous {}: {}", what, err);
            Ok(fallback)
        }
    }
}
