//! Background progress reporting.
//!
//! The simulator bumps lock-free counters on its own thread; a reporter
//! thread samples them on a timer and hands the numbers to a `ProgressSink`.
//! Reads are relaxed: a tick may lag the simulator by a few states.

use crate::coverage::{CoverageEntry, CoverageTracker};
use memory_stats::memory_stats;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// Returns current process memory usage in MB, or None if unavailable.
fn current_memory_mb() -> Option<usize> {
    memory_stats().map(|stats| stats.physical_mem / (1024 * 1024))
}

/// Lock-free counters shared between the simulator and the reporter.
#[derive(Debug, Default)]
pub struct SimCounters {
    /// Generated states, including the initial states.
    pub states_generated: AtomicU64,
    /// Behaviors started.
    pub traces: AtomicU64,
}

impl SimCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn states_generated(&self) -> u64 {
        self.states_generated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn traces(&self) -> u64 {
        self.traces.load(Ordering::Relaxed)
    }
}

/// Something worth telling the user while a simulation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress {
        states_generated: u64,
        traces: u64,
        memory_mb: Option<usize>,
    },
    Coverage(Vec<CoverageEntry>),
}

/// Receives progress events. Called from the reporter thread.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Logs progress events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Progress {
                states_generated,
                traces,
                memory_mb,
            } => match memory_mb {
                Some(mb) => info!(states = states_generated, traces, memory_mb = mb, "progress"),
                None => info!(states = states_generated, traces, "progress"),
            },
            ProgressEvent::Coverage(entries) => {
                info!(locations = entries.len(), "coverage");
                for entry in entries {
                    info!(location = %entry.location, count = entry.count, "  covered");
                }
            }
        }
    }
}

/// Stop flag plus the condition variable that wakes the reporter.
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    /// Wait up to `timeout`. Returns true if stop was requested.
    fn wait(&self, timeout: Duration) -> bool {
        let guard = self.stopped.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(|e| e.into_inner());
        *guard
    }

    fn stop(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(|e| e.into_inner());
        *stopped = true;
        self.wake.notify_all();
    }
}

/// Handle to a running reporter thread. Stopping (or dropping) the handle
/// wakes the thread and joins it.
pub struct ProgressReporter {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Spawn a reporter that reports every `progress_interval` and adds a
    /// coverage report every `coverage_interval / progress_interval` ticks.
    pub fn spawn(
        counters: Arc<SimCounters>,
        coverage: Arc<CoverageTracker>,
        sink: Arc<dyn ProgressSink>,
        progress_interval: Duration,
        coverage_interval: Duration,
    ) -> Self {
        let progress_interval = progress_interval.max(Duration::from_millis(1));
        let ticks_per_coverage =
            (coverage_interval.as_nanos() / progress_interval.as_nanos()).max(1) as u64;
        let signal = Arc::new(StopSignal {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        });

        let thread_signal = Arc::clone(&signal);
        let handle = thread::Builder::new()
            .name("specl-sim-progress".into())
            .spawn(move || {
                let mut until_coverage = ticks_per_coverage;
                loop {
                    if thread_signal.wait(progress_interval) {
                        break;
                    }
                    let tick = panic::catch_unwind(AssertUnwindSafe(|| {
                        sink.report(&ProgressEvent::Progress {
                            states_generated: counters.states_generated(),
                            traces: counters.traces(),
                            memory_mb: current_memory_mb(),
                        });
                        if until_coverage > 1 {
                            until_coverage -= 1;
                        } else {
                            if coverage.is_enabled() {
                                sink.report(&ProgressEvent::Coverage(coverage.report()));
                            }
                            until_coverage = ticks_per_coverage;
                        }
                    }));
                    if tick.is_err() {
                        error!("progress reporter died");
                        break;
                    }
                }
                debug!("progress reporter stopped");
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                error!(error = %e, "failed to start progress reporter");
                None
            }
        };
        Self { signal, handle }
    }

    /// Wake the reporter, wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.signal.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("progress reporter panicked");
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}
