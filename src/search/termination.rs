//! Time/memory termination checks and the search state machine's external
//! outcomes (spec §4.9 state machine, §5 "Timeouts are checked at loop
//! iteration boundaries"). Grounded on the teacher's
//! `search_engines/termination_condition.rs`.

use memory_stats::memory_stats;
use std::time::{Duration, Instant};
use tracing::info;

/// A search run's outcome, one level above [`crate::error::ExitCode`]: this
/// is what the engine loop returns, and `src/bin/planner.rs` maps it (plus
/// any propagated [`crate::error::DownwardError`]) onto the exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Vec<crate::task::OperatorId>),
    Unsolvable,
    UnsolvedIncomplete,
    MemoryLimitExceeded,
    TimeLimitExceeded,
}

#[derive(Debug)]
pub struct TerminationCondition {
    time_limit: Option<Duration>,
    memory_limit_mb: Option<usize>,
    start_time: Instant,
    peak_memory_usage_mb: Option<usize>,
    last_log_time: Instant,
}

impl TerminationCondition {
    pub fn new(time_limit: Option<Duration>, memory_limit_mb: Option<usize>) -> Self {
        info!(
            time_limit = time_limit.map(|d| d.as_secs_f64()),
            memory_limit_mb = memory_limit_mb,
            "search started"
        );
        TerminationCondition {
            time_limit,
            memory_limit_mb,
            start_time: Instant::now(),
            peak_memory_usage_mb: None,
            last_log_time: Instant::now(),
        }
    }

    pub fn log_if_due(&mut self) {
        if self.last_log_time.elapsed() > Duration::from_secs(10) {
            self.last_log_time = Instant::now();
            self.sample_memory();
        }
    }

    fn sample_memory(&mut self) -> Option<usize> {
        let usage = memory_stats().map(|m| m.physical_mem / 1024 / 1024);
        if let Some(usage) = usage {
            self.peak_memory_usage_mb = Some(self.peak_memory_usage_mb.map_or(usage, |p| p.max(usage)));
        }
        usage
    }

    /// Best-effort check at a loop iteration boundary (spec §5). Samples
    /// memory as a side effect so the peak is accurate when we do exceed
    /// the bound.
    pub fn should_terminate(&mut self) -> Option<SearchOutcome> {
        if let Some(limit) = self.time_limit {
            if self.start_time.elapsed() > limit {
                return Some(SearchOutcome::TimeLimitExceeded);
            }
        }
        if let Some(limit) = self.memory_limit_mb {
            if let Some(usage) = self.sample_memory() {
                if usage > limit {
                    return Some(SearchOutcome::MemoryLimitExceeded);
                }
            }
        }
        None
    }

    pub fn finalise(&mut self) {
        self.sample_memory();
        info!(
            peak_memory_usage_mb = self.peak_memory_usage_mb,
            total_time_secs = self.start_time.elapsed().as_secs_f64(),
            "search finished"
        );
    }

    pub fn peak_memory_usage_mb(&self) -> Option<usize> {
        self.peak_memory_usage_mb
    }
}
