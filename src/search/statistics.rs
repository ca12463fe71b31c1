//! Search progress counters (spec §4.9 step 5). Grounded on the teacher's
//! `search_engines/search_statistics.rs`.

use tracing::info;

#[derive(Debug, Default)]
pub struct SearchStatistics {
    pub expanded: u64,
    pub evaluated: u64,
    pub generated: u64,
    pub reopened: u64,
    pub dead_ends: u64,
}

impl SearchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) {
        info!(
            expanded = self.expanded,
            evaluated = self.evaluated,
            generated = self.generated,
            reopened = self.reopened,
            dead_ends = self.dead_ends,
            "search progress"
        );
    }
}
