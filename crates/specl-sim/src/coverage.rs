//! Action coverage counting.

use crate::state::{Location, State};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Static per-location counts, keyed by the rendered location.
pub type CoverageCounts = HashMap<String, u64>;

/// One line of a coverage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    pub location: String,
    pub count: u64,
}

/// Counts how often each action location produced a generated state.
///
/// The simulator thread records while the progress reporter reads, so the
/// counters are sharded (`DashMap`) and individually atomic. Reports never
/// reset the counters.
pub struct CoverageTracker {
    enabled: bool,
    counts: DashMap<Location, AtomicU64>,
    static_counts: CoverageCounts,
}

impl CoverageTracker {
    pub fn new(enabled: bool, static_counts: CoverageCounts) -> Self {
        Self {
            enabled,
            counts: DashMap::new(),
            static_counts,
        }
    }

    /// A tracker that records nothing and reports nothing.
    pub fn disabled() -> Self {
        Self::new(false, CoverageCounts::new())
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count every action location that produced `state`.
    pub fn record(&self, state: &State) {
        if !self.enabled {
            return;
        }
        for loc in state.origin() {
            if let Some(counter) = self.counts.get(loc) {
                counter.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            self.counts
                .entry(loc.clone())
                .or_insert_with(|| AtomicU64::new(0))
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Static counts plus everything recorded so far, sorted by location.
    pub fn report(&self) -> Vec<CoverageEntry> {
        if !self.enabled {
            return Vec::new();
        }
        let mut merged = self.static_counts.clone();
        for entry in self.counts.iter() {
            *merged.entry(entry.key().to_string()).or_insert(0) +=
                entry.value().load(Ordering::Relaxed);
        }
        let mut entries: Vec<CoverageEntry> = merged
            .into_iter()
            .map(|(location, count)| CoverageEntry { location, count })
            .collect();
        entries.sort_by(|a, b| a.location.cmp(&b.location));
        entries
    }
}
