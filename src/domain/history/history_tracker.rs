//! Bounded outcome history

use rust_decimal::Decimal;
use std::collections::VecDeque;

use crate::shared::types::SwapOutcome;
use super::DcaStats;

/// Number of outcomes kept, newest first
pub const HISTORY_CAPACITY: usize = 10;

/// Records swap outcomes and accumulates totals
#[derive(Debug, Clone)]
pub struct HistoryTracker {
    history: VecDeque<SwapOutcome>,
    stats: DcaStats,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
            stats: DcaStats::default(),
        }
    }

    /// Prepend an outcome, evicting the oldest beyond capacity.
    ///
    /// Only live fills add to `total_swapped_usd`; simulated fills are kept
    /// apart in `simulated_volume_usd`.
    pub fn record(&mut self, outcome: SwapOutcome) {
        let stats = &mut self.stats;
        stats.total_attempts += 1;
        stats.last_attempt_at = Some(outcome.timestamp);

        if outcome.is_live_success() {
            stats.successful_swaps += 1;
            stats.total_swapped_usd += outcome.amount_in_usd;
        } else if outcome.success {
            stats.simulated_swaps += 1;
            stats.simulated_volume_usd += outcome.amount_in_usd;
        } else {
            stats.failed_attempts += 1;
        }

        self.history.push_front(outcome);
        self.history.truncate(HISTORY_CAPACITY);
    }

    /// Newest first
    pub fn history(&self) -> Vec<SwapOutcome> {
        self.history.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&SwapOutcome> {
        self.history.front()
    }

    pub fn total_swapped_usd(&self) -> Decimal {
        self.stats.total_swapped_usd
    }

    pub fn stats(&self) -> &DcaStats {
        &self.stats
    }
}

impl Default for HistoryTracker {
    fn default() -> Self {
        Self::new()
    }
}
