//! History domain - rolling outcome history and aggregate statistics

mod history_tracker;

pub use history_tracker::{HistoryTracker, HISTORY_CAPACITY};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate statistics since the scheduler was created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DcaStats {
    pub total_attempts: u64,
    pub successful_swaps: u64,
    pub simulated_swaps: u64,
    pub failed_attempts: u64,
    /// Volume of live swaps only
    pub total_swapped_usd: Decimal,
    pub simulated_volume_usd: Decimal,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl DcaStats {
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.successful_swaps as f64 / self.total_attempts as f64
        }
    }

    pub fn average_swap_usd(&self) -> Decimal {
        if self.successful_swaps == 0 {
            Decimal::ZERO
        } else {
            self.total_swapped_usd / Decimal::from(self.successful_swaps)
        }
    }
}
