//! DCA Engine - recurring swap scheduling with paper execution
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{DcaScheduler, DcaSnapshot, SchedulerSettings, StartStatus};
pub use domain::execution::{DcaConfig, QuoteService, SwapAttemptExecutor, SwapService, WalletProvider};
pub use domain::frequency::{map_to_frequency, FrequencyControl, FrequencyTier};
pub use domain::history::{DcaStats, HistoryTracker};
pub use shared::types::{SwapOutcome, TokenRef};
