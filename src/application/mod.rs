//! Application layer - scheduling use cases and the CLI surface

pub mod commands;
pub mod report;
pub mod scheduler;

pub use commands::{Cli, CommandExecutor, Commands};
pub use report::SessionReport;
pub use scheduler::{DcaScheduler, DcaSnapshot, SchedulerSettings, StartStatus, DEFAULT_TICK_MS};
