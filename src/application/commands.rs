//! CLI commands and handlers
use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, sleep_until, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::application::report::SessionReport;
use crate::application::{DcaScheduler, StartStatus};
use crate::config::Config;
use crate::domain::execution::QuoteService;
use crate::domain::frequency::{describe_interval, map_named_to_frequency, FrequencyTier};
use crate::infrastructure::{HttpQuoteClient, PaperWallet, SimulatedSwapRouter, StaticQuoteService};
use crate::shared::utils::{format_usd, parse_usd};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "dca-engine")]
#[command(version, about = "Dollar-cost averaging scheduler with paper swap execution")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a paper DCA session
    Run {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Session length in seconds (runs until Ctrl-C if omitted)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Frequency tier (seconds, minutes, hours, days)
        #[arg(short, long)]
        tier: Option<String>,

        /// Control value 0-100 within the tier, higher is faster
        #[arg(short, long)]
        value: Option<f64>,

        /// Where to write the JSON session report
        #[arg(short, long, default_value = "dca-session.json")]
        report: PathBuf,
    },

    /// Preview the interval for a tier and control value
    Frequency {
        /// Frequency tier (seconds, minutes, hours, days)
        #[arg(short, long)]
        tier: String,

        /// Control value 0-100 within the tier
        #[arg(short, long, default_value_t = 50.0)]
        value: f64,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands) -> Result<()> {
        match command {
            Commands::Run { config, duration, tier, value, report } => {
                let mut cfg = match config {
                    Some(path) => Config::from_file(path)?,
                    None => Config::default(),
                };
                if let Some(tier) = tier {
                    cfg.schedule.tier = tier;
                }
                if let Some(value) = value {
                    cfg.schedule.control_value = value;
                }
                Self::execute_run_command(cfg, duration, report).await
            }
            Commands::Frequency { tier, value } => {
                if tier.parse::<FrequencyTier>().is_err() {
                    warn!("⚠️  Unknown tier '{}', using the default interval", tier);
                }
                info!("{}", frequency_preview(&tier, value));
                Ok(())
            }
        }
    }

    async fn execute_run_command(cfg: Config, duration: Option<u64>, report_path: PathBuf) -> Result<()> {
        let starting_balance = parse_usd(&cfg.wallet.balance_usd);
        let wallet = Arc::new(PaperWallet::new(cfg.wallet.address.clone(), starting_balance));

        let pricing: Arc<dyn QuoteService> = Arc::new(StaticQuoteService::new(
            cfg.simulation.prices.clone(),
            cfg.simulation.slippage_bps,
        ));
        let quote_service: Arc<dyn QuoteService> = match &cfg.quote {
            Some(q) => {
                info!("🌐 Using quote endpoint {}", q.endpoint);
                Arc::new(HttpQuoteClient::new(
                    q.endpoint.clone(),
                    q.slippage_bps,
                    Duration::from_millis(q.timeout_ms),
                )?)
            }
            None => pricing.clone(),
        };
        let router = Arc::new(SimulatedSwapRouter::new(
            wallet.clone(),
            pricing,
            cfg.simulation.failure_rate,
            Duration::from_millis(cfg.simulation.latency_ms),
        ));

        let settings = cfg.scheduler_settings();
        info!("📊 Session configuration:");
        info!("   Pair: {} -> {}", settings.source_token.symbol, settings.target_token.symbol);
        info!(
            "   Cadence: {} ({} @ {:.0})",
            describe_interval(settings.control.interval_ms()),
            settings.control.tier(),
            settings.control.value()
        );
        info!("   Per swap: {}% of balance", settings.percentage);
        info!("   Paper balance: {} USD", format_usd(starting_balance));

        let scheduler = DcaScheduler::new(settings, quote_service, router, wallet.clone());
        let started_at = Utc::now();

        match scheduler.start().await {
            StartStatus::Started => {}
            StartStatus::AlreadyActive => warn!("DCA was already running"),
            StartStatus::NoBalance => bail!("paper wallet has no balance to spend"),
        }

        if let Some(quote) = scheduler.refresh_quote().await {
            info!("💱 Next swap ≈ {} at {} ({})", quote.expected_output, quote.price, quote.slippage_description);
        }

        let deadline = async {
            match duration {
                Some(secs) => {
                    info!("⏱️  Session will run for {} seconds", secs);
                    sleep_until(Instant::now() + Duration::from_secs(secs)).await
                }
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let mut progress = interval(PROGRESS_INTERVAL);
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);
        progress.tick().await;

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    info!("✅ Session finished");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Interrupted, stopping DCA");
                    break;
                }
                _ = progress.tick() => {
                    let snapshot = scheduler.snapshot().await;
                    info!(
                        "📈 Next swap in {:.1}s | attempts: {} | swapped: {} USD | balance: {} USD",
                        snapshot.config.next_swap_in_ms as f64 / 1000.0,
                        snapshot.stats.total_attempts,
                        format_usd(snapshot.total_swapped_usd),
                        format_usd(wallet.balance())
                    );
                    scheduler.refresh_quote().await;
                }
            }
        }

        scheduler.shutdown().await;
        drain(&scheduler).await;

        let report = SessionReport::new(scheduler.snapshot().await, starting_balance, wallet.balance(), started_at);
        info!("📋 Session summary:");
        for line in report.summary_lines() {
            info!("   {}", line);
        }
        report.write_to(&report_path)?;
        info!("💾 Report written to {}", report_path.display());

        Ok(())
    }
}

/// Wait for an in-flight attempt to land in history
async fn drain(scheduler: &DcaScheduler) {
    let started = Instant::now();
    while scheduler.is_attempt_in_progress() {
        if started.elapsed() >= DRAIN_TIMEOUT {
            warn!("⚠️  Attempt still running after {:?}, reporting without it", DRAIN_TIMEOUT);
            return;
        }
        sleep(Duration::from_millis(50)).await;
    }
}

pub fn frequency_preview(tier: &str, value: f64) -> String {
    let interval_ms = map_named_to_frequency(value, tier);
    format!("{} @ {:.0} -> {} ms ({})", tier, value, interval_ms, describe_interval(interval_ms))
}
