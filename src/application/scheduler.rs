//! DCA scheduler: Paused/Active state machine driving periodic swap attempts

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::execution::{
    DcaConfig, QuoteService, SwapAttemptExecutor, SwapLimits, SwapService, SwapValidator,
    WalletProvider, DEFAULT_PERCENTAGE,
};
use crate::domain::frequency::{describe_interval, FrequencyControl, FrequencyTier};
use crate::domain::history::{DcaStats, HistoryTracker};
use crate::shared::types::{ErrorKind, QuoteInfo, SwapOutcome, TokenRef};
use crate::shared::utils::format_usd;

/// Countdown granularity
pub const DEFAULT_TICK_MS: u64 = 100;

/// Everything needed to build a scheduler
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub source_token: TokenRef,
    pub target_token: TokenRef,
    pub control: FrequencyControl,
    pub percentage: Decimal,
    pub tick_ms: u64,
    pub limits: SwapLimits,
}

impl SchedulerSettings {
    pub fn new(source_token: TokenRef, target_token: TokenRef, control: FrequencyControl) -> Self {
        Self {
            source_token,
            target_token,
            control,
            percentage: DEFAULT_PERCENTAGE,
            tick_ms: DEFAULT_TICK_MS,
            limits: SwapLimits::default(),
        }
    }
}

/// Result of a `start` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    AlreadyActive,
    NoBalance,
}

/// Read model exposed to callers
#[derive(Debug, Clone, Serialize)]
pub struct DcaSnapshot {
    pub config: DcaConfig,
    pub control: FrequencyControl,
    pub cadence: String,
    pub history: Vec<SwapOutcome>,
    pub total_swapped_usd: Decimal,
    pub stats: DcaStats,
    pub is_attempt_in_progress: bool,
    pub last_quote: Option<QuoteInfo>,
}

struct SchedulerState {
    config: DcaConfig,
    control: FrequencyControl,
    /// Bumped on every start, stop and re-arm; timers and attempts from an
    /// older generation must not touch the countdown
    generation: u64,
    last_quote: Option<QuoteInfo>,
}

impl SchedulerState {
    fn is_current(&self, generation: u64) -> bool {
        self.config.is_active && self.generation == generation
    }
}

struct TimerTasks {
    countdown: JoinHandle<()>,
    action: JoinHandle<()>,
}

impl TimerTasks {
    fn abort(self) {
        self.countdown.abort();
        self.action.abort();
    }
}

struct SchedulerInner {
    state: RwLock<SchedulerState>,
    tracker: RwLock<HistoryTracker>,
    timers: Mutex<Option<TimerTasks>>,
    executor: SwapAttemptExecutor,
    wallet: Arc<dyn WalletProvider>,
    tick: Duration,
}

impl SchedulerInner {
    fn timers(&self) -> MutexGuard<'_, Option<TimerTasks>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace_timers(&self, next: Option<TimerTasks>) {
        let previous = std::mem::replace(&mut *self.timers(), next);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn arm_timers(self: &Arc<Self>, generation: u64, frequency_ms: u64) -> TimerTasks {
        let period = Duration::from_millis(frequency_ms.max(1));
        TimerTasks {
            countdown: tokio::spawn(run_countdown(Arc::downgrade(self), generation, self.tick)),
            action: tokio::spawn(run_action(Arc::downgrade(self), generation, period)),
        }
    }

    /// Run one attempt and record it, including an `AlreadyInProgress`
    /// rejection from the executor.
    async fn run_attempt(&self) -> SwapOutcome {
        let (config, generation) = {
            let state = self.state.read().await;
            (state.config.clone(), state.generation)
        };
        let wallet = self.wallet.snapshot();

        let outcome = self.executor.attempt(&config, &wallet).await;
        let rejected = outcome.error_kind == Some(ErrorKind::AlreadyInProgress);
        self.tracker.write().await.record(outcome.clone());

        if !rejected {
            let mut state = self.state.write().await;
            if state.is_current(generation) {
                state.config.next_swap_in_ms = state.config.frequency_ms;
            } else {
                debug!("Attempt finished after stop or re-arm; countdown left untouched");
            }
        }

        outcome
    }
}

impl Drop for SchedulerInner {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(timers) = timers {
            timers.abort();
        }
    }
}

async fn run_countdown(inner: Weak<SchedulerInner>, generation: u64, tick: Duration) {
    let step = tick.as_millis() as u64;
    let mut ticker = interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let inner = match inner.upgrade() {
            Some(inner) => inner,
            None => break,
        };

        let mut state = inner.state.write().await;
        if !state.is_current(generation) {
            break;
        }
        state.config.next_swap_in_ms = state.config.next_swap_in_ms.saturating_sub(step);
    }
}

async fn run_action(inner: Weak<SchedulerInner>, generation: u64, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let inner = match inner.upgrade() {
            Some(inner) => inner,
            None => break,
        };

        if !inner.state.read().await.is_current(generation) {
            break;
        }
        if inner.executor.is_attempt_in_progress() {
            debug!("⏭️  Swap tick skipped: previous attempt still running");
            continue;
        }

        // Detached so that stopping the ticker never cancels a running swap
        tokio::spawn(async move {
            inner.run_attempt().await;
        });
    }
}

/// Owns the DCA configuration, timers and outcome history.
///
/// Cloning yields another handle to the same scheduler. Timers are cancelled
/// on `stop`, on `shutdown` and when the last handle is dropped.
#[derive(Clone)]
pub struct DcaScheduler {
    inner: Arc<SchedulerInner>,
}

impl DcaScheduler {
    pub fn new(
        settings: SchedulerSettings,
        quote_service: Arc<dyn QuoteService>,
        swap_service: Arc<dyn SwapService>,
        wallet: Arc<dyn WalletProvider>,
    ) -> Self {
        let control = settings.control;
        let config = DcaConfig::new(
            settings.source_token,
            settings.target_token,
            control.interval_ms(),
            settings.percentage,
        );
        let executor = SwapAttemptExecutor::new(
            quote_service,
            swap_service,
            wallet.clone(),
            SwapValidator::new(settings.limits),
        );

        Self {
            inner: Arc::new(SchedulerInner {
                state: RwLock::new(SchedulerState {
                    config,
                    control,
                    generation: 0,
                    last_quote: None,
                }),
                tracker: RwLock::new(HistoryTracker::new()),
                timers: Mutex::new(None),
                executor,
                wallet,
                tick: Duration::from_millis(settings.tick_ms.max(1)),
            }),
        }
    }

    /// Arm the schedule. Refused while active or when the wallet is empty.
    pub async fn start(&self) -> StartStatus {
        let mut state = self.inner.state.write().await;
        if state.config.is_active {
            debug!("Start ignored: DCA already active");
            return StartStatus::AlreadyActive;
        }

        let balance = self.inner.wallet.snapshot().balance_usd;
        if balance <= Decimal::ZERO {
            warn!("⚠️  Refusing to start DCA with zero balance");
            return StartStatus::NoBalance;
        }

        state.generation += 1;
        state.config.is_active = true;
        state.config.next_swap_in_ms = state.config.frequency_ms;
        let timers = self.inner.arm_timers(state.generation, state.config.frequency_ms);
        self.inner.replace_timers(Some(timers));

        info!(
            "🚀 DCA started: {} -> {} {}, {}% of {} USD per swap",
            state.config.source_token.symbol,
            state.config.target_token.symbol,
            describe_interval(state.config.frequency_ms),
            state.config.percentage,
            format_usd(balance)
        );
        StartStatus::Started
    }

    /// Disarm the schedule. Returns false if it was already paused.
    ///
    /// An attempt that is already running completes and is recorded.
    pub async fn stop(&self) -> bool {
        let mut state = self.inner.state.write().await;
        if !state.config.is_active {
            return false;
        }

        state.generation += 1;
        state.config.is_active = false;
        state.config.next_swap_in_ms = 0;
        self.inner.replace_timers(None);

        info!("🛑 DCA stopped");
        true
    }

    /// Stop and release the timers unconditionally
    pub async fn shutdown(&self) {
        self.stop().await;
        self.inner.replace_timers(None);
    }

    pub async fn update_tokens(&self, source: TokenRef, target: TokenRef) {
        let mut state = self.inner.state.write().await;
        info!("Tokens updated: {} -> {}", source.symbol, target.symbol);
        state.config.source_token = source;
        state.config.target_token = target;
        state.last_quote = None;
    }

    /// Exchange source and target token
    pub async fn swap_tokens(&self) {
        let mut state = self.inner.state.write().await;
        let config = &mut state.config;
        std::mem::swap(&mut config.source_token, &mut config.target_token);
        info!(
            "Tokens swapped: {} -> {}",
            config.source_token.symbol, config.target_token.symbol
        );
        state.last_quote = None;
    }

    /// Switch tier; the control value resets to the midpoint
    pub async fn on_tier_change(&self, tier: FrequencyTier) {
        let mut state = self.inner.state.write().await;
        state.control.set_tier(tier);
        self.apply_frequency(&mut state);
    }

    pub async fn on_value_change(&self, value: f64) {
        let mut state = self.inner.state.write().await;
        state.control.set_value(value);
        self.apply_frequency(&mut state);
    }

    fn apply_frequency(&self, state: &mut SchedulerState) {
        state.config.frequency_ms = state.control.interval_ms();
        info!(
            "Frequency set to {} ({} tier, control {})",
            describe_interval(state.config.frequency_ms),
            state.control.tier(),
            state.control.value()
        );

        if state.config.is_active {
            // New cadence applies from the next cycle
            state.generation += 1;
            state.config.next_swap_in_ms = state.config.frequency_ms;
            let timers = self.inner.arm_timers(state.generation, state.config.frequency_ms);
            self.inner.replace_timers(Some(timers));
        }
    }

    /// Run an attempt immediately, as if the action timer had fired
    pub async fn trigger_attempt_now(&self) -> SwapOutcome {
        self.inner.run_attempt().await
    }

    /// Fetch a display-only quote for the next swap
    pub async fn refresh_quote(&self) -> Option<QuoteInfo> {
        let config = self.config().await;
        let wallet = self.inner.wallet.snapshot();
        let quote = self.inner.executor.quote_preview(&config, &wallet).await;

        self.inner.state.write().await.last_quote = quote.clone();
        quote
    }

    pub async fn config(&self) -> DcaConfig {
        self.inner.state.read().await.config.clone()
    }

    pub async fn control(&self) -> FrequencyControl {
        self.inner.state.read().await.control
    }

    pub async fn is_active(&self) -> bool {
        self.inner.state.read().await.config.is_active
    }

    pub async fn history(&self) -> Vec<SwapOutcome> {
        self.inner.tracker.read().await.history()
    }

    pub async fn total_swapped_usd(&self) -> Decimal {
        self.inner.tracker.read().await.total_swapped_usd()
    }

    pub async fn stats(&self) -> DcaStats {
        self.inner.tracker.read().await.stats().clone()
    }

    pub fn is_attempt_in_progress(&self) -> bool {
        self.inner.executor.is_attempt_in_progress()
    }

    pub async fn snapshot(&self) -> DcaSnapshot {
        let (config, control, last_quote) = {
            let state = self.inner.state.read().await;
            (state.config.clone(), state.control, state.last_quote.clone())
        };
        let tracker = self.inner.tracker.read().await;

        DcaSnapshot {
            cadence: describe_interval(config.frequency_ms),
            config,
            control,
            history: tracker.history(),
            total_swapped_usd: tracker.total_swapped_usd(),
            stats: tracker.stats().clone(),
            is_attempt_in_progress: self.inner.executor.is_attempt_in_progress(),
            last_quote,
        }
    }
}
