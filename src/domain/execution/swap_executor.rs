//! Swap attempt executor with precondition checks and simulated fallback

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::shared::errors::AttemptError;
use crate::shared::types::{QuoteInfo, SwapOutcome, WalletSnapshot};
use crate::shared::utils::format_usd;
use super::{DcaConfig, QuoteService, SwapService, SwapValidator, WalletProvider};

/// Clears the in-flight flag however the attempt ends
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs one swap attempt at a time.
///
/// Every path, including collaborator errors, resolves to a [`SwapOutcome`].
pub struct SwapAttemptExecutor {
    quote_service: Arc<dyn QuoteService>,
    swap_service: Arc<dyn SwapService>,
    wallet: Arc<dyn WalletProvider>,
    validator: SwapValidator,
    in_flight: AtomicBool,
}

impl SwapAttemptExecutor {
    pub fn new(
        quote_service: Arc<dyn QuoteService>,
        swap_service: Arc<dyn SwapService>,
        wallet: Arc<dyn WalletProvider>,
        validator: SwapValidator,
    ) -> Self {
        Self {
            quote_service,
            swap_service,
            wallet,
            validator,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_attempt_in_progress(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.in_flight })
    }

    /// Execute one DCA swap against the given wallet state
    pub async fn attempt(&self, config: &DcaConfig, wallet: &WalletSnapshot) -> SwapOutcome {
        let source = &config.source_token;
        let target = &config.target_token;

        // 1. Serialize attempts
        let _guard = match self.try_begin() {
            Some(guard) => guard,
            None => {
                debug!("Swap attempt rejected: another attempt is outstanding");
                return SwapOutcome::failure(source, target, Decimal::ZERO, &AttemptError::AlreadyInProgress);
            }
        };

        let balance = wallet.balance_usd;
        let amount = config.swap_amount_usd(balance).max(Decimal::ZERO);

        // 2-6. Preconditions, no network calls before these pass
        let address = match self.check_preconditions(config, wallet) {
            Ok(address) => address,
            Err(err) => {
                warn!("⚠️  Swap precondition failed: {}", err);
                return SwapOutcome::failure(source, target, amount, &err);
            }
        };

        info!(
            "🔄 Swapping {} USD {} -> {} (balance {} USD)",
            format_usd(amount),
            source.symbol,
            target.symbol,
            format_usd(balance)
        );

        // 7. Submit
        match self.swap_service.swap(source, target, amount, &address).await {
            Ok(receipt) => {
                info!("✅ Swap confirmed: {} ({} {})", receipt.tx_hash, receipt.amount_out, target.symbol);
                // 8. Fire and forget
                self.wallet.request_refresh();
                SwapOutcome::live_fill(source, target, amount, receipt)
            }
            Err(err) => {
                // 9. Classify, then fall back to a simulated fill
                let cause = AttemptError::classify(&format!("{:#}", err));
                warn!("❌ Live swap failed ({:?}): {}", cause.kind(), cause);
                self.simulate_fill(config, amount, cause).await
            }
        }
    }

    /// Steps 2-6 of an attempt. Returns the wallet address to swap from.
    fn check_preconditions(&self, config: &DcaConfig, wallet: &WalletSnapshot) -> Result<String, AttemptError> {
        let address = match &wallet.address {
            Some(address) if self.swap_service.is_available() => address.clone(),
            Some(_) => {
                return Err(AttemptError::WalletUnavailable("swap router is not available".to_string()))
            }
            None => return Err(AttemptError::WalletUnavailable("no wallet connected".to_string())),
        };

        if wallet.balance_usd <= Decimal::ZERO {
            return Err(AttemptError::InsufficientBalance(format_usd(wallet.balance_usd)));
        }

        let amount = config.swap_amount_usd(wallet.balance_usd);
        self.validator.check_minimum(amount)?;
        self.validator.validate(config, wallet.balance_usd, amount)?;

        Ok(address)
    }

    /// Degraded path after a failed live swap: estimate the fill from a quote
    async fn simulate_fill(&self, config: &DcaConfig, amount: Decimal, cause: AttemptError) -> SwapOutcome {
        let source = &config.source_token;
        let target = &config.target_token;

        match self.quote_service.quote(source, target, amount).await {
            Ok(quote) => {
                warn!("🧪 Recorded simulated fill for {} USD; no funds moved", format_usd(amount));
                SwapOutcome::simulated_fill(source, target, amount, quote, &cause)
            }
            Err(sim_err) => {
                error!("Fallback simulation failed: {:#}", sim_err);
                let err = AttemptError::Unknown(format!(
                    "{}; fallback simulation failed: {:#}",
                    cause, sim_err
                ));
                SwapOutcome::failure(source, target, amount, &err)
            }
        }
    }

    /// Display-only quote for the swap the next attempt would make.
    ///
    /// Never blocks an attempt; failures read as `None`.
    pub async fn quote_preview(&self, config: &DcaConfig, wallet: &WalletSnapshot) -> Option<QuoteInfo> {
        let amount = config.swap_amount_usd(wallet.balance_usd);
        if self.validator.check_minimum(amount).is_err()
            || config.source_token.same_asset(&config.target_token)
        {
            return None;
        }

        match self
            .quote_service
            .quote(&config.source_token, &config.target_token, amount)
            .await
        {
            Ok(quote) => Some(quote),
            Err(err) => {
                warn!("Quote unavailable: {:#}", err);
                None
            }
        }
    }
}
