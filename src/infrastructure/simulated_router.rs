//! Paper swap router with latency and failure injection

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::execution::{QuoteService, SwapService};
use crate::shared::types::{SwapReceipt, TokenRef};
use super::PaperWallet;

/// Failure messages in the shape real routers and wallets produce
const INJECTED_FAILURES: [&str; 4] = [
    "network request failed: connection reset",
    "Failed to fetch",
    "User rejected the request",
    "execution reverted: Too little received",
];

/// Fills swaps against a [`PaperWallet`] at quoted prices
pub struct SimulatedSwapRouter {
    wallet: Arc<PaperWallet>,
    pricing: Arc<dyn QuoteService>,
    failure_rate: f64,
    latency: Duration,
}

impl SimulatedSwapRouter {
    pub fn new(
        wallet: Arc<PaperWallet>,
        pricing: Arc<dyn QuoteService>,
        failure_rate: f64,
        latency: Duration,
    ) -> Self {
        Self {
            wallet,
            pricing,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            latency,
        }
    }

    /// Pick an injected failure, if this submission should fail
    fn roll_failure(&self) -> Option<&'static str> {
        let mut rng = rand::thread_rng();
        if rng.gen::<f64>() < self.failure_rate {
            Some(INJECTED_FAILURES[rng.gen_range(0..INJECTED_FAILURES.len())])
        } else {
            None
        }
    }
}

#[async_trait]
impl SwapService for SimulatedSwapRouter {
    async fn swap(
        &self,
        source: &TokenRef,
        target: &TokenRef,
        amount_usd: Decimal,
        wallet_address: &str,
    ) -> Result<SwapReceipt> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(message) = self.roll_failure() {
            return Err(anyhow!(message));
        }

        let quote = self.pricing.quote(source, target, amount_usd).await?;
        self.wallet.debit(amount_usd)?;

        let tx_hash = format!("0x{}", uuid::Uuid::new_v4().simple());
        debug!("Paper fill {} for {} ({} {})", tx_hash, wallet_address, quote.expected_output, target.symbol);

        Ok(SwapReceipt {
            tx_hash,
            amount_out: quote.expected_output,
            price: quote.price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::WalletProvider;
    use crate::infrastructure::StaticQuoteService;
    use std::collections::HashMap;

    fn pricing() -> Arc<dyn QuoteService> {
        let prices = HashMap::from([("USDC".to_string(), Decimal::ONE), ("SOL".to_string(), Decimal::new(100, 0))]);
        Arc::new(StaticQuoteService::new(prices, 0))
    }

    fn tokens() -> (TokenRef, TokenRef) {
        (TokenRef::new("usdc", "USDC", 6), TokenRef::new("sol", "SOL", 9))
    }

    #[tokio::test]
    async fn test_fill_debits_wallet() {
        let wallet = Arc::new(PaperWallet::new(Some("paper".to_string()), Decimal::new(50, 0)));
        let router = SimulatedSwapRouter::new(wallet.clone(), pricing(), 0.0, Duration::ZERO);
        let (usdc, sol) = tokens();

        let receipt = router.swap(&usdc, &sol, Decimal::new(500, 2), "paper").await.unwrap();

        assert!(receipt.tx_hash.starts_with("0x"));
        assert_eq!(receipt.amount_out, "0.050000000");
        assert_eq!(wallet.balance_usd(), "45.00");
    }

    #[tokio::test]
    async fn test_always_failing_router() {
        let wallet = Arc::new(PaperWallet::new(Some("paper".to_string()), Decimal::new(50, 0)));
        let router = SimulatedSwapRouter::new(wallet.clone(), pricing(), 1.0, Duration::ZERO);
        let (usdc, sol) = tokens();

        let err = router.swap(&usdc, &sol, Decimal::new(500, 2), "paper").await.unwrap_err();
        assert!(INJECTED_FAILURES.contains(&err.to_string().as_str()));
        assert_eq!(wallet.balance(), Decimal::new(50, 0));
    }

    #[tokio::test]
    async fn test_overdraft_reports_insufficient_funds() {
        let wallet = Arc::new(PaperWallet::new(Some("paper".to_string()), Decimal::ONE));
        let router = SimulatedSwapRouter::new(wallet, pricing(), 0.0, Duration::ZERO);
        let (usdc, sol) = tokens();

        let err = router.swap(&usdc, &sol, Decimal::new(500, 2), "paper").await.unwrap_err();
        assert!(err.to_string().contains("insufficient funds"));
    }
}
