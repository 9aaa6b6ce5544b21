//! Interfaces of the wallet, quote and swap collaborators

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::shared::types::{QuoteInfo, SwapReceipt, TokenRef, WalletSnapshot};
use crate::shared::utils::parse_usd;

/// Price quotes for a prospective swap
#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn quote(
        &self,
        source: &TokenRef,
        target: &TokenRef,
        amount_usd: Decimal,
    ) -> Result<QuoteInfo>;
}

/// Swap submission through a DEX router.
///
/// Errors are untyped; their message is classified by the executor.
#[async_trait]
pub trait SwapService: Send + Sync {
    async fn swap(
        &self,
        source: &TokenRef,
        target: &TokenRef,
        amount_usd: Decimal,
        wallet_address: &str,
    ) -> Result<SwapReceipt>;

    /// Whether the router can accept submissions at all
    fn is_available(&self) -> bool {
        true
    }
}

/// Connected wallet as seen by the engine. Read-only apart from refresh.
pub trait WalletProvider: Send + Sync {
    fn address(&self) -> Option<String>;

    /// Current balance in USD as a decimal string
    fn balance_usd(&self) -> String;

    /// Ask the wallet to re-read its balance. Must not block.
    fn request_refresh(&self);

    fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot {
            address: self.address().filter(|a| !a.trim().is_empty()),
            balance_usd: parse_usd(&self.balance_usd()),
        }
    }
}
