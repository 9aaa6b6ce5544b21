//! Execution domain - swap sizing, validation and submission

mod collaborators;
mod swap_executor;
mod swap_validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use collaborators::{QuoteService, SwapService, WalletProvider};
pub use swap_executor::SwapAttemptExecutor;
pub use swap_validator::SwapValidator;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::shared::types::TokenRef;

/// Share of the balance swapped per attempt, in percent
pub const DEFAULT_PERCENTAGE: Decimal = Decimal::ONE;

/// Live DCA configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaConfig {
    pub source_token: TokenRef,
    pub target_token: TokenRef,
    pub frequency_ms: u64,
    pub percentage: Decimal,
    pub is_active: bool,
    pub next_swap_in_ms: u64,
}

impl DcaConfig {
    pub fn new(source_token: TokenRef, target_token: TokenRef, frequency_ms: u64, percentage: Decimal) -> Self {
        Self {
            source_token,
            target_token,
            frequency_ms: frequency_ms.max(1),
            percentage,
            is_active: false,
            next_swap_in_ms: 0,
        }
    }

    /// USD amount one attempt would swap out of `balance_usd`.
    ///
    /// Truncated to whole cents so a swap never exceeds its share.
    pub fn swap_amount_usd(&self, balance_usd: Decimal) -> Decimal {
        let mut amount = (balance_usd * self.percentage / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::ToZero);
        amount.rescale(2);
        amount
    }
}

/// Bounds on a single swap, in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapLimits {
    pub min_swap_usd: Decimal,
    pub max_swap_usd: Decimal,
}

impl Default for SwapLimits {
    fn default() -> Self {
        Self {
            min_swap_usd: Decimal::new(1, 2),
            max_swap_usd: Decimal::new(10_000, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(percentage: Decimal) -> DcaConfig {
        DcaConfig::new(TokenRef::new("a", "A", 6), TokenRef::new("b", "B", 9), 60_000, percentage)
    }

    #[test]
    fn test_swap_amount_is_whole_cents() {
        let amount = config(DEFAULT_PERCENTAGE).swap_amount_usd(Decimal::new(12_345, 2));
        assert_eq!(amount, Decimal::new(123, 2));
        assert_eq!(amount.to_string(), "1.23");
    }

    #[test]
    fn test_swap_amount_never_rounds_up() {
        let amount = config(Decimal::new(25, 1)).swap_amount_usd(Decimal::new(1_999, 2));
        // 2.5% of 19.99 is 0.49975
        assert_eq!(amount, Decimal::new(49, 2));
    }
}
