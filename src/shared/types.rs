//! Common types used across the application

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::AttemptError;
use super::utils::{format_usd, generate_id};

/// Token representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRef {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenRef {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Tokens are keyed by address only
    pub fn same_asset(&self, other: &TokenRef) -> bool {
        self.address == other.address
    }
}

/// Closed set of failure kinds recorded on outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AlreadyInProgress,
    WalletUnavailable,
    InsufficientBalance,
    AmountTooSmall,
    ValidationFailed,
    InsufficientFunds,
    UserRejected,
    NetworkError,
    Unknown,
}

impl ErrorKind {
    /// Precondition failures never reach a collaborator
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ErrorKind::WalletUnavailable
                | ErrorKind::InsufficientBalance
                | ErrorKind::AmountTooSmall
                | ErrorKind::ValidationFailed
        )
    }
}

/// Where a fill came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Submitted through the swap router; funds moved
    Live,
    /// Degraded estimate produced after the live swap failed; no funds moved
    Simulated,
}

/// Display-only quote for a prospective swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteInfo {
    pub expected_output: String,
    pub price: String,
    pub slippage_description: String,
}

/// What the swap router reports back for a submitted swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub tx_hash: String,
    pub amount_out: String,
    pub price: String,
}

/// Point-in-time view of the connected wallet
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSnapshot {
    pub address: Option<String>,
    pub balance_usd: Decimal,
}

/// Result record of one swap attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub source_symbol: String,
    pub target_symbol: String,
    /// Serialized as a decimal string
    pub amount_in_usd: Decimal,
    pub amount_out_estimate: String,
    pub price: Option<String>,
    pub tx_hash: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub source_kind: SourceKind,
    pub note: Option<String>,
}

impl SwapOutcome {
    /// Successful swap submitted through the router
    pub fn live_fill(
        source: &TokenRef,
        target: &TokenRef,
        amount_in_usd: Decimal,
        receipt: SwapReceipt,
    ) -> Self {
        Self {
            id: generate_id(),
            timestamp: Utc::now(),
            success: true,
            source_symbol: source.symbol.clone(),
            target_symbol: target.symbol.clone(),
            amount_in_usd,
            amount_out_estimate: receipt.amount_out,
            price: Some(receipt.price),
            tx_hash: Some(receipt.tx_hash),
            error_kind: None,
            error_message: None,
            source_kind: SourceKind::Live,
            note: None,
        }
    }

    /// Best-effort estimate recorded after the live swap failed.
    ///
    /// `cause` is the classified live failure and stays attached so that a
    /// simulated fill can never be mistaken for a real one.
    pub fn simulated_fill(
        source: &TokenRef,
        target: &TokenRef,
        amount_in_usd: Decimal,
        quote: QuoteInfo,
        cause: &AttemptError,
    ) -> Self {
        Self {
            id: generate_id(),
            timestamp: Utc::now(),
            success: true,
            source_symbol: source.symbol.clone(),
            target_symbol: target.symbol.clone(),
            amount_in_usd,
            amount_out_estimate: quote.expected_output,
            price: Some(quote.price),
            tx_hash: None,
            error_kind: Some(cause.kind()),
            error_message: Some(cause.to_string()),
            source_kind: SourceKind::Simulated,
            note: Some(format!(
                "Simulated fill: live swap of {} USD failed ({})",
                format_usd(amount_in_usd),
                cause
            )),
        }
    }

    pub fn failure(
        source: &TokenRef,
        target: &TokenRef,
        amount_in_usd: Decimal,
        error: &AttemptError,
    ) -> Self {
        Self {
            id: generate_id(),
            timestamp: Utc::now(),
            success: false,
            source_symbol: source.symbol.clone(),
            target_symbol: target.symbol.clone(),
            amount_in_usd,
            amount_out_estimate: "0".to_string(),
            price: None,
            tx_hash: None,
            error_kind: Some(error.kind()),
            error_message: Some(error.to_string()),
            source_kind: SourceKind::Live,
            note: None,
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.source_kind == SourceKind::Simulated
    }

    /// Success that actually moved funds
    pub fn is_live_success(&self) -> bool {
        self.success && self.source_kind == SourceKind::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> TokenRef {
        TokenRef::new("usdc-mint", "USDC", 6)
    }

    fn sol() -> TokenRef {
        TokenRef::new("sol-mint", "SOL", 9)
    }

    #[test]
    fn test_simulated_fill_is_tagged() {
        let cause = AttemptError::classify("Failed to fetch");
        let quote = QuoteInfo {
            expected_output: "0.0125".to_string(),
            price: "160.00".to_string(),
            slippage_description: "0.5%".to_string(),
        };

        let outcome = SwapOutcome::simulated_fill(&usdc(), &sol(), Decimal::new(2, 0), quote, &cause);

        assert!(outcome.success);
        assert!(outcome.is_simulated());
        assert!(!outcome.is_live_success());
        assert_eq!(outcome.error_kind, Some(ErrorKind::NetworkError));
        assert!(outcome.note.as_deref().unwrap().contains("2.00 USD"));
        assert!(outcome.tx_hash.is_none());
    }

    #[test]
    fn test_failure_has_no_price() {
        let err = AttemptError::ValidationFailed("same token".to_string());
        let outcome = SwapOutcome::failure(&usdc(), &usdc(), Decimal::ONE, &err);

        assert!(!outcome.success);
        assert!(outcome.price.is_none());
        assert_eq!(outcome.error_kind, Some(ErrorKind::ValidationFailed));
        assert!(outcome.error_kind.unwrap().is_precondition());
    }

    #[test]
    fn test_outcome_serializes_source_kind() {
        let receipt = SwapReceipt {
            tx_hash: "0xabc".to_string(),
            amount_out: "0.031".to_string(),
            price: "161.2".to_string(),
        };
        let outcome = SwapOutcome::live_fill(&usdc(), &sol(), Decimal::new(500, 2), receipt);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["source_kind"], "live");
        assert_eq!(json["tx_hash"], "0xabc");
        assert!(json["error_kind"].is_null());
        assert_eq!(json["amount_in_usd"], "5.00");
    }
}
