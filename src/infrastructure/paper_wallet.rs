//! In-memory wallet for paper trading

use anyhow::{anyhow, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::domain::execution::WalletProvider;
use crate::shared::utils::format_usd;

/// Wallet whose USD balance lives in memory, tracked in cents
pub struct PaperWallet {
    address: Option<String>,
    balance_cents: AtomicU64,
    refresh_requests: AtomicU64,
}

impl PaperWallet {
    pub fn new(address: Option<String>, balance_usd: Decimal) -> Self {
        Self {
            address,
            balance_cents: AtomicU64::new(to_cents(balance_usd)),
            refresh_requests: AtomicU64::new(0),
        }
    }

    pub fn balance(&self) -> Decimal {
        from_cents(self.balance_cents.load(Ordering::Acquire))
    }

    /// Remove `amount_usd` from the balance, failing if it would go negative
    pub fn debit(&self, amount_usd: Decimal) -> Result<()> {
        let cents = to_cents(amount_usd);
        self.balance_cents
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| current.checked_sub(cents))
            .map(|_| ())
            .map_err(|current| {
                anyhow!(
                    "insufficient funds: balance {} USD, swap {} USD",
                    format_usd(from_cents(current)),
                    format_usd(amount_usd)
                )
            })
    }

    pub fn refresh_requests(&self) -> u64 {
        self.refresh_requests.load(Ordering::Relaxed)
    }
}

impl WalletProvider for PaperWallet {
    fn address(&self) -> Option<String> {
        self.address.clone()
    }

    fn balance_usd(&self) -> String {
        format_usd(self.balance())
    }

    fn request_refresh(&self) {
        let n = self.refresh_requests.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Paper wallet refresh #{} ({} USD)", n, self.balance_usd());
    }
}

/// Negative amounts count as zero
fn to_cents(amount_usd: Decimal) -> u64 {
    (amount_usd * Decimal::ONE_HUNDRED).round().to_u64().unwrap_or(0)
}

fn from_cents(cents: u64) -> Decimal {
    Decimal::from(cents) / Decimal::ONE_HUNDRED
}
