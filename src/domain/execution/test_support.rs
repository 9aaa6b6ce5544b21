//! Collaborator doubles shared by the executor and scheduler tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

use crate::shared::types::{QuoteInfo, SwapReceipt, TokenRef};
use super::{QuoteService, SwapService, WalletProvider};

pub(crate) fn usdc() -> TokenRef {
    TokenRef::new("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6)
}

pub(crate) fn sol() -> TokenRef {
    TokenRef::new("So11111111111111111111111111111111111111112", "SOL", 9)
}

/// Wallet with a settable balance that counts refresh requests
pub(crate) struct FixedWallet {
    address: Option<String>,
    balance: Mutex<String>,
    pub refreshes: AtomicUsize,
}

impl FixedWallet {
    pub(crate) fn new(address: Option<&str>, balance: &str) -> Arc<Self> {
        Arc::new(Self {
            address: address.map(|a| a.to_string()),
            balance: Mutex::new(balance.to_string()),
            refreshes: AtomicUsize::new(0),
        })
    }

    pub(crate) fn connected(balance: &str) -> Arc<Self> {
        Self::new(Some("wallet-1"), balance)
    }

    pub(crate) fn set_balance(&self, balance: &str) {
        *self.balance.lock().unwrap() = balance.to_string();
    }
}

impl WalletProvider for FixedWallet {
    fn address(&self) -> Option<String> {
        self.address.clone()
    }

    fn balance_usd(&self) -> String {
        self.balance.lock().unwrap().clone()
    }

    fn request_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Quote service returning a fixed quote, or failing on demand
pub(crate) struct CountingQuoteService {
    pub calls: AtomicUsize,
    fail: bool,
}

impl CountingQuoteService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: false })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: true })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteService for CountingQuoteService {
    async fn quote(&self, _source: &TokenRef, _target: &TokenRef, amount_usd: Decimal) -> Result<QuoteInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("quote backend unreachable"));
        }
        Ok(QuoteInfo {
            expected_output: format!("{:.6}", amount_usd / Decimal::ONE_HUNDRED),
            price: "100.00".to_string(),
            slippage_description: "0.5% max slippage".to_string(),
        })
    }
}

/// Swap service with scripted failures and an optional gate that holds
/// every submission until the test releases it
pub(crate) struct MockSwapService {
    pub calls: AtomicUsize,
    failures: Mutex<VecDeque<String>>,
    gate: Option<Arc<Semaphore>>,
    pub entered: Notify,
    available: bool,
}

impl MockSwapService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::build(None, true))
    }

    pub(crate) fn unavailable() -> Arc<Self> {
        Arc::new(Self::build(None, false))
    }

    pub(crate) fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
        Arc::new(Self::build(Some(gate), true))
    }

    fn build(gate: Option<Arc<Semaphore>>, available: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures: Mutex::new(VecDeque::new()),
            gate,
            entered: Notify::new(),
            available,
        }
    }

    /// Queue an error message for the next submission
    pub(crate) fn fail_next(&self, message: &str) {
        self.failures.lock().unwrap().push_back(message.to_string());
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SwapService for MockSwapService {
    async fn swap(
        &self,
        _source: &TokenRef,
        _target: &TokenRef,
        amount_usd: Decimal,
        _wallet_address: &str,
    ) -> Result<SwapReceipt> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }

        let scripted = self.failures.lock().unwrap().pop_front();
        if let Some(message) = scripted {
            return Err(anyhow!(message));
        }

        Ok(SwapReceipt {
            tx_hash: format!("0xtx{}", n),
            amount_out: format!("{:.6}", amount_usd / Decimal::ONE_HUNDRED),
            price: "100.00".to_string(),
        })
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
