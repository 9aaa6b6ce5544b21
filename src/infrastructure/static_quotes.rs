//! Quote service backed by a fixed USD price table

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::execution::QuoteService;
use crate::shared::types::{QuoteInfo, TokenRef};
use crate::shared::utils::format_token_amount;

/// Prices keyed by token symbol
pub struct StaticQuoteService {
    prices_usd: HashMap<String, Decimal>,
    slippage_bps: u32,
}

impl StaticQuoteService {
    pub fn new(prices_usd: HashMap<String, Decimal>, slippage_bps: u32) -> Self {
        let prices_usd = prices_usd
            .into_iter()
            .map(|(symbol, price)| (symbol.to_uppercase(), price))
            .collect();
        Self { prices_usd, slippage_bps }
    }

    fn price_of(&self, token: &TokenRef) -> Result<Decimal> {
        match self.prices_usd.get(&token.symbol.to_uppercase()) {
            Some(price) if *price > Decimal::ZERO => Ok(*price),
            _ => Err(anyhow!("no price available for {}", token.symbol)),
        }
    }
}

#[async_trait]
impl QuoteService for StaticQuoteService {
    async fn quote(&self, source: &TokenRef, target: &TokenRef, amount_usd: Decimal) -> Result<QuoteInfo> {
        // Source must be priced even though the amount is already in USD
        self.price_of(source)?;
        let target_price = self.price_of(target)?;

        let slippage = Decimal::new(self.slippage_bps as i64, 4);
        let expected = amount_usd / target_price * (Decimal::ONE - slippage);

        Ok(QuoteInfo {
            expected_output: format_token_amount(expected, target.decimals),
            price: format!("{:.6}", target_price),
            slippage_description: format!("{:.2}% max slippage", Decimal::new(self.slippage_bps as i64, 2)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> StaticQuoteService {
        let prices = HashMap::from([("usdc".to_string(), Decimal::ONE), ("SOL".to_string(), Decimal::new(160, 0))]);
        StaticQuoteService::new(prices, 50)
    }

    #[tokio::test]
    async fn test_quote_applies_slippage() {
        let usdc = TokenRef::new("usdc", "USDC", 6);
        let sol = TokenRef::new("sol", "SOL", 9);

        let quote = service().quote(&usdc, &sol, Decimal::new(16, 0)).await.unwrap();
        assert_eq!(quote.expected_output, "0.099500000");
        assert_eq!(quote.price, "160.000000");
        assert_eq!(quote.slippage_description, "0.50% max slippage");
    }

    #[tokio::test]
    async fn test_unknown_symbol_fails() {
        let usdc = TokenRef::new("usdc", "USDC", 6);
        let bonk = TokenRef::new("bonk", "BONK", 5);
        assert!(service().quote(&usdc, &bonk, Decimal::ONE).await.is_err());
    }
}
