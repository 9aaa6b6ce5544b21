//! HTTP client for aggregator quote APIs (`/quote?inputMint=..&outputMint=..&amount=..`)

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::execution::QuoteService;
use crate::shared::types::{QuoteInfo, TokenRef};
use crate::shared::utils::format_token_amount;

/// Quote response fields we rely on
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "inAmount")]
    in_amount: String,
    #[serde(rename = "outAmount")]
    out_amount: String,
    #[serde(rename = "priceImpactPct", default)]
    price_impact_pct: Option<String>,
    #[serde(rename = "slippageBps", default)]
    slippage_bps: Option<u32>,
}

/// Aggregator quote client.
///
/// The USD amount is sized in source-token units at par, so the source
/// token is expected to be a USD stablecoin.
pub struct HttpQuoteClient {
    http_client: Client,
    base_url: String,
    slippage_bps: u32,
}

impl HttpQuoteClient {
    pub fn new(base_url: impl Into<String>, slippage_bps: u32, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build quote HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            slippage_bps,
        })
    }

    async fn fetch(&self, source: &TokenRef, target: &TokenRef, amount_units: u64) -> Result<QuoteResponse> {
        let url = format!("{}/quote", self.base_url);
        debug!("Fetching quote {} -> {} ({} units) from {}", source.symbol, target.symbol, amount_units, url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("inputMint", source.address.clone()),
                ("outputMint", target.address.clone()),
                ("amount", amount_units.to_string()),
                ("slippageBps", self.slippage_bps.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Quote API request failed with status: {}", response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuoteService for HttpQuoteClient {
    async fn quote(&self, source: &TokenRef, target: &TokenRef, amount_usd: Decimal) -> Result<QuoteInfo> {
        let units = to_base_units(amount_usd, source.decimals);
        if units == 0 {
            return Err(anyhow!("amount {} rounds to zero {} units", amount_usd, source.symbol));
        }

        let response = self.fetch(source, target, units).await?;
        quote_from_response(&response, target, amount_usd, self.slippage_bps)
    }
}

/// Largest scale a `Decimal` can carry
const MAX_SCALE: u8 = 28;

fn to_base_units(amount: Decimal, decimals: u8) -> u64 {
    if decimals > MAX_SCALE || amount <= Decimal::ZERO {
        return 0;
    }
    Decimal::from_i128_with_scale(10i128.pow(decimals as u32), 0)
        .checked_mul(amount)
        .and_then(|units| units.trunc().to_u64())
        .unwrap_or(0)
}

fn quote_from_response(
    response: &QuoteResponse,
    target: &TokenRef,
    amount_usd: Decimal,
    requested_slippage_bps: u32,
) -> Result<QuoteInfo> {
    let out_units: u64 = response
        .out_amount
        .parse()
        .with_context(|| format!("invalid outAmount {:?}", response.out_amount))?;
    if out_units == 0 {
        return Err(anyhow!("quote returned zero output (inAmount {})", response.in_amount));
    }

    if target.decimals > MAX_SCALE {
        return Err(anyhow!("{} has too many decimals ({})", target.symbol, target.decimals));
    }
    let expected = Decimal::from_i128_with_scale(out_units as i128, target.decimals as u32);
    let slippage_bps = response.slippage_bps.unwrap_or(requested_slippage_bps);
    let impact = response
        .price_impact_pct
        .as_deref()
        .and_then(|p| p.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(QuoteInfo {
        expected_output: format_token_amount(expected, target.decimals),
        price: format!("{:.6}", amount_usd.checked_div(expected).unwrap_or_default()),
        slippage_description: format!(
            "{:.2}% max slippage, {:.4}% price impact",
            slippage_bps as f64 / 100.0,
            impact * 100.0
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregator_response() {
        let body = r#"{
            "inputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "inAmount": "10000000",
            "outputMint": "So11111111111111111111111111111111111111112",
            "outAmount": "62500000",
            "otherAmountThreshold": "62187500",
            "swapMode": "ExactIn",
            "slippageBps": 50,
            "priceImpactPct": "0.0001",
            "routePlan": []
        }"#;
        let response: QuoteResponse = serde_json::from_str(body).unwrap();
        let sol = TokenRef::new("So11111111111111111111111111111111111111112", "SOL", 9);

        let quote = quote_from_response(&response, &sol, Decimal::new(10, 0), 100).unwrap();

        assert_eq!(quote.expected_output, "0.062500000");
        assert_eq!(quote.price, "160.000000");
        assert_eq!(quote.slippage_description, "0.50% max slippage, 0.0100% price impact");
    }

    #[test]
    fn test_zero_output_is_an_error() {
        let response = QuoteResponse {
            in_amount: "1".to_string(),
            out_amount: "0".to_string(),
            price_impact_pct: None,
            slippage_bps: None,
        };
        let sol = TokenRef::new("sol", "SOL", 9);
        assert!(quote_from_response(&response, &sol, Decimal::ONE, 50).is_err());
    }

    #[test]
    fn test_base_units() {
        assert_eq!(to_base_units(Decimal::new(10, 0), 6), 10_000_000);
        assert_eq!(to_base_units(Decimal::new(1, 7), 6), 0);
        assert_eq!(to_base_units(Decimal::new(-5, 0), 6), 0);
    }
}
