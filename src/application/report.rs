// src/application/report.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{fs, path::Path};

use crate::domain::history::DcaStats;
use crate::shared::types::SwapOutcome;
use crate::shared::utils::format_usd;
use super::DcaSnapshot;

/// Summary of a DCA session
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub pair: String,
    pub cadence: String,
    pub percentage: Decimal,
    pub starting_balance_usd: Decimal,
    pub ending_balance_usd: Decimal,
    pub total_swapped_usd: Decimal,
    pub stats: DcaStats,
    pub history: Vec<SwapOutcome>,

    // Metadata
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionReport {
    pub fn new(
        snapshot: DcaSnapshot,
        starting_balance_usd: Decimal,
        ending_balance_usd: Decimal,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pair: format!(
                "{} -> {}",
                snapshot.config.source_token.symbol, snapshot.config.target_token.symbol
            ),
            cadence: snapshot.cadence,
            percentage: snapshot.config.percentage,
            starting_balance_usd,
            ending_balance_usd,
            total_swapped_usd: snapshot.total_swapped_usd,
            stats: snapshot.stats,
            history: snapshot.history,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("write report {}", path.as_ref().display()))
    }

    /// Human-readable summary lines
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Pair:            {} ({})", self.pair, self.cadence),
            format!("Attempts:        {}", self.stats.total_attempts),
            format!(
                "Live swaps:      {} ({:.1}% success)",
                self.stats.successful_swaps,
                self.stats.success_rate() * 100.0
            ),
            format!("Simulated fills: {}", self.stats.simulated_swaps),
            format!("Failures:        {}", self.stats.failed_attempts),
            format!("Swapped:         {} USD", format_usd(self.total_swapped_usd)),
            format!(
                "Balance:         {} -> {} USD",
                format_usd(self.starting_balance_usd),
                format_usd(self.ending_balance_usd)
            ),
        ];

        for outcome in self.history.iter().take(3) {
            let status = match (outcome.success, outcome.is_simulated()) {
                (true, false) => "✅ live",
                (true, true) => "🧪 simulated",
                (false, _) => "❌ failed",
            };
            let detail = outcome
                .error_message
                .clone()
                .or_else(|| outcome.tx_hash.clone())
                .unwrap_or_default();
            lines.push(format!(
                "  {} {} USD {}",
                status,
                format_usd(outcome.amount_in_usd),
                detail
            ));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::DcaConfig;
    use crate::domain::frequency::FrequencyControl;
    use crate::shared::errors::AttemptError;
    use crate::shared::types::{SwapReceipt, TokenRef};

    fn snapshot() -> DcaSnapshot {
        let usdc = TokenRef::new("usdc", "USDC", 6);
        let sol = TokenRef::new("sol", "SOL", 9);
        let receipt = SwapReceipt {
            tx_hash: "0xfeed".to_string(),
            amount_out: "0.03".to_string(),
            price: "160".to_string(),
        };
        let history = vec![
            SwapOutcome::failure(&usdc, &sol, Decimal::new(200, 2), &AttemptError::NetworkError("timeout".to_string())),
            SwapOutcome::live_fill(&usdc, &sol, Decimal::new(500, 2), receipt),
        ];

        DcaSnapshot {
            config: DcaConfig::new(usdc, sol, 31_000, Decimal::ONE),
            control: FrequencyControl::default(),
            cadence: "every 31s".to_string(),
            history,
            total_swapped_usd: Decimal::new(500, 2),
            stats: DcaStats {
                total_attempts: 2,
                successful_swaps: 1,
                failed_attempts: 1,
                total_swapped_usd: Decimal::new(500, 2),
                ..DcaStats::default()
            },
            is_attempt_in_progress: false,
            last_quote: None,
        }
    }

    #[test]
    fn test_report_serialization() {
        let report = SessionReport::new(snapshot(), Decimal::new(500, 0), Decimal::new(493, 0), Utc::now());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["pair"], "USDC -> SOL");
        assert_eq!(json["total_swapped_usd"], "5.00");
        assert_eq!(json["history"][1]["amount_in_usd"], "5.00");
        assert_eq!(json["history"][1]["source_kind"], "live");
        assert_eq!(json["history"][0]["error_kind"], "network_error");
    }

    #[test]
    fn test_summary_lines() {
        let report = SessionReport::new(snapshot(), Decimal::new(500, 0), Decimal::new(493, 0), Utc::now());
        let lines = report.summary_lines();

        assert!(lines.iter().any(|l| l.contains("50.0% success")));
        assert!(lines.iter().any(|l| l.contains("500.00 -> 493.00 USD")));
        assert!(lines.iter().any(|l| l.contains("0xfeed")));
    }
}
