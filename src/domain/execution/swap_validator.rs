//! Swap validation before submission

use rust_decimal::Decimal;

use crate::shared::errors::AttemptError;
use crate::shared::utils::format_usd;
use super::{DcaConfig, SwapLimits};

/// Validates a sized swap before it is sent anywhere
#[derive(Debug, Clone, Default)]
pub struct SwapValidator {
    limits: SwapLimits,
}

impl SwapValidator {
    pub fn new(limits: SwapLimits) -> Self {
        Self { limits }
    }

    /// Reject amounts below the minimum viable swap size
    pub fn check_minimum(&self, amount_usd: Decimal) -> Result<(), AttemptError> {
        if amount_usd < self.limits.min_swap_usd {
            return Err(AttemptError::AmountTooSmall(
                format_usd(amount_usd),
                format_usd(self.limits.min_swap_usd),
            ));
        }
        Ok(())
    }

    /// Check every swap invariant; all violations are reported together
    pub fn validate(
        &self,
        config: &DcaConfig,
        balance_usd: Decimal,
        amount_usd: Decimal,
    ) -> Result<(), AttemptError> {
        let mut reasons = Vec::new();

        if amount_usd < self.limits.min_swap_usd || amount_usd > self.limits.max_swap_usd {
            reasons.push(format!(
                "amount {} USD outside allowed range [{}, {}]",
                format_usd(amount_usd),
                format_usd(self.limits.min_swap_usd),
                format_usd(self.limits.max_swap_usd)
            ));
        }

        if config.source_token.same_asset(&config.target_token) {
            reasons.push(format!(
                "source and target token are the same asset ({})",
                config.source_token.address
            ));
        }

        if balance_usd < amount_usd {
            reasons.push(format!(
                "balance {} USD below swap amount {} USD",
                format_usd(balance_usd),
                format_usd(amount_usd)
            ));
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(AttemptError::ValidationFailed(reasons.join("; ")))
        }
    }
}
