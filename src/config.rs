use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::{fs, path::Path};
use tracing::warn;

use crate::application::{SchedulerSettings, DEFAULT_TICK_MS};
use crate::domain::execution::{SwapLimits, DEFAULT_PERCENTAGE};
use crate::domain::frequency::{
    describe_interval, FrequencyControl, FrequencyTier, DEFAULT_FREQUENCY_MS, MIDPOINT_CONTROL_VALUE,
};
use crate::shared::errors::AppError;
use crate::shared::types::TokenRef;

#[derive(Debug, Clone, Deserialize)]
pub struct WalletCfg {
    pub address: Option<String>,
    pub balance_usd: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl From<TokenInfo> for TokenRef {
    fn from(info: TokenInfo) -> Self {
        TokenRef::new(info.address, info.symbol, info.decimals)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenCfg {
    pub source: TokenInfo,
    pub target: TokenInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleCfg {
    pub tier: String,
    #[serde(default = "default_control_value")]
    pub control_value: f64,
    #[serde(default = "default_percentage")]
    pub percentage: Decimal,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsCfg {
    pub min_swap_usd: Decimal,
    pub max_swap_usd: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteCfg {
    pub endpoint: String,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    #[serde(default = "default_quote_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationCfg {
    #[serde(default)]
    pub failure_rate: f64,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    pub prices: HashMap<String, Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub wallet: WalletCfg,
    pub tokens: TokenCfg,
    pub schedule: ScheduleCfg,
    pub limits: Option<LimitsCfg>,
    pub quote: Option<QuoteCfg>,
    pub simulation: SimulationCfg,
}

fn default_control_value() -> f64 {
    MIDPOINT_CONTROL_VALUE
}

fn default_percentage() -> Decimal {
    DEFAULT_PERCENTAGE
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn default_slippage_bps() -> u32 {
    50
}

fn default_quote_timeout_ms() -> u64 {
    5_000
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config {}", path.as_ref().display()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.schedule.percentage <= Decimal::ZERO || self.schedule.percentage > Decimal::ONE_HUNDRED {
            return Err(AppError::ConfigError(format!(
                "schedule.percentage must be in (0, 100], got {}",
                self.schedule.percentage
            )));
        }
        if !(0.0..=1.0).contains(&self.simulation.failure_rate) {
            return Err(AppError::ConfigError(format!(
                "simulation.failure_rate must be in [0, 1], got {}",
                self.simulation.failure_rate
            )));
        }
        if let Some(limits) = &self.limits {
            if limits.min_swap_usd <= Decimal::ZERO {
                return Err(AppError::ConfigError(format!(
                    "limits.min_swap_usd must be positive, got {}",
                    limits.min_swap_usd
                )));
            }
            if limits.min_swap_usd > limits.max_swap_usd {
                return Err(AppError::ConfigError(format!(
                    "limits.min_swap_usd {} exceeds limits.max_swap_usd {}",
                    limits.min_swap_usd, limits.max_swap_usd
                )));
            }
        }
        for token in [&self.tokens.source, &self.tokens.target] {
            if token.address.trim().is_empty() {
                return Err(AppError::InvalidToken(format!("{} has an empty address", token.symbol)));
            }
        }
        Ok(())
    }

    /// Resolve the configured tier; unknown names fall back to one hour
    pub fn frequency_control(&self) -> FrequencyControl {
        match self.schedule.tier.parse::<FrequencyTier>() {
            Ok(tier) => FrequencyControl::new(tier, self.schedule.control_value),
            Err(err) => {
                warn!("{}; using {}", err, describe_interval(DEFAULT_FREQUENCY_MS));
                // Fastest hours setting is exactly the one-hour fallback
                FrequencyControl::new(FrequencyTier::Hours, 100.0)
            }
        }
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        let control = self.frequency_control();
        let mut settings = SchedulerSettings::new(
            self.tokens.source.clone().into(),
            self.tokens.target.clone().into(),
            control,
        );
        settings.percentage = self.schedule.percentage;
        settings.tick_ms = self.schedule.tick_ms;
        if let Some(limits) = &self.limits {
            settings.limits = SwapLimits {
                min_swap_usd: limits.min_swap_usd,
                max_swap_usd: limits.max_swap_usd,
            };
        }
        settings
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet: WalletCfg {
                address: Some("PaperWa11et1111111111111111111111111111111".to_string()),
                balance_usd: "1000.00".to_string(),
            },
            tokens: TokenCfg {
                source: TokenInfo {
                    address: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
                    symbol: "USDC".to_string(),
                    decimals: 6,
                },
                target: TokenInfo {
                    address: "So11111111111111111111111111111111111111112".to_string(),
                    symbol: "SOL".to_string(),
                    decimals: 9,
                },
            },
            schedule: ScheduleCfg {
                tier: FrequencyTier::Seconds.to_string(),
                control_value: 90.0,
                percentage: DEFAULT_PERCENTAGE,
                tick_ms: DEFAULT_TICK_MS,
            },
            limits: None,
            quote: None,
            simulation: SimulationCfg {
                failure_rate: 0.1,
                latency_ms: 250,
                slippage_bps: 50,
                prices: HashMap::from([
                    ("USDC".to_string(), Decimal::ONE),
                    ("USDT".to_string(), Decimal::ONE),
                    ("SOL".to_string(), Decimal::new(160, 0)),
                    ("ETH".to_string(), Decimal::new(3_200, 0)),
                ]),
            },
        }
    }
}
