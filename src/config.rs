//! Configuration loading.
//!
//! Two alternative sources: a TOML file (`--config path`), or the process
//! environment (with `.env` honored) using the variable names the dashboard
//! deployment already sets. Thresholds default to the production tuning.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::str::FromStr;
use std::{env, fs, path::Path};

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const DEFAULT_QUOTE_URL: &str = "https://api.jup.ag/swap/v1/quote";
const DEFAULT_SWAP_URL: &str = "https://api.jup.ag/swap/v1/swap";

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaCfg {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Base58-encoded secret key for the trading wallet.
    pub private_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JupiterCfg {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_quote_url")]
    pub quote_url: String,
    #[serde(default = "default_swap_url")]
    pub swap_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArbitrageCfg {
    /// Fixed input per scan, in lamports.
    #[serde(default = "default_trade_size_lamports")]
    pub trade_size_lamports: u64,
    /// Minimum profit in basis points (25 = 0.25%).
    #[serde(default = "default_min_profit_bps")]
    pub min_profit_bps: i64,
    /// Extra bps on top of the minimum, compensating for quote staleness
    /// between scan and execution.
    #[serde(default = "default_safety_buffer_bps")]
    pub safety_buffer_bps: i64,
    /// Reject a path when any leg's |price impact| exceeds this percentage.
    #[serde(default = "default_max_price_impact_pct")]
    pub max_price_impact_pct: f64,
    /// Slippage tolerance passed to the quote API.
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
    /// Flat fee estimate per on-chain execution, charged x3 per triangle.
    #[serde(default = "default_estimated_fee_per_leg")]
    pub estimated_fee_per_leg: u64,
    /// Re-quote right before execution (false = faster, more slippage risk).
    #[serde(default = "default_re_quote")]
    pub re_quote_before_execute: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pause between legs to avoid back-to-back submission pressure.
    #[serde(default = "default_inter_leg_delay_ms")]
    pub inter_leg_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerCfg {
    pub url: Option<String>,
    pub service_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramCfg {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub solana: SolanaCfg,
    #[serde(default)]
    pub jupiter: JupiterCfg,
    #[serde(default)]
    pub arbitrage: ArbitrageCfg,
    #[serde(default)]
    pub ledger: LedgerCfg,
    #[serde(default)]
    pub telegram: TelegramCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse config file")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            solana: SolanaCfg {
                rpc_url: env::var("SOLANA_RPC_URL").unwrap_or_else(|_| default_rpc_url()),
                private_key: env::var("SOLANA_PRIVATE_KEY").unwrap_or_default(),
            },
            jupiter: JupiterCfg {
                api_key: env::var("JUPITER_API_KEY").ok().filter(|k| !k.is_empty()),
                quote_url: env::var("JUPITER_QUOTE_URL").unwrap_or_else(|_| default_quote_url()),
                swap_url: env::var("JUPITER_SWAP_URL").unwrap_or_else(|_| default_swap_url()),
            },
            arbitrage: ArbitrageCfg {
                trade_size_lamports: env_parsed(
                    "TRADE_SIZE_LAMPORTS",
                    default_trade_size_lamports(),
                )?,
                min_profit_bps: env_parsed("MIN_PROFIT_BPS", default_min_profit_bps())?,
                safety_buffer_bps: env_parsed("SAFETY_BUFFER_BPS", default_safety_buffer_bps())?,
                max_price_impact_pct: env_parsed(
                    "MAX_PRICE_IMPACT_PCT",
                    default_max_price_impact_pct(),
                )?,
                slippage_bps: env_parsed("ARB_SLIPPAGE_BPS", default_slippage_bps())?,
                estimated_fee_per_leg: env_parsed(
                    "ESTIMATED_FEE_PER_LEG",
                    default_estimated_fee_per_leg(),
                )?,
                re_quote_before_execute: env::var("REQUOTE_BEFORE_EXECUTE")
                    .map(|v| v != "false")
                    .unwrap_or(true),
                poll_interval_ms: env_parsed("POLL_INTERVAL_MS", default_poll_interval_ms())?,
                inter_leg_delay_ms: env_parsed(
                    "INTER_LEG_DELAY_MS",
                    default_inter_leg_delay_ms(),
                )?,
            },
            ledger: LedgerCfg {
                url: env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty()),
                service_key: env::var("SUPABASE_SERVICE_KEY").ok().filter(|v| !v.is_empty()),
            },
            telegram: TelegramCfg {
                bot_token: env::var("TELEGRAM_BOT_TOKEN").ok().filter(|v| !v.is_empty()),
                chat_id: env::var("TELEGRAM_CHAT_ID").ok().filter(|v| !v.is_empty()),
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.solana.private_key.is_empty() {
            bail!("SOLANA_PRIVATE_KEY is required. Add it to your .env file.");
        }
        if self.jupiter.api_key.is_none() {
            bail!("JUPITER_API_KEY is required for swap quotes. Get a free key at https://station.jup.ag/");
        }
        Ok(())
    }
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.parse().map_err(|e| anyhow!("invalid {name}: {e}")),
        Err(_) => Ok(default),
    }
}

/// RPC endpoints often embed provider api keys in the URL; redact the key
/// before the URL reaches any log line.
pub fn redacted_rpc_url(url: &str) -> String {
    for marker in ["api-key=", "api_key="] {
        if let Some(pos) = url.find(marker) {
            let start = pos + marker.len();
            let end = url[start..].find('&').map_or(url.len(), |i| start + i);
            return format!("{}***{}", &url[..start], &url[end..]);
        }
    }
    url.to_string()
}

impl Default for JupiterCfg {
    fn default() -> Self {
        Self {
            api_key: None,
            quote_url: default_quote_url(),
            swap_url: default_swap_url(),
        }
    }
}

impl Default for ArbitrageCfg {
    fn default() -> Self {
        Self {
            trade_size_lamports: default_trade_size_lamports(),
            min_profit_bps: default_min_profit_bps(),
            safety_buffer_bps: default_safety_buffer_bps(),
            max_price_impact_pct: default_max_price_impact_pct(),
            slippage_bps: default_slippage_bps(),
            estimated_fee_per_leg: default_estimated_fee_per_leg(),
            re_quote_before_execute: default_re_quote(),
            poll_interval_ms: default_poll_interval_ms(),
            inter_leg_delay_ms: default_inter_leg_delay_ms(),
        }
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_quote_url() -> String {
    DEFAULT_QUOTE_URL.to_string()
}

fn default_swap_url() -> String {
    DEFAULT_SWAP_URL.to_string()
}

fn default_trade_size_lamports() -> u64 {
    10_000_000 // 0.01 SOL
}

fn default_min_profit_bps() -> i64 {
    25
}

fn default_safety_buffer_bps() -> i64 {
    8
}

fn default_max_price_impact_pct() -> f64 {
    0.8
}

fn default_slippage_bps() -> u16 {
    60
}

fn default_estimated_fee_per_leg() -> u64 {
    50_000 // ~0.00005 SOL
}

fn default_re_quote() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

fn default_inter_leg_delay_ms() -> u64 {
    2_000
}
