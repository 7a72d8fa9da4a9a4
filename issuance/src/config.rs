//! Issuance configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use admit_codec::token_id::MAX_TRANSFER_FEE;
use admit_codec::TokenFlags;
use admit_utils::LogFormat;

use crate::IssuanceError;

/// Configuration for an issuing service.
///
/// Can be loaded from a TOML file via [`IssuanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceConfig {
    /// How long to wait for a mint to become final.
    #[serde(default = "default_finality_timeout_ms")]
    pub mint_finality_timeout_ms: u64,

    /// How long to wait for each offer/accept transaction to become final.
    #[serde(default = "default_finality_timeout_ms")]
    pub claim_finality_timeout_ms: u64,

    /// Bound on ledger state queries (ownership, token lists).
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Lifetime of a claim offer.
    #[serde(default = "default_offer_ttl_secs")]
    pub offer_ttl_secs: u64,

    /// Retries of a claim step after a transport failure.
    #[serde(default = "default_max_submit_retries")]
    pub max_submit_retries: u32,

    /// Offers created per claim before giving up on `OfferExpired`.
    #[serde(default = "default_max_offer_attempts")]
    pub max_offer_attempts: u32,

    /// Mint tokens that holders may pass on.
    #[serde(default = "default_true")]
    pub transferable: bool,

    /// Mint tokens the holder may burn.
    #[serde(default)]
    pub burnable: bool,

    /// Transfer fee in hundredths of a basis point (max 50000 = 50%).
    #[serde(default)]
    pub transfer_fee: u16,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_finality_timeout_ms() -> u64 {
    30_000
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

fn default_offer_ttl_secs() -> u64 {
    300
}

fn default_max_submit_retries() -> u32 {
    3
}

fn default_max_offer_attempts() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl IssuanceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, IssuanceError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            IssuanceError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, IssuanceError> {
        toml::from_str(s).map_err(|e| IssuanceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, IssuanceError> {
        toml::to_string_pretty(self).map_err(|e| IssuanceError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), IssuanceError> {
        if self.mint_finality_timeout_ms == 0
            || self.claim_finality_timeout_ms == 0
            || self.query_timeout_ms == 0
        {
            return Err(IssuanceError::Config("timeouts must be non-zero".into()));
        }
        if self.offer_ttl_secs == 0 {
            return Err(IssuanceError::Config("offer_ttl_secs must be non-zero".into()));
        }
        if self.max_offer_attempts == 0 {
            return Err(IssuanceError::Config("max_offer_attempts must be at least 1".into()));
        }
        if self.transfer_fee > MAX_TRANSFER_FEE {
            return Err(IssuanceError::Config(format!(
                "transfer_fee {} exceeds {MAX_TRANSFER_FEE}",
                self.transfer_fee
            )));
        }
        Ok(())
    }

    pub fn mint_finality_timeout(&self) -> Duration {
        Duration::from_millis(self.mint_finality_timeout_ms)
    }

    pub fn claim_finality_timeout(&self) -> Duration {
        Duration::from_millis(self.claim_finality_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Flags stamped on newly minted tokens.
    pub fn token_flags(&self) -> TokenFlags {
        let mut flags = TokenFlags::NONE;
        if self.transferable {
            flags = flags | TokenFlags::TRANSFERABLE;
        }
        if self.burnable {
            flags = flags | TokenFlags::BURNABLE;
        }
        flags
    }
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            mint_finality_timeout_ms: default_finality_timeout_ms(),
            claim_finality_timeout_ms: default_finality_timeout_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            offer_ttl_secs: default_offer_ttl_secs(),
            max_submit_retries: default_max_submit_retries(),
            max_offer_attempts: default_max_offer_attempts(),
            transferable: default_true(),
            burnable: false,
            transfer_fee: 0,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
