//! Core types for the launch flow
//!
//! Defines:
//! - The launch request as submitted by the form layer
//! - The consolidated outcome returned to callers
//! - Launch identifiers for tracing

use crate::config::DEFAULT_PAIRED_TOKEN;
use crate::error::{LaunchError, LaunchErrorKind};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique launch identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LaunchId(pub Ulid);

impl LaunchId {
    /// Generate new launch ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for LaunchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LaunchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supply pre-filled by [`LaunchRequest::suggested`]
pub const SUGGESTED_SUPPLY: u64 = 1_000_000;

/// Paired-token liquidity pre-filled by [`LaunchRequest::suggested`]
pub const SUGGESTED_PAIRED_LIQUIDITY: &str = "10";

/// Token launch request
///
/// Amounts are decimal strings; they are normalized to 18-decimal fixed
/// point by the coordinator. Field presence is the form layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    /// Token name
    pub name: String,
    /// Token ticker
    pub symbol: String,
    /// Total memecoin supply
    pub initial_supply: String,
    /// Address of the token paired in the pool
    pub paired_token: String,
    /// Memecoin seeded into the pool
    pub liquidity_memecoin_amount: String,
    /// Paired token seeded into the pool
    pub liquidity_paired_token_amount: String,
}

impl LaunchRequest {
    /// Create new request
    #[inline]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_supply: impl Into<String>,
        paired_token: impl Into<String>,
        liquidity_memecoin_amount: impl Into<String>,
        liquidity_paired_token_amount: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            initial_supply: initial_supply.into(),
            paired_token: paired_token.into(),
            liquidity_memecoin_amount: liquidity_memecoin_amount.into(),
            liquidity_paired_token_amount: liquidity_paired_token_amount.into(),
        }
    }

    /// Form defaults derived from a name alone
    ///
    /// The symbol is the upper-cased initial of each word. Half of
    /// [`SUGGESTED_SUPPLY`] seeds the pool against
    /// [`SUGGESTED_PAIRED_LIQUIDITY`] of [`DEFAULT_PAIRED_TOKEN`].
    #[must_use]
    pub fn suggested(name: impl Into<String>) -> Self {
        let name = name.into();
        let symbol: String = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        Self::new(
            name,
            symbol,
            SUGGESTED_SUPPLY.to_string(),
            DEFAULT_PAIRED_TOKEN.to_string(),
            (SUGGESTED_SUPPLY / 2).to_string(),
            SUGGESTED_PAIRED_LIQUIDITY,
        )
    }

    /// First of `name` / `symbol` that is empty after trimming
    #[must_use]
    pub fn blank_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.symbol.trim().is_empty() {
            Some("symbol")
        } else {
            None
        }
    }
}

/// What happened at the approval step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ApprovalOutcome {
    /// An approval transaction was confirmed
    Approved {
        /// Approval transaction hash
        tx_hash: B256,
    },
    /// Existing allowance already covered the amount
    Skipped {
        /// Allowance read before launching
        allowance: U256,
    },
}

/// Successful launch details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReceipt {
    /// Launch identifier
    pub launch_id: LaunchId,
    /// Launch transaction hash
    pub tx_hash: B256,
    /// Deployed token, if the event was found
    pub token_address: Option<Address>,
    /// Approval step result
    pub approval: ApprovalOutcome,
    /// Wallet account that signed
    pub account: Address,
}

/// Consolidated launch result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOutcome {
    /// Whether the launch transaction confirmed
    pub success: bool,
    /// Deployed token from the `TokenLaunched` event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<Address>,
    /// Launch transaction hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    /// Human-readable failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<LaunchErrorKind>,
}

impl LaunchOutcome {
    /// Outcome for a confirmed launch
    #[must_use]
    pub fn confirmed(receipt: &LaunchReceipt) -> Self {
        Self {
            success: true,
            token_address: receipt.token_address,
            tx_hash: Some(receipt.tx_hash),
            error: None,
            error_kind: None,
        }
    }

    /// Outcome for a failed launch
    #[must_use]
    pub fn failed(error: &LaunchError) -> Self {
        Self {
            success: false,
            token_address: None,
            tx_hash: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

impl From<Result<LaunchReceipt, LaunchError>> for LaunchOutcome {
    fn from(result: Result<LaunchReceipt, LaunchError>) -> Self {
        match result {
            Ok(receipt) => Self::confirmed(&receipt),
            Err(error) => Self::failed(&error),
        }
    }
}
