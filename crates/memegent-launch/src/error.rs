//! Error types for the launch coordinator
//!
//! Provides error handling for:
//! - Wallet connection and signature failures
//! - Approval and launch transaction failures
//! - Decimal amount normalization
//! - Address persistence
//! - Configuration loading

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Main launch error type
///
/// Every variant is terminal for the launch call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    /// No wallet provider is injected
    #[error("no wallet provider available; install or unlock a wallet")]
    WalletUnavailable,

    /// The wallet declined to connect
    #[error("wallet connection rejected: {0}")]
    WalletRejected(String),

    /// Paired token approval failed
    #[error("failed to approve token transfer: {0}")]
    ApprovalFailed(String),

    /// The launchpad call failed
    #[error("token launch failed: {0}")]
    LaunchFailed(String),

    /// A request field could not be converted before any network call
    #[error("invalid {field}: {reason}")]
    ParseError {
        /// Request field name
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Another launch is still in flight on this coordinator
    #[error("a launch is already in progress")]
    AlreadyInProgress,
}

impl LaunchError {
    /// Classification used in outcomes and snapshots
    #[inline]
    #[must_use]
    pub fn kind(&self) -> LaunchErrorKind {
        match self {
            Self::WalletUnavailable => LaunchErrorKind::WalletUnavailable,
            Self::WalletRejected(_) => LaunchErrorKind::WalletRejected,
            Self::ApprovalFailed(_) => LaunchErrorKind::ApprovalFailed,
            Self::LaunchFailed(_) => LaunchErrorKind::LaunchFailed,
            Self::ParseError { .. } => LaunchErrorKind::ParseError,
            Self::AlreadyInProgress => LaunchErrorKind::AlreadyInProgress,
        }
    }

    /// Whether the failure happened before the wallet was asked for anything
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::ParseError { .. } | Self::AlreadyInProgress)
    }

    /// Map a wallet failure during connection
    pub(crate) fn from_connect(error: WalletError) -> Self {
        match error {
            WalletError::Unavailable => Self::WalletUnavailable,
            other => Self::WalletRejected(other.to_string()),
        }
    }

    /// Map an amount failure to the request field it came from
    pub(crate) fn parse(field: &'static str, error: &AmountError) -> Self {
        Self::ParseError {
            field,
            reason: error.to_string(),
        }
    }
}

/// Serializable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchErrorKind {
    /// No provider injected
    WalletUnavailable,
    /// Connection declined
    WalletRejected,
    /// Approval failed
    ApprovalFailed,
    /// Launch failed
    LaunchFailed,
    /// Malformed input
    ParseError,
    /// Re-entrant call rejected
    AlreadyInProgress,
}

/// Wallet provider and signer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// No provider behind the port
    #[error("wallet provider not available")]
    Unavailable,

    /// User or provider declined the request
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Transaction was mined but reverted
    #[error("transaction {tx_hash} reverted")]
    Reverted {
        /// Reverted transaction hash
        tx_hash: B256,
    },

    /// Read-only call failed or returned malformed data
    #[error("call failed: {0}")]
    CallFailed(String),

    /// Gave up waiting on the provider or chain
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Fixed-point amount conversion errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Empty or whitespace-only value
    #[error("amount is empty")]
    Empty,

    /// Not a plain non-negative decimal number
    #[error("`{0}` is not a decimal number")]
    NotDecimal(String),

    /// More fractional digits than the fixed-point scale holds
    #[error("`{value}` has more than {max} fractional digits")]
    TooPrecise {
        /// Offending value
        value: String,
        /// Maximum fractional digits
        max: u8,
    },

    /// Value does not fit in 256 bits once scaled
    #[error("`{0}` overflows a 256-bit amount")]
    Overflow(String),

    /// Zero where a positive amount is required
    #[error("amount must be greater than zero")]
    Zero,
}

/// Key-value store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not valid JSON
    #[error("store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Stored value is not an address
    #[error("stored value `{value}` under `{key}` is not an address")]
    InvalidAddress {
        /// Storage key
        key: String,
        /// Raw stored value
        value: String,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Config path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An override value is malformed
    #[error("invalid value for {key}: {value}")]
    InvalidOverride {
        /// Environment variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Token inspection errors
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// Nothing has been deployed yet
    #[error("no memecoin address stored; launch a token first")]
    NoStoredAddress,

    /// Address store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A token read failed
    #[error("reading `{method}` failed: {source}")]
    Call {
        /// ERC-20 method name
        method: &'static str,
        /// Underlying wallet error
        source: WalletError,
    },

    /// Amount could not be rendered with the token's decimals
    #[error("cannot format amount with {decimals} decimals")]
    Format {
        /// Token decimals
        decimals: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_error_mentions_approval() {
        let err = LaunchError::ApprovalFailed("execution reverted".to_string());
        assert!(err.to_string().contains("approve"));
        assert_eq!(err.kind(), LaunchErrorKind::ApprovalFailed);
    }

    #[test]
    fn connect_errors_split_unavailable_from_rejected() {
        assert_eq!(
            LaunchError::from_connect(WalletError::Unavailable),
            LaunchError::WalletUnavailable
        );
        let rejected = LaunchError::from_connect(WalletError::Rejected("user denied".into()));
        assert!(
            matches!(rejected, LaunchError::WalletRejected(ref m) if m.contains("user denied"))
        );
    }

    #[test]
    fn parse_error_names_field() {
        let err = LaunchError::parse("initialSupply", &AmountError::Zero);
        assert_eq!(err.to_string(), "invalid initialSupply: amount must be greater than zero");
        assert!(err.is_local());
        assert!(!LaunchError::LaunchFailed("x".into()).is_local());
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&LaunchErrorKind::AlreadyInProgress).unwrap();
        assert_eq!(json, "\"already_in_progress\"");
    }
}
