//! Launch configuration
//!
//! Loaded from TOML, then overridden from the environment:
//! `MEMEGENT_RPC_URL`, `MEMEGENT_LAUNCHPAD`, `MEMEGENT_STORE`,
//! `MEMEGENT_APPROVAL_POLICY`.

use crate::error::ConfigError;
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Launchpad deployment the app talks to
pub const DEFAULT_LAUNCHPAD_ADDRESS: Address = address!("e76a660c63F2090798bF1240A21187514E8e91D4");

/// Token paired with every memecoin launched from the create page
pub const DEFAULT_PAIRED_TOKEN: Address = address!("039e2fB66102314Ce7b64Ce5Ce3E5183bc94aD38");

/// Sonic mainnet RPC
pub const DEFAULT_RPC_URL: &str = "https://rpc.soniclabs.com";

/// How the approval step treats an existing allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalPolicy {
    /// Submit `approve` on every launch
    #[default]
    Always,
    /// Read `allowance` first and approve only when it is short
    WhenInsufficient,
}

impl fmt::Display for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::WhenInsufficient => f.write_str("when-insufficient"),
        }
    }
}

impl FromStr for ApprovalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "when-insufficient" | "when_insufficient" => Ok(Self::WhenInsufficient),
            other => Err(format!("unknown approval policy `{other}`")),
        }
    }
}

/// Launch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Launchpad contract
    pub launchpad_address: Address,
    /// Approval policy
    pub approval_policy: ApprovalPolicy,
    /// Paired token used when a request does not name one
    pub default_paired_token: Address,
    /// JSON-RPC endpoint for the node-backed wallet
    pub rpc_url: String,
    /// Address store location
    pub store_path: PathBuf,
    /// Receipt polling interval in milliseconds
    pub receipt_poll_interval_ms: u64,
    /// Give up waiting for a receipt after this many seconds
    pub receipt_timeout_secs: u64,
}

impl LaunchConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With launchpad address
    #[inline]
    #[must_use]
    pub fn with_launchpad(mut self, launchpad: Address) -> Self {
        self.launchpad_address = launchpad;
        self
    }

    /// With approval policy
    #[inline]
    #[must_use]
    pub fn with_approval_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.approval_policy = policy;
        self
    }

    /// With RPC endpoint
    #[inline]
    #[must_use]
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    /// With address store location
    #[inline]
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Receipt polling interval
    #[inline]
    #[must_use]
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms.max(1))
    }

    /// Receipt wait limit
    #[inline]
    #[must_use]
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    /// Parse TOML
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `MEMEGENT_*` variables from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `MEMEGENT_*` overrides from an arbitrary lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MEMEGENT_RPC_URL") {
            self.rpc_url = url;
        }
        if let Some(value) = lookup("MEMEGENT_LAUNCHPAD") {
            self.launchpad_address =
                Address::from_str(value.trim()).map_err(|_| ConfigError::InvalidOverride {
                    key: "MEMEGENT_LAUNCHPAD",
                    value,
                })?;
        }
        if let Some(path) = lookup("MEMEGENT_STORE") {
            self.store_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("MEMEGENT_APPROVAL_POLICY") {
            self.approval_policy =
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        key: "MEMEGENT_APPROVAL_POLICY",
                        value,
                    })?;
        }
        Ok(self)
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            launchpad_address: DEFAULT_LAUNCHPAD_ADDRESS,
            approval_policy: ApprovalPolicy::Always,
            default_paired_token: DEFAULT_PAIRED_TOKEN,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            store_path: PathBuf::from(".memegent/store.json"),
            receipt_poll_interval_ms: 1_000,
            receipt_timeout_secs: 300,
        }
    }
}
