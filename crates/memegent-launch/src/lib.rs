//! Memegent Launch - token deployment through a launchpad contract
//!
//! The coordinator that:
//! - Connects to an injected wallet provider
//! - Approves spend of the paired token for the launchpad
//! - Submits `launchToken` and waits for confirmation
//! - Extracts the deployed token from the `TokenLaunched` event
//! - Persists the deployed address in a key-value store
//!
//! # Example
//!
//! ```rust,ignore
//! use memegent_launch::{LaunchConfig, LaunchCoordinator, LaunchRequest, MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn example(wallet: Arc<dyn memegent_launch::WalletProvider>) {
//! let coordinator = LaunchCoordinator::new(LaunchConfig::new(), Arc::new(MemoryStore::new()))
//!     .with_wallet(wallet);
//!
//! let request = LaunchRequest::new("Papi", "PAPI", "1000000", "0x039e...", "500000", "10");
//! let outcome = coordinator.launch(request).await;
//!
//! println!("deployed at {:?}", outcome.token_address);
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod abi;
pub mod amount;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod inspect;
pub mod state;
pub mod store;
pub mod types;
pub mod wallet;

// Re-exports for convenience
pub use amount::{format_fixed, to_fixed_point, NormalizedAmounts, FIXED_DECIMALS};
pub use config::{ApprovalPolicy, LaunchConfig, DEFAULT_LAUNCHPAD_ADDRESS, DEFAULT_PAIRED_TOKEN};
pub use coordinator::LaunchCoordinator;
pub use error::{
    AmountError, ConfigError, InspectError, LaunchError, LaunchErrorKind, StoreError, WalletError,
};
pub use events::extract_launched_token;
pub use inspect::{TokenInfo, TokenInspector};
pub use state::{validate_transition, LaunchSnapshot, LaunchState};
pub use store::{
    JsonFileStore, KeyValueStore, MemecoinAddressStore, MemoryStore, MEMECOIN_ADDRESS_KEY,
};
pub use types::{
    ApprovalOutcome, LaunchId, LaunchOutcome, LaunchReceipt, LaunchRequest,
    SUGGESTED_PAIRED_LIQUIDITY, SUGGESTED_SUPPLY,
};
pub use wallet::{LogEntry, Signer, TransactionReceipt, WalletProvider};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a launch
    pub use crate::{
        ApprovalPolicy, LaunchConfig, LaunchCoordinator, LaunchError, LaunchOutcome,
        LaunchRequest, LaunchState, MemecoinAddressStore, Signer, WalletProvider,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
