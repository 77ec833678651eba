//! Wallet provider and signer ports
//!
//! The coordinator never talks to a chain directly. It asks a
//! [`WalletProvider`] for an account, gets a [`Signer`] for it and submits
//! calldata through that signer.

use crate::error::WalletError;
use alloy_primitives::{Address, Bytes, LogData, B256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Injected wallet provider
#[async_trait]
pub trait WalletProvider: Send + Sync + std::fmt::Debug {
    /// Ask the wallet for its externally-owned accounts
    ///
    /// # Errors
    /// - `WalletError::Unavailable` if there is no wallet behind the provider
    /// - `WalletError::Rejected` if the user declines
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Get a signer for one of the returned accounts
    async fn signer(&self, account: Address) -> Result<Arc<dyn Signer>, WalletError>;
}

/// Account able to read contracts and submit transactions
#[async_trait]
pub trait Signer: Send + Sync + std::fmt::Debug {
    /// Signing account
    fn address(&self) -> Address;

    /// Read-only contract call
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError>;

    /// Submit a transaction; resolves once the wallet has accepted it
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, WalletError>;

    /// Wait until the transaction is included and return its receipt
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, WalletError>;
}

/// Confirmed transaction receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash
    pub transaction_hash: B256,
    /// Including block
    pub block_number: Option<u64>,
    /// Execution succeeded
    pub status: bool,
    /// Emitted logs, in order
    pub logs: Vec<LogEntry>,
}

/// Log entry from a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics, signature first
    pub topics: Vec<B256>,
    /// Non-indexed data
    pub data: Bytes,
}

impl LogEntry {
    /// Build from an emitter and encoded log data
    #[must_use]
    pub fn new(address: Address, log: &LogData) -> Self {
        Self {
            address,
            topics: log.topics().to_vec(),
            data: log.data.clone(),
        }
    }
}

/// Submit a transaction and wait for a successful receipt
///
/// # Errors
/// `WalletError::Reverted` when the receipt reports failure, otherwise
/// whatever the signer returned.
pub async fn submit_and_confirm(
    signer: &dyn Signer,
    to: Address,
    data: Vec<u8>,
) -> Result<TransactionReceipt, WalletError> {
    let tx_hash = signer.send_transaction(to, data.into()).await?;
    tracing::debug!(%tx_hash, %to, "transaction submitted");

    let receipt = signer.wait_for_receipt(tx_hash).await?;
    if !receipt.status {
        return Err(WalletError::Reverted { tx_hash });
    }
    Ok(receipt)
}

/// Run a read-only call and decode its return value
///
/// # Errors
/// `WalletError::CallFailed` when the return data does not decode
pub async fn read_call<C>(
    signer: &dyn Signer,
    to: Address,
    call: &C,
) -> Result<C::Return, WalletError>
where
    C: SolCall + Sync,
{
    let output = signer.call(to, call.abi_encode().into()).await?;
    C::abi_decode_returns(&output, true).map_err(|e| {
        WalletError::CallFailed(format!("malformed `{}` return data: {e}", C::SIGNATURE))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::IERC20;
    use alloy_primitives::U256;
    use alloy_sol_types::SolEvent;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct EchoSigner {
        status: bool,
        reply: Bytes,
        sent: Mutex<Vec<(Address, Bytes)>>,
    }

    #[async_trait]
    impl Signer for EchoSigner {
        fn address(&self) -> Address {
            Address::repeat_byte(0x01)
        }

        async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, WalletError> {
            Ok(self.reply.clone())
        }

        async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, WalletError> {
            self.sent.lock().push((to, data));
            Ok(B256::with_last_byte(1))
        }

        async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, WalletError> {
            Ok(TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: Some(1),
                status: self.status,
                logs: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn reverted_receipt_is_an_error() {
        let signer = EchoSigner::default();
        let result = submit_and_confirm(&signer, Address::ZERO, vec![1, 2, 3]).await;
        assert_eq!(
            result,
            Err(WalletError::Reverted {
                tx_hash: B256::with_last_byte(1)
            })
        );
        assert_eq!(signer.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn read_call_decodes_return() {
        let signer = EchoSigner {
            reply: U256::from(42u64).to_be_bytes::<32>().to_vec().into(),
            ..EchoSigner::default()
        };
        let call = IERC20::allowanceCall {
            owner: Address::ZERO,
            spender: Address::ZERO,
        };
        let allowance = read_call(&signer, Address::ZERO, &call).await.unwrap();
        assert_eq!(allowance._0, U256::from(42u64));
    }

    #[tokio::test]
    async fn read_call_rejects_empty_return() {
        let signer = EchoSigner::default();
        let call = IERC20::decimalsCall {};
        let err = read_call(&signer, Address::ZERO, &call).await.unwrap_err();
        assert!(matches!(err, WalletError::CallFailed(ref m) if m.contains("decimals()")));
    }

    #[test]
    fn log_entry_keeps_topics_in_order() {
        let event = IERC20::Transfer {
            from: Address::repeat_byte(0xaa),
            to: Address::repeat_byte(0xbb),
            amount: U256::from(5u64),
        };
        let entry = LogEntry::new(Address::repeat_byte(0xcc), &event.encode_log_data());
        assert_eq!(entry.topics.len(), 3);
        assert_eq!(entry.topics[0], IERC20::Transfer::SIGNATURE_HASH);
    }
}
