//! Launch coordinator
//!
//! Runs the launch as an ordered chain of wallet round trips:
//! 1. Normalize amounts (before anything leaves the process)
//! 2. Connect the wallet
//! 3. Approve the launchpad to pull the paired token
//! 4. Submit `launchToken` and wait for confirmation
//! 5. Pull the deployed address out of `TokenLaunched`
//! 6. Persist it
//!
//! Every failure is terminal for the call. Nothing is retried or rolled back.

use crate::abi::{ILaunchpad, IERC20};
use crate::amount::NormalizedAmounts;
use crate::config::{ApprovalPolicy, LaunchConfig};
use crate::error::{LaunchError, StoreError};
use crate::events::extract_launched_token;
use crate::state::{validate_transition, LaunchSnapshot, LaunchState};
use crate::store::{KeyValueStore, MemecoinAddressStore};
use crate::types::{ApprovalOutcome, LaunchId, LaunchOutcome, LaunchReceipt, LaunchRequest};
use crate::wallet::{read_call, submit_and_confirm, Signer, TransactionReceipt, WalletProvider};
use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Drives one launch at a time against an injected wallet
#[derive(Debug)]
pub struct LaunchCoordinator {
    /// Configuration
    config: LaunchConfig,
    /// Injected wallet; `None` when no provider is present
    wallet: Option<Arc<dyn WalletProvider>>,
    /// Deployed-address slot
    store: MemecoinAddressStore,
    /// Set while a launch is in flight
    busy: AtomicBool,
    /// Observable status
    status: watch::Sender<LaunchSnapshot>,
}

/// Clears the busy flag on every exit path
///
/// A launch future dropped mid-flight leaves the snapshot loading; the guard
/// settles it as failed.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    status: &'a watch::Sender<LaunchSnapshot>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, status: &'a watch::Sender<LaunchSnapshot>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, status })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.status.send_if_modified(|snapshot| {
            if !snapshot.loading {
                return false;
            }
            tracing::warn!(state = ?snapshot.state, "launch dropped before settling");
            if snapshot.state.is_in_flight() {
                snapshot.state = LaunchState::Failed;
            }
            snapshot.loading = false;
            snapshot.error = Some("launch cancelled".to_string());
            snapshot.updated_at = Utc::now();
            true
        });
        self.flag.store(false, Ordering::Release);
    }
}

impl LaunchCoordinator {
    /// Create a coordinator with no wallet attached
    #[must_use]
    pub fn new(config: LaunchConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let (status, _) = watch::channel(LaunchSnapshot::default());
        Self {
            config,
            wallet: None,
            store: MemecoinAddressStore::new(store),
            busy: AtomicBool::new(false),
            status,
        }
    }

    /// Attach the injected wallet provider
    #[inline]
    #[must_use]
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Launch a token and fold every failure into the outcome
    pub async fn launch(&self, request: LaunchRequest) -> LaunchOutcome {
        LaunchOutcome::from(self.try_launch(request).await)
    }

    /// Launch a token, returning the typed error on failure
    ///
    /// # Errors
    /// - `LaunchError::AlreadyInProgress` if another launch holds this coordinator
    /// - `LaunchError::ParseError` for malformed amounts or addresses
    /// - `LaunchError::WalletUnavailable` / `WalletRejected` at connection
    /// - `LaunchError::ApprovalFailed` / `LaunchFailed` for the two transactions
    pub async fn try_launch(&self, request: LaunchRequest) -> Result<LaunchReceipt, LaunchError> {
        let Some(_guard) = BusyGuard::acquire(&self.busy, &self.status) else {
            tracing::warn!(
                symbol = %request.symbol,
                "launch rejected: another launch is in flight"
            );
            return Err(LaunchError::AlreadyInProgress);
        };

        let launch_id = LaunchId::new();
        self.status.send_modify(|snapshot| {
            snapshot.launch_id = Some(launch_id);
            snapshot.loading = true;
            snapshot.error = None;
            snapshot.result = None;
        });

        let span = tracing::info_span!("launch", id = %launch_id, symbol = %request.symbol);
        let result = self.run(launch_id, &request).instrument(span).await;

        let outcome = LaunchOutcome::from(result.clone());
        let state = if result.is_ok() {
            LaunchState::Confirmed
        } else {
            LaunchState::Failed
        };
        self.advance(state);
        self.status.send_modify(|snapshot| {
            snapshot.loading = false;
            snapshot.error.clone_from(&outcome.error);
            snapshot.result = Some(outcome);
        });

        result
    }

    async fn run(
        &self,
        launch_id: LaunchId,
        request: &LaunchRequest,
    ) -> Result<LaunchReceipt, LaunchError> {
        self.advance(LaunchState::Normalizing);
        let amounts = NormalizedAmounts::from_request(request).inspect_err(|e| {
            tracing::error!(error = %e, "launch request rejected");
        })?;

        self.advance(LaunchState::Connecting);
        let signer = self.connect().await.inspect_err(|e| {
            tracing::error!(error = %e, "wallet connection failed");
        })?;
        let account = signer.address();
        tracing::info!(%account, "wallet connected");

        self.advance(LaunchState::Approving);
        let approval = self
            .approve(signer.as_ref(), &amounts)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    paired_token = %amounts.paired_token,
                    "approval failed"
                );
            })?;

        self.advance(LaunchState::Launching);
        let receipt = self
            .submit_launch(signer.as_ref(), request, &amounts)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "launch transaction failed");
            })?;
        tracing::info!(
            tx_hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            "launch confirmed"
        );

        let token_address = extract_launched_token(&receipt.logs, self.config.launchpad_address);
        match token_address {
            Some(token) => {
                tracing::info!(%token, "memecoin deployed");
                if let Err(e) = self.store.save(token) {
                    tracing::error!(error = %e, %token, "failed to persist memecoin address");
                }
            }
            None => tracing::warn!(
                tx_hash = %receipt.transaction_hash,
                "launch confirmed without a TokenLaunched event"
            ),
        }

        Ok(LaunchReceipt {
            launch_id,
            tx_hash: receipt.transaction_hash,
            token_address,
            approval,
            account,
        })
    }

    async fn connect(&self) -> Result<Arc<dyn Signer>, LaunchError> {
        let wallet = self.wallet.as_ref().ok_or(LaunchError::WalletUnavailable)?;

        let accounts = wallet
            .request_accounts()
            .await
            .map_err(LaunchError::from_connect)?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| LaunchError::WalletRejected("wallet returned no accounts".to_string()))?;

        wallet.signer(account).await.map_err(LaunchError::from_connect)
    }

    async fn approve(
        &self,
        signer: &dyn Signer,
        amounts: &NormalizedAmounts,
    ) -> Result<ApprovalOutcome, LaunchError> {
        let launchpad = self.config.launchpad_address;
        let amount = amounts.liquidity_paired;

        if self.config.approval_policy == ApprovalPolicy::WhenInsufficient {
            let query = IERC20::allowanceCall {
                owner: signer.address(),
                spender: launchpad,
            };
            let allowance = read_call(signer, amounts.paired_token, &query)
                .await
                .map_err(|e| LaunchError::ApprovalFailed(format!("reading allowance: {e}")))?
                ._0;
            if allowance >= amount {
                tracing::info!(
                    %allowance,
                    %amount,
                    "existing allowance covers liquidity, skipping approval"
                );
                return Ok(ApprovalOutcome::Skipped { allowance });
            }
            tracing::debug!(%allowance, %amount, "allowance insufficient");
        }

        let call = IERC20::approveCall {
            spender: launchpad,
            amount,
        };
        let receipt = submit_and_confirm(signer, amounts.paired_token, call.abi_encode())
            .await
            .map_err(|e| LaunchError::ApprovalFailed(e.to_string()))?;
        tracing::info!(tx_hash = %receipt.transaction_hash, %amount, "paired token approved");

        Ok(ApprovalOutcome::Approved {
            tx_hash: receipt.transaction_hash,
        })
    }

    async fn submit_launch(
        &self,
        signer: &dyn Signer,
        request: &LaunchRequest,
        amounts: &NormalizedAmounts,
    ) -> Result<TransactionReceipt, LaunchError> {
        let call = ILaunchpad::launchTokenCall {
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            initialSupply: amounts.initial_supply,
            pairedToken: amounts.paired_token,
            liquidityMemecoinAmount: amounts.liquidity_memecoin,
            liquidityPairedTokenAmount: amounts.liquidity_paired,
        };
        submit_and_confirm(signer, self.config.launchpad_address, call.abi_encode())
            .await
            .map_err(|e| LaunchError::LaunchFailed(e.to_string()))
    }

    fn advance(&self, to: LaunchState) {
        self.status.send_modify(|snapshot| {
            let legal = validate_transition(snapshot.state, to);
            if !legal {
                tracing::error!(from = ?snapshot.state, ?to, "illegal launch state transition");
            }
            debug_assert!(
                legal,
                "illegal launch state transition {:?} -> {to:?}",
                snapshot.state
            );
            tracing::debug!(from = ?snapshot.state, ?to, "launch state");
            snapshot.state = to;
            snapshot.updated_at = Utc::now();
        });
    }

    /// Subscribe to status changes
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LaunchSnapshot> {
        self.status.subscribe()
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> LaunchSnapshot {
        self.status.borrow().clone()
    }

    /// Whether a launch is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Address of the last deployed memecoin
    pub fn memecoin_address(&self) -> Result<Option<Address>, StoreError> {
        self.store.get()
    }

    /// Store a memecoin address by hand
    pub fn save_memecoin_address(&self, address: Address) -> Result<(), StoreError> {
        self.store.save(address)
    }

    /// Deployed-address slot
    #[inline]
    #[must_use]
    pub fn address_store(&self) -> &MemecoinAddressStore {
        &self.store
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn coordinator() -> LaunchCoordinator {
        LaunchCoordinator::new(LaunchConfig::new(), Arc::new(MemoryStore::new()))
    }

    fn request() -> LaunchRequest {
        LaunchRequest::new(
            "Papi",
            "PAPI",
            "1000000",
            "0x039e2fB66102314Ce7b64Ce5Ce3E5183bc94aD38",
            "500000",
            "10",
        )
    }

    #[tokio::test]
    async fn missing_wallet_is_unavailable() {
        let coordinator = coordinator();
        let outcome = coordinator.launch(request()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(crate::LaunchErrorKind::WalletUnavailable));

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.state, LaunchState::Failed);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error, outcome.error);
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn parse_error_stops_before_connecting() {
        let coordinator = coordinator();
        let mut bad = request();
        bad.liquidity_paired_token_amount = "ten".into();

        let err = coordinator.try_launch(bad).await.unwrap_err();
        assert!(matches!(err, LaunchError::ParseError { field: "liquidityPairedTokenAmount", .. }));
        assert_eq!(coordinator.snapshot().state, LaunchState::Failed);
    }

    #[test]
    fn busy_guard_is_exclusive_and_releases() {
        let flag = AtomicBool::new(false);
        let (status, _) = watch::channel(LaunchSnapshot::default());
        let guard = BusyGuard::acquire(&flag, &status).unwrap();
        assert!(BusyGuard::acquire(&flag, &status).is_none());
        drop(guard);
        assert!(BusyGuard::acquire(&flag, &status).is_some());
        assert!(status.borrow().error.is_none());
    }

    #[test]
    fn dropped_guard_settles_a_loading_snapshot() {
        let flag = AtomicBool::new(false);
        let (status, mut updates) = watch::channel(LaunchSnapshot::default());
        let guard = BusyGuard::acquire(&flag, &status).unwrap();
        status.send_modify(|s| {
            s.loading = true;
            s.state = LaunchState::Launching;
        });
        updates.borrow_and_update();

        drop(guard);

        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.state, LaunchState::Failed);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error.as_deref(), Some("launch cancelled"));
        assert!(!flag.load(Ordering::Acquire));
    }
}
