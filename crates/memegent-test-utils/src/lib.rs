//! Testing utilities for the memegent workspace
//!
//! A scripted chain that plays both wallet and contracts, with call
//! counting, plus request and log fixtures.

#![allow(missing_docs)]

use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use memegent_launch::abi::{ILaunchpad, IERC20};
use memegent_launch::{
    ApprovalPolicy, KeyValueStore, LaunchConfig, LaunchCoordinator, LaunchRequest, LogEntry,
    MemoryStore, Signer, StoreError, TransactionReceipt, WalletError, WalletProvider,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const LAUNCHPAD: Address = address!("e76a660c63F2090798bF1240A21187514E8e91D4");
pub const PAIRED_TOKEN: Address = address!("039e2fB66102314Ce7b64Ce5Ce3E5183bc94aD38");
pub const DEPLOYED_TOKEN: Address = address!("00000000000000000000000000000000000bEEF1");
pub const ACCOUNT: Address = address!("a11ce00000000000000000000000000000000001");

/// The launch form example
pub fn papi_request() -> LaunchRequest {
    LaunchRequest::new(
        "Papi",
        "PAPI",
        "1000000",
        PAIRED_TOKEN.to_string(),
        "500000",
        "10",
    )
}

/// `10^18`
pub fn one_token() -> U256 {
    U256::from(10u64).pow(U256::from(18u64))
}

/// `TokenLaunched` as emitted by `emitter`
pub fn token_launched_log(emitter: Address, token: Address) -> LogEntry {
    let event = ILaunchpad::TokenLaunched {
        tokenAddress: token,
        creator: ACCOUNT,
        name: "Papi".into(),
        symbol: "PAPI".into(),
        initialSupply: U256::from(1_000_000u64) * one_token(),
    };
    LogEntry::new(emitter, &event.encode_log_data())
}

/// ERC-20 `Transfer` as emitted by `emitter`
pub fn transfer_log(emitter: Address, to: Address, amount: U256) -> LogEntry {
    let event = IERC20::Transfer {
        from: Address::ZERO,
        to,
        amount,
    };
    LogEntry::new(emitter, &event.encode_log_data())
}

/// How a scripted transaction ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxBehavior {
    /// Mined with status 1
    #[default]
    Confirm,
    /// Mined with status 0
    Revert,
    /// Declined at the signature prompt
    Reject,
    /// Never mined
    Timeout,
}

/// How the wallet answers `request_accounts`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectBehavior {
    Accounts(Vec<Address>),
    Reject,
    Unavailable,
}

/// Decoded submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentTx {
    Approve(IERC20::approveCall),
    Launch(ILaunchpad::launchTokenCall),
    Other { to: Address, data: Bytes },
}

/// Token metadata served to read calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFixture {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub balance: U256,
}

impl Default for TokenFixture {
    fn default() -> Self {
        Self {
            name: "Papi".into(),
            symbol: "PAPI".into(),
            decimals: 18,
            total_supply: U256::from(1_000_000u64) * one_token(),
            balance: U256::from(500_000u64) * one_token(),
        }
    }
}

/// Holds approvals until released
#[derive(Debug, Clone, Default)]
pub struct ApprovalGate {
    /// Signalled when an approval reaches the wallet
    pub entered: Arc<Notify>,
    /// Notify to let the approval through
    pub release: Arc<Notify>,
}

#[derive(Debug)]
struct Script {
    approve: TxBehavior,
    launch: TxBehavior,
    launch_logs: Vec<LogEntry>,
    allowance: U256,
    token: TokenFixture,
    gate: Option<ApprovalGate>,
}

/// Scripted chain acting as wallet signer, paired token, launchpad and memecoin
#[derive(Debug)]
pub struct StubChain {
    account: Address,
    launchpad: Address,
    script: Mutex<Script>,
    sent: Mutex<Vec<SentTx>>,
    receipts: Mutex<HashMap<B256, Option<TransactionReceipt>>>,
    nonce: AtomicUsize,
    allowance_reads: AtomicUsize,
    reads: AtomicUsize,
}

impl StubChain {
    /// Chain that confirms everything and emits `TokenLaunched(DEPLOYED_TOKEN)`
    pub fn new() -> Self {
        Self {
            account: ACCOUNT,
            launchpad: LAUNCHPAD,
            script: Mutex::new(Script {
                approve: TxBehavior::Confirm,
                launch: TxBehavior::Confirm,
                launch_logs: vec![
                    transfer_log(DEPLOYED_TOKEN, LAUNCHPAD, U256::from(1u64)),
                    token_launched_log(LAUNCHPAD, DEPLOYED_TOKEN),
                ],
                allowance: U256::ZERO,
                token: TokenFixture::default(),
                gate: None,
            }),
            sent: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            nonce: AtomicUsize::new(0),
            allowance_reads: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn with_approve(self, behavior: TxBehavior) -> Self {
        self.script.lock().approve = behavior;
        self
    }

    pub fn with_launch(self, behavior: TxBehavior) -> Self {
        self.script.lock().launch = behavior;
        self
    }

    pub fn with_launch_logs(self, logs: Vec<LogEntry>) -> Self {
        self.script.lock().launch_logs = logs;
        self
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        self.script.lock().allowance = allowance;
        self
    }

    pub fn with_token(self, token: TokenFixture) -> Self {
        self.script.lock().token = token;
        self
    }

    /// Make the next approvals wait on the returned gate
    pub fn hold_approvals(&self) -> ApprovalGate {
        let gate = ApprovalGate::default();
        self.script.lock().gate = Some(gate.clone());
        gate
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.sent.lock().clone()
    }

    pub fn approve_calls(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|tx| matches!(tx, SentTx::Approve(_)))
            .count()
    }

    pub fn launch_calls(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|tx| matches!(tx, SentTx::Launch(_)))
            .count()
    }

    pub fn last_launch(&self) -> Option<ILaunchpad::launchTokenCall> {
        self.sent.lock().iter().rev().find_map(|tx| match tx {
            SentTx::Launch(call) => Some(call.clone()),
            _ => None,
        })
    }

    pub fn last_approve(&self) -> Option<IERC20::approveCall> {
        self.sent.lock().iter().rev().find_map(|tx| match tx {
            SentTx::Approve(call) => Some(call.clone()),
            _ => None,
        })
    }

    pub fn allowance_reads(&self) -> usize {
        self.allowance_reads.load(Ordering::SeqCst)
    }

    /// Read calls of any kind
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn next_hash(&self) -> B256 {
        let n = self.nonce.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        B256::from(bytes)
    }

    fn classify(to: Address, data: &Bytes) -> SentTx {
        if data.starts_with(&IERC20::approveCall::SELECTOR) {
            if let Ok(call) = IERC20::approveCall::abi_decode(data, true) {
                return SentTx::Approve(call);
            }
        }
        if data.starts_with(&ILaunchpad::launchTokenCall::SELECTOR) {
            if let Ok(call) = ILaunchpad::launchTokenCall::abi_decode(data, true) {
                return SentTx::Launch(call);
            }
        }
        SentTx::Other {
            to,
            data: data.clone(),
        }
    }
}

impl Default for StubChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Signer for StubChain {
    fn address(&self) -> Address {
        self.account
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock();
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| WalletError::CallFailed("missing selector".into()))?;

        let encoded = if selector == IERC20::allowanceCall::SELECTOR {
            self.allowance_reads.fetch_add(1, Ordering::SeqCst);
            (script.allowance,).abi_encode_params()
        } else if selector == IERC20::nameCall::SELECTOR {
            (script.token.name.clone(),).abi_encode_params()
        } else if selector == IERC20::symbolCall::SELECTOR {
            (script.token.symbol.clone(),).abi_encode_params()
        } else if selector == IERC20::decimalsCall::SELECTOR {
            (U256::from(script.token.decimals),).abi_encode_params()
        } else if selector == IERC20::totalSupplyCall::SELECTOR {
            (script.token.total_supply,).abi_encode_params()
        } else if selector == IERC20::balanceOfCall::SELECTOR {
            (script.token.balance,).abi_encode_params()
        } else {
            return Err(WalletError::CallFailed(format!("execution reverted at {to}")));
        };
        Ok(encoded.into())
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, WalletError> {
        let tx = Self::classify(to, &data);
        let (behavior, logs, gate) = {
            let script = self.script.lock();
            match &tx {
                SentTx::Approve(_) => (script.approve, Vec::new(), script.gate.clone()),
                SentTx::Launch(_) => (script.launch, script.launch_logs.clone(), None),
                SentTx::Other { .. } => (TxBehavior::Confirm, Vec::new(), None),
            }
        };

        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.sent.lock().push(tx);
        if behavior == TxBehavior::Reject {
            return Err(WalletError::Rejected("user denied transaction signature".into()));
        }

        let tx_hash = self.next_hash();
        let receipt = match behavior {
            TxBehavior::Timeout => None,
            TxBehavior::Revert => Some(TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: Some(1),
                status: false,
                logs: Vec::new(),
            }),
            _ => Some(TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: Some(1),
                status: true,
                logs,
            }),
        };
        self.receipts.lock().insert(tx_hash, receipt);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, WalletError> {
        match self.receipts.lock().get(&tx_hash) {
            Some(Some(receipt)) => Ok(receipt.clone()),
            Some(None) => Err(WalletError::Timeout(format!("receipt of {tx_hash}"))),
            None => Err(WalletError::Transport(format!("unknown transaction {tx_hash}"))),
        }
    }
}

/// Wallet provider backed by a [`StubChain`]
#[derive(Debug)]
pub struct StubWallet {
    chain: Arc<StubChain>,
    behavior: ConnectBehavior,
    connect_calls: AtomicUsize,
}

impl StubWallet {
    /// Wallet that hands out the chain's account
    pub fn new(chain: Arc<StubChain>) -> Self {
        let account = chain.address();
        Self {
            chain,
            behavior: ConnectBehavior::Accounts(vec![account]),
            connect_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_behavior(mut self, behavior: ConnectBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for StubWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ConnectBehavior::Accounts(accounts) => Ok(accounts.clone()),
            ConnectBehavior::Reject => {
                Err(WalletError::Rejected("user rejected the request".into()))
            }
            ConnectBehavior::Unavailable => Err(WalletError::Unavailable),
        }
    }

    async fn signer(&self, _account: Address) -> Result<Arc<dyn Signer>, WalletError> {
        Ok(self.chain.clone())
    }
}

/// Store whose writes always fail; reads see an empty slot
#[derive(Debug, Default)]
pub struct FailingStore {
    writes: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempted writes and removes
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn refuse(&self) -> StoreError {
        self.writes.fetch_add(1, Ordering::SeqCst);
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "store is read-only",
        ))
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(self.refuse())
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(self.refuse())
    }
}

/// Coordinator wired to a stub wallet and an in-memory store
pub struct Harness {
    pub chain: Arc<StubChain>,
    pub wallet: Arc<StubWallet>,
    pub store: Arc<MemoryStore>,
    pub coordinator: Arc<LaunchCoordinator>,
}

pub fn setup_harness(chain: StubChain, policy: ApprovalPolicy) -> Harness {
    let chain = Arc::new(chain);
    let wallet = Arc::new(StubWallet::new(chain.clone()));
    setup_harness_with_wallet(chain, wallet, policy)
}

pub fn setup_harness_with_wallet(
    chain: Arc<StubChain>,
    wallet: Arc<StubWallet>,
    policy: ApprovalPolicy,
) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let config = LaunchConfig::new()
        .with_launchpad(LAUNCHPAD)
        .with_approval_policy(policy);
    let coordinator = LaunchCoordinator::new(config, store.clone()).with_wallet(wallet.clone());
    Harness {
        chain,
        wallet,
        store,
        coordinator: Arc::new(coordinator),
    }
}
