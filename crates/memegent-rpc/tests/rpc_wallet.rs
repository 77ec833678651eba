//! RPC wallet against an in-process mock node.

use alloy_primitives::{Address, Bytes, B256};
use memegent_launch::{
    LaunchConfig, LaunchCoordinator, LaunchError, MemoryStore, Signer, WalletError, WalletProvider,
};
use memegent_rpc::RpcWallet;
use memegent_test_utils::{
    papi_request, token_launched_log, ACCOUNT, DEPLOYED_TOKEN, LAUNCHPAD, PAIRED_TOKEN,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accounts {
    Grant,
    LegacyOnly,
    Reject,
}

#[derive(Debug)]
struct MockNode {
    accounts: Accounts,
    mine: bool,
    sent: Mutex<Vec<(Address, Bytes)>>,
    methods: Mutex<Vec<String>>,
}

impl MockNode {
    fn new(accounts: Accounts) -> Self {
        Self {
            accounts,
            mine: true,
            sent: Mutex::new(Vec::new()),
            methods: Mutex::new(Vec::new()),
        }
    }

    fn never_mine(mut self) -> Self {
        self.mine = false;
        self
    }

    fn sent_to(&self) -> Vec<Address> {
        self.sent.lock().iter().map(|(to, _)| *to).collect()
    }

    fn methods(&self) -> Vec<String> {
        self.methods.lock().clone()
    }

    fn handle(&self, request: &Value) -> Value {
        let method = request["method"].as_str().unwrap_or_default().to_string();
        self.methods.lock().push(method.clone());

        let result = match method.as_str() {
            "eth_requestAccounts" => match self.accounts {
                Accounts::Grant => Ok(json!([ACCOUNT])),
                Accounts::LegacyOnly => {
                    Err((-32601, "the method eth_requestAccounts does not exist"))
                }
                Accounts::Reject => Err((4001, "User rejected the request.")),
            },
            "eth_accounts" => Ok(json!([ACCOUNT])),
            "eth_sendTransaction" => {
                let tx = &request["params"][0];
                let to: Address = serde_json::from_value(tx["to"].clone()).unwrap();
                let data: Bytes = serde_json::from_value(tx["data"].clone()).unwrap();
                let mut sent = self.sent.lock();
                sent.push((to, data));
                Ok(json!(B256::with_last_byte(sent.len() as u8)))
            }
            "eth_getTransactionReceipt" if !self.mine => Ok(Value::Null),
            "eth_getTransactionReceipt" => {
                let hash: B256 = serde_json::from_value(request["params"][0].clone()).unwrap();
                let (to, _) = self.sent.lock()[usize::from(hash[31]) - 1].clone();
                let logs = if to == LAUNCHPAD {
                    vec![token_launched_log(LAUNCHPAD, DEPLOYED_TOKEN)]
                } else {
                    Vec::new()
                };
                Ok(json!({
                    "transactionHash": hash,
                    "blockNumber": "0x10",
                    "status": "0x1",
                    "logs": logs,
                }))
            }
            _ => Err((-32601, "method not found")),
        };

        match result {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message },
            }),
        }
    }
}

async fn spawn_node(node: Arc<MockNode>) -> String {
    let route = warp::post()
        .and(warp::body::json())
        .map(move |request: Value| warp::reply::json(&node.handle(&request)));
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{addr}")
}

fn fast_wallet(url: &str) -> RpcWallet {
    RpcWallet::new(url)
        .with_poll_interval(Duration::from_millis(10))
        .with_receipt_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn launches_through_node() {
    let node = Arc::new(MockNode::new(Accounts::Grant));
    let url = spawn_node(Arc::clone(&node)).await;

    let coordinator = LaunchCoordinator::new(LaunchConfig::new(), Arc::new(MemoryStore::new()))
        .with_wallet(Arc::new(fast_wallet(&url)));

    let outcome = coordinator.launch(papi_request()).await;

    assert!(outcome.success, "launch failed: {:?}", outcome.error);
    assert_eq!(outcome.token_address, Some(DEPLOYED_TOKEN));
    assert_eq!(node.sent_to(), vec![PAIRED_TOKEN, LAUNCHPAD]);
    assert_eq!(coordinator.memecoin_address().unwrap(), Some(DEPLOYED_TOKEN));
}

#[tokio::test]
async fn falls_back_to_eth_accounts() {
    let node = Arc::new(MockNode::new(Accounts::LegacyOnly));
    let url = spawn_node(Arc::clone(&node)).await;

    let accounts = fast_wallet(&url).request_accounts().await.unwrap();

    assert_eq!(accounts, vec![ACCOUNT]);
    assert_eq!(node.methods(), vec!["eth_requestAccounts", "eth_accounts"]);
}

#[tokio::test]
async fn user_rejection_fails_the_connect_step() {
    let node = Arc::new(MockNode::new(Accounts::Reject));
    let url = spawn_node(Arc::clone(&node)).await;

    let coordinator = LaunchCoordinator::new(LaunchConfig::new(), Arc::new(MemoryStore::new()))
        .with_wallet(Arc::new(fast_wallet(&url)));

    let err = coordinator.try_launch(papi_request()).await.unwrap_err();

    assert!(matches!(err, LaunchError::WalletRejected(ref m) if m.contains("rejected")));
    assert!(node.sent_to().is_empty());
}

#[tokio::test]
async fn unreachable_node_is_unavailable() {
    let wallet = RpcWallet::new("http://127.0.0.1:1");
    assert_eq!(wallet.request_accounts().await, Err(WalletError::Unavailable));
}

#[tokio::test]
async fn pending_receipt_times_out() {
    let node = Arc::new(MockNode::new(Accounts::Grant).never_mine());
    let url = spawn_node(Arc::clone(&node)).await;

    let signer = fast_wallet(&url)
        .with_receipt_timeout(Duration::from_millis(100))
        .signer_for(ACCOUNT);
    let tx_hash = signer
        .send_transaction(PAIRED_TOKEN, Bytes::from_static(&[0x01]))
        .await
        .unwrap();

    let err = signer.wait_for_receipt(tx_hash).await.unwrap_err();

    assert!(matches!(err, WalletError::Timeout(_)));
    let polls = node
        .methods()
        .iter()
        .filter(|m| *m == "eth_getTransactionReceipt")
        .count();
    assert!(polls >= 2, "expected repeated polling, saw {polls}");
}
