//! JSON-RPC wallet backend
//!
//! Implements the launch coordinator's wallet ports against an EVM node that
//! manages its own accounts (a local dev node, or a remote signer speaking
//! the EIP-1193 method set over HTTP).

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;
pub mod wallet;

pub use client::JsonRpcClient;
pub use error::RpcError;
pub use wallet::{RpcSigner, RpcWallet};
