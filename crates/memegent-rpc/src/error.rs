//! JSON-RPC errors

use memegent_launch::WalletError;

/// EIP-1193 "user rejected request"
pub const USER_REJECTED: i64 = 4001;

/// JSON-RPC "method not found"
pub const METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC transport and protocol errors
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP failure or non-success status
    #[error("http: {0}")]
    Transport(#[from] reqwest::Error),

    /// Node answered with a JSON-RPC error object
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Node-provided message
        message: String,
    },

    /// Result did not have the expected shape
    #[error("unexpected {method} result: {source}")]
    Decode {
        /// Method that was called
        method: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

impl RpcError {
    /// Node does not implement the method
    #[inline]
    #[must_use]
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == METHOD_NOT_FOUND)
    }
}

impl From<RpcError> for WalletError {
    fn from(error: RpcError) -> Self {
        match error {
            RpcError::Rpc { code, message } if code == USER_REJECTED => Self::Rejected(message),
            RpcError::Rpc { code, message } => Self::CallFailed(format!("{message} (code {code})")),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rejection_maps_to_rejected() {
        let err = RpcError::Rpc {
            code: USER_REJECTED,
            message: "User rejected the request.".into(),
        };
        assert_eq!(
            WalletError::from(err),
            WalletError::Rejected("User rejected the request.".into())
        );
    }

    #[test]
    fn revert_maps_to_call_failed() {
        let err = RpcError::Rpc {
            code: 3,
            message: "execution reverted".into(),
        };
        assert!(
            matches!(WalletError::from(err), WalletError::CallFailed(m) if m.contains("reverted"))
        );
    }

    #[test]
    fn method_not_found_is_detected() {
        let err = RpcError::Rpc {
            code: METHOD_NOT_FOUND,
            message: "the method eth_requestAccounts does not exist".into(),
        };
        assert!(err.is_method_not_found());
    }
}
