//! Read-only inspection of a deployed memecoin

use crate::abi::IERC20;
use crate::error::{InspectError, WalletError};
use crate::store::MemecoinAddressStore;
use crate::wallet::{read_call, Signer};
use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

/// On-chain token details plus the signer's balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token contract
    pub address: Address,
    /// `name()`
    pub name: String,
    /// `symbol()`
    pub symbol: String,
    /// `decimals()`
    pub decimals: u8,
    /// `totalSupply()`
    pub total_supply: U256,
    /// `balanceOf(signer)`
    pub holder_balance: U256,
}

impl TokenInfo {
    /// Total supply in whole tokens, using the token's own decimals
    pub fn formatted_total_supply(&self) -> Result<String, InspectError> {
        self.format(self.total_supply)
    }

    /// Signer balance in whole tokens
    pub fn formatted_balance(&self) -> Result<String, InspectError> {
        self.format(self.holder_balance)
    }

    fn format(&self, amount: U256) -> Result<String, InspectError> {
        format_units(amount, self.decimals).map_err(|_| InspectError::Format {
            decimals: self.decimals,
        })
    }
}

/// Reads ERC-20 metadata through a signer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenInspector;

impl TokenInspector {
    /// Create new inspector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Inspect the token at `token`
    ///
    /// `name()` is read first so a non-token address fails fast.
    pub async fn inspect(
        &self,
        signer: &dyn Signer,
        token: Address,
    ) -> Result<TokenInfo, InspectError> {
        let name = read(signer, token, "name", &IERC20::nameCall {}).await?._0;
        let symbol = read(signer, token, "symbol", &IERC20::symbolCall {}).await?._0;
        let decimals = read(signer, token, "decimals", &IERC20::decimalsCall {}).await?._0;
        let total_supply = read(signer, token, "totalSupply", &IERC20::totalSupplyCall {})
            .await?
            ._0;
        let holder_balance = read(
            signer,
            token,
            "balanceOf",
            &IERC20::balanceOfCall {
                account: signer.address(),
            },
        )
        .await?
        ._0;

        tracing::info!(%token, %symbol, "loaded token info");
        Ok(TokenInfo {
            address: token,
            name,
            symbol,
            decimals,
            total_supply,
            holder_balance,
        })
    }

    /// Inspect the token recorded by the last launch
    ///
    /// # Errors
    /// `InspectError::NoStoredAddress` if nothing was deployed yet
    pub async fn inspect_stored(
        &self,
        store: &MemecoinAddressStore,
        signer: &dyn Signer,
    ) -> Result<TokenInfo, InspectError> {
        let token = store.get()?.ok_or(InspectError::NoStoredAddress)?;
        self.inspect(signer, token).await
    }
}

async fn read<C>(
    signer: &dyn Signer,
    token: Address,
    method: &'static str,
    call: &C,
) -> Result<C::Return, InspectError>
where
    C: SolCall + Sync,
{
    read_call(signer, token, call)
        .await
        .map_err(|source: WalletError| InspectError::Call { method, source })
}
