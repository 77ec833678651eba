//! Fixed-point amount normalization
//!
//! Launch amounts arrive as decimal strings and are scaled by `10^18` before
//! they reach the contracts. The scale is fixed: the paired token's own
//! `decimals()` is never consulted.

use crate::error::{AmountError, LaunchError};
use crate::types::LaunchRequest;
use alloy_primitives::utils::{format_units, parse_units};
use alloy_primitives::{Address, U256};
use std::str::FromStr;

/// Fractional digits assumed for every launch amount
pub const FIXED_DECIMALS: u8 = 18;

/// Convert a decimal string into its 18-decimal fixed-point integer.
///
/// Accepts `123`, `123.45`, `.5` and `5.`; rejects signs, exponents,
/// separators and more than 18 fractional digits.
pub fn to_fixed_point(value: &str) -> Result<U256, AmountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(int_part)
        || !digits_only(frac_part)
        || (int_part.is_empty() && frac_part.is_empty())
    {
        return Err(AmountError::NotDecimal(trimmed.to_string()));
    }
    if frac_part.len() > usize::from(FIXED_DECIMALS) {
        return Err(AmountError::TooPrecise {
            value: trimmed.to_string(),
            max: FIXED_DECIMALS,
        });
    }

    let canonical = format!(
        "{}.{}",
        if int_part.is_empty() { "0" } else { int_part },
        if frac_part.is_empty() { "0" } else { frac_part }
    );
    parse_units(&canonical, FIXED_DECIMALS)
        .map(|parsed| parsed.get_absolute())
        .map_err(|_| AmountError::Overflow(trimmed.to_string()))
}

/// Same as [`to_fixed_point`] but rejects zero
pub fn to_positive_fixed_point(value: &str) -> Result<U256, AmountError> {
    let amount = to_fixed_point(value)?;
    if amount.is_zero() {
        return Err(AmountError::Zero);
    }
    Ok(amount)
}

/// Render a fixed-point amount back as a decimal string
#[must_use]
pub fn format_fixed(amount: U256) -> String {
    format_units(amount, FIXED_DECIMALS).unwrap_or_else(|_| amount.to_string())
}

/// Launch request amounts after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedAmounts {
    /// Paired token contract
    pub paired_token: Address,
    /// Memecoin supply, scaled
    pub initial_supply: U256,
    /// Memecoin seeded into the pool, scaled
    pub liquidity_memecoin: U256,
    /// Paired token seeded into the pool, scaled; also the approval amount
    pub liquidity_paired: U256,
}

impl NormalizedAmounts {
    /// Normalize every numeric and address field of a request
    ///
    /// # Errors
    /// `LaunchError::ParseError` naming the first offending field
    pub fn from_request(request: &LaunchRequest) -> Result<Self, LaunchError> {
        let initial_supply = to_positive_fixed_point(&request.initial_supply)
            .map_err(|e| LaunchError::parse("initialSupply", &e))?;
        let liquidity_memecoin = to_fixed_point(&request.liquidity_memecoin_amount)
            .map_err(|e| LaunchError::parse("liquidityMemecoinAmount", &e))?;
        let liquidity_paired = to_positive_fixed_point(&request.liquidity_paired_token_amount)
            .map_err(|e| LaunchError::parse("liquidityPairedTokenAmount", &e))?;
        let paired_token = Address::from_str(request.paired_token.trim()).map_err(|e| {
            LaunchError::ParseError {
                field: "pairedToken",
                reason: format!("`{}` is not an address: {e}", request.paired_token),
            }
        })?;

        Ok(Self {
            paired_token,
            initial_supply,
            liquidity_memecoin,
            liquidity_paired,
        })
    }
}
