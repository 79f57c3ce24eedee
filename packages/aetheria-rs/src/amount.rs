//! Amount and Identifier Codec
//!
//! Converts human-entered decimal strings to fixed-point token amounts and
//! back, and encodes account addresses as the 32-byte destination ids that
//! LayerZero expects.
//!
//! ## Destination ID Format
//!
//! ```text
//! | Zero padding (12 bytes) | Raw EVM address (20 bytes) |
//! ```

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

/// Decimals of every resource token
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest scale whose `10^decimals` fits in a `U256`
pub const MAX_DECIMALS: u8 = 77;

/// Width of a LayerZero destination id in bytes
pub const DESTINATION_ID_LEN: usize = 32;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount '{0}': expected a decimal number")]
    Malformed(String),

    #[error("Amount '{0}' does not fit in 256 bits")]
    Overflow(String),

    #[error("Amount must be greater than zero")]
    Zero,

    #[error("Invalid token id '{0}'")]
    InvalidTokenId(String),

    #[error("Destination id must be at most 32 bytes, got {0}")]
    TooWide(usize),

    #[error("Token decimals {0} exceed the supported maximum of 77")]
    UnsupportedDecimals(u8),
}

/// `None` past `MAX_DECIMALS`
fn ten_pow(decimals: u8) -> Option<U256> {
    (decimals <= MAX_DECIMALS).then(|| U256::from(10u64).pow(U256::from(decimals)))
}

/// Parse a decimal string into a fixed-point integer with `decimals` places.
///
/// The fractional part is right-padded with zeros, or truncated when it has
/// more than `decimals` digits. No rounding is applied. Scales above
/// `MAX_DECIMALS` are rejected.
pub fn to_fixed_point(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fractional) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fractional.is_empty()) || !all_digits(whole) || !all_digits(fractional)
    {
        return Err(AmountError::Malformed(amount.to_string()));
    }

    let places = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + places);
    digits.push_str(whole);
    if fractional.len() >= places {
        digits.push_str(&fractional[..places]);
    } else {
        digits.push_str(fractional);
        digits.extend(std::iter::repeat('0').take(places - fractional.len()));
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow(amount.to_string()))
}

/// Render a fixed-point integer as a canonical decimal string.
///
/// Trailing fractional zeros are stripped; a zero fractional part emits only
/// the whole part. Past `MAX_DECIMALS` every `U256` is below `10^decimals`,
/// so the whole part is zero.
pub fn from_fixed_point(raw: U256, decimals: u8) -> String {
    let (whole, fractional) = match ten_pow(decimals) {
        Some(divisor) => (raw / divisor, raw % divisor),
        None => (U256::ZERO, raw),
    };

    if fractional.is_zero() {
        return whole.to_string();
    }

    let padded = format!("{:0>width$}", fractional.to_string(), width = decimals as usize);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

/// Parse a user-entered amount that must be strictly positive
pub fn parse_positive_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let value = to_fixed_point(amount, decimals)?;
    if value.is_zero() {
        return Err(AmountError::Zero);
    }
    Ok(value)
}

/// Parse an NFT token id (non-negative integer)
pub fn parse_token_id(token_id: &str) -> Result<U256, AmountError> {
    let token_id = token_id.trim();
    if token_id.is_empty() || !token_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidTokenId(token_id.to_string()));
    }
    U256::from_str_radix(token_id, 10)
        .map_err(|_| AmountError::InvalidTokenId(token_id.to_string()))
}

/// Convert an EVM account to its 32-byte destination id (left-padded with zeros)
pub fn account_to_destination_id(account: Address) -> B256 {
    let mut result = [0u8; DESTINATION_ID_LEN];
    result[12..].copy_from_slice(account.as_slice());
    B256::from(result)
}

/// Left-pad arbitrary raw account bytes to a 32-byte destination id
pub fn bytes_to_destination_id(raw: &[u8]) -> Result<B256, AmountError> {
    if raw.len() > DESTINATION_ID_LEN {
        return Err(AmountError::TooWide(raw.len()));
    }
    let mut result = [0u8; DESTINATION_ID_LEN];
    result[DESTINATION_ID_LEN - raw.len()..].copy_from_slice(raw);
    Ok(B256::from(result))
}

/// Recover the EVM account from a destination id, if the padding is all zeros
pub fn destination_id_to_account(id: B256) -> Option<Address> {
    if id[..12].iter().any(|&b| b != 0) {
        return None;
    }
    Some(Address::from_slice(&id[12..]))
}
