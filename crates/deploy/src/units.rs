//! Hex-quantity and chain-native unit helpers.

use alloy_core::primitives::U256;
use anyhow::{Context, Result};

/// Number of wei in one ETH.
const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;

/// Encode a u64 as a 0x-prefixed hex quantity.
pub fn to_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Parse a 0x-prefixed hex quantity into a u64.
pub fn parse_quantity_u64(s: &str) -> Result<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .with_context(|| format!("Invalid hex quantity: '{}'", s))
}

/// Parse a 0x-prefixed hex quantity into a U256.
pub fn parse_quantity_u256(s: &str) -> Result<U256> {
    U256::from_str_radix(s.trim_start_matches("0x"), 16)
        .with_context(|| format!("Invalid hex quantity: '{}'", s))
}

/// Format a wei amount as a decimal ETH string.
///
/// Whole amounts render without a fractional part; trailing zeros in the
/// fractional part are trimmed.
pub fn format_ether(wei: U256) -> String {
    let divisor = U256::from(WEI_PER_ETH);
    let whole = wei / divisor;
    let frac = wei % divisor;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac = format!("{:0>18}", frac.to_string());
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
