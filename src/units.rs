//! Wei <-> ETH conversion helpers. Contract amounts travel as wei strings;
//! everything user-facing is ETH with four display decimals.

use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::RemitError;

pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Parse a user-entered ETH amount ("0.25") into wei.
pub fn parse_ether(input: &str) -> Result<u128, RemitError> {
    let amount = Decimal::from_str(input.trim())
        .map_err(|_| RemitError::Validation(format!("Invalid amount: '{}'", input.trim())))?;
    if amount.is_sign_negative() {
        return Err(RemitError::Validation("Amount must be positive".to_string()));
    }
    let wei_per_eth = Decimal::from_i128_with_scale(WEI_PER_ETH as i128, 0);
    let scaled = amount
        .checked_mul(wei_per_eth)
        .ok_or_else(|| RemitError::Validation("Amount too large".to_string()))?;
    if !scaled.fract().is_zero() {
        return Err(RemitError::Validation(
            "Amount has more than 18 decimal places".to_string(),
        ));
    }
    scaled
        .to_u128()
        .ok_or_else(|| RemitError::Validation("Amount too large".to_string()))
}

/// Format wei as ETH with 4 decimal places (truncated), the display
/// precision used on every screen.
pub fn format_ether(wei: u128) -> String {
    let int = wei / WEI_PER_ETH;
    let frac4 = (wei % WEI_PER_ETH) / 100_000_000_000_000;
    format!("{}.{:04}", int, frac4)
}

/// Full-precision ETH rendering, used for gas amounts (6 places).
pub fn format_ether_gas(wei: u128) -> String {
    let int = wei / WEI_PER_ETH;
    let frac6 = (wei % WEI_PER_ETH) / 1_000_000_000_000;
    format!("{}.{:06}", int, frac6)
}

/// Serde helper: wei values don't fit JSON numbers, so the wire format is a
/// decimal string.
pub mod wei_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}
