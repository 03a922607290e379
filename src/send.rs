//! Send-money flow: recipient type detection, advisory gas projection and
//! submission.

use std::sync::Arc;

use crate::client::ContractApi;
use crate::error::RemitError;
use crate::provider::WalletProvider;
use crate::types::{is_address, TxHash};

/// Placeholder recipient when the identifier path is used.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Username,
    Phone,
    Address,
}

/// Classify what the user typed into the recipient field. 0x + 40 hex chars
/// is an address; an `@` or ten-plus characters reads as a phone number;
/// anything else is a username.
pub fn detect_identifier(value: &str) -> IdentifierKind {
    if is_address(value) {
        IdentifierKind::Address
    } else if value.contains('@') || value.len() >= 10 {
        IdentifierKind::Phone
    } else {
        IdentifierKind::Username
    }
}

/// (identifier, address) pair as the contract expects it: exactly one side
/// populated, the other empty / zero.
pub fn split_recipient(recipient: &str) -> (String, String) {
    match detect_identifier(recipient) {
        IdentifierKind::Address => (String::new(), recipient.to_string()),
        _ => (recipient.to_string(), ZERO_ADDRESS.to_string()),
    }
}

/// Projected total gas cost in wei for a transfer with these parameters.
/// Purely advisory: any estimation failure resets the figure to zero and
/// never blocks submission.
pub async fn estimate_fee_wei(
    contract: &Arc<dyn ContractApi>,
    provider: &Arc<dyn WalletProvider>,
    recipient: &str,
    amount_wei: u128,
) -> u128 {
    let (identifier, address) = split_recipient(recipient);
    let gas = match contract
        .estimate_send_gas(&identifier, &address, amount_wei)
        .await
    {
        Ok(gas) => gas,
        Err(e) => {
            tracing::error!("Gas estimation error: {}", e);
            return 0;
        }
    };
    match provider.gas_price().await {
        Ok(price) => u128::from(gas).saturating_mul(price),
        Err(e) => {
            tracing::error!("Gas estimation error: {}", e);
            0
        }
    }
}

/// Submit the transfer and wait for it to be mined. The fee shown to the
/// user rides along as the contract's gas hint.
pub async fn send(
    contract: &Arc<dyn ContractApi>,
    recipient: &str,
    amount_wei: u128,
    gas_hint_wei: u128,
) -> Result<TxHash, RemitError> {
    if amount_wei == 0 {
        return Err(RemitError::Validation("Amount must be positive".to_string()));
    }
    let (identifier, address) = split_recipient(recipient);
    let tx = contract
        .send_funds(&identifier, &address, amount_wei, gas_hint_wei)
        .await?;
    contract.wait_for_confirmation(&tx).await?;
    Ok(tx)
}
