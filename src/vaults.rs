//! Shared-vault operations: snapshot fetch plus the four write flows. Every
//! write waits for confirmation and leaves re-fetching the snapshot to the
//! caller; membership authority stays with the contract.

use std::sync::Arc;

use crate::client::ContractApi;
use crate::error::RemitError;
use crate::types::{is_address, same_address, TxHash, VaultSummary};

/// Point-in-time snapshots of every vault the account belongs to. A failing
/// member read skips that vault instead of failing the whole list.
pub async fn fetch_all(
    contract: &Arc<dyn ContractApi>,
    account: &str,
) -> Result<Vec<VaultSummary>, RemitError> {
    let creators = contract.get_vaults_for_member(account).await?;
    let mut vaults = Vec::with_capacity(creators.len());
    for creator in creators {
        match contract.get_vault_members(&creator).await {
            Ok(members) => vaults.push(VaultSummary {
                is_creator: same_address(&creator, account),
                creator,
                members,
            }),
            Err(e) => {
                tracing::error!("Error fetching vault {}: {}", creator, e);
            }
        }
    }
    Ok(vaults)
}

pub async fn create(contract: &Arc<dyn ContractApi>) -> Result<TxHash, RemitError> {
    let tx = contract.create_vault().await?;
    contract.wait_for_confirmation(&tx).await?;
    Ok(tx)
}

pub async fn add_member(
    contract: &Arc<dyn ContractApi>,
    creator: &str,
    member: &str,
) -> Result<TxHash, RemitError> {
    if !is_address(member) {
        return Err(RemitError::Validation(format!(
            "'{}' is not a valid address",
            member
        )));
    }
    let tx = contract.add_to_vault(creator, member).await?;
    contract.wait_for_confirmation(&tx).await?;
    Ok(tx)
}

pub async fn deposit(
    contract: &Arc<dyn ContractApi>,
    creator: &str,
    value_wei: u128,
) -> Result<TxHash, RemitError> {
    if value_wei == 0 {
        return Err(RemitError::Validation("Amount must be positive".to_string()));
    }
    let tx = contract.deposit_to_vault(creator, value_wei).await?;
    contract.wait_for_confirmation(&tx).await?;
    Ok(tx)
}

/// Withdraw, gated against the balance currently on display. The contract
/// still enforces the real limit; this only mirrors the form gating.
pub async fn withdraw(
    contract: &Arc<dyn ContractApi>,
    creator: &str,
    amount_wei: u128,
    displayed_balance_wei: u128,
) -> Result<TxHash, RemitError> {
    if amount_wei == 0 {
        return Err(RemitError::Validation("Amount must be positive".to_string()));
    }
    if amount_wei > displayed_balance_wei {
        return Err(RemitError::Validation(
            "Amount exceeds the vault balance".to_string(),
        ));
    }
    let tx = contract.withdraw_from_vault(creator, amount_wei).await?;
    contract.wait_for_confirmation(&tx).await?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockContract;
    use crate::units::WEI_PER_ETH;

    const ALICE: &str = "0xaaaa000000000000000000000000000000000001";
    const BOB: &str = "0xbbbb000000000000000000000000000000000002";
    const CAROL: &str = "0xcccc000000000000000000000000000000000003";

    #[tokio::test]
    async fn test_fetch_all_marks_own_vault() {
        let mock = Arc::new(MockContract::new());
        mock.set_vaults(ALICE, vec![ALICE, BOB]);
        mock.set_vault_members(ALICE, vec![ALICE, CAROL]);
        mock.set_vault_members(BOB, vec![BOB, ALICE]);
        let contract: Arc<dyn ContractApi> = mock;

        let vaults = fetch_all(&contract, ALICE).await.unwrap();
        assert_eq!(vaults.len(), 2);
        assert!(vaults[0].is_creator);
        assert!(!vaults[1].is_creator);
        assert_eq!(vaults[0].members, vec![ALICE, CAROL]);
    }

    #[tokio::test]
    async fn test_fetch_all_skips_unreadable_vault() {
        let mock = Arc::new(MockContract::new());
        mock.set_vaults(ALICE, vec![ALICE, BOB]);
        mock.set_vault_members(ALICE, vec![ALICE]);
        // No members registered for BOB's vault -> that read fails.
        let contract: Arc<dyn ContractApi> = mock;

        let vaults = fetch_all(&contract, ALICE).await.unwrap();
        assert_eq!(vaults.len(), 1);
        assert_eq!(vaults[0].creator, ALICE);
    }

    #[tokio::test]
    async fn test_fetch_all_no_vaults() {
        let contract: Arc<dyn ContractApi> = Arc::new(MockContract::new());
        let vaults = fetch_all(&contract, ALICE).await.unwrap();
        assert!(vaults.is_empty());
    }

    #[tokio::test]
    async fn test_add_member_validates_address_locally() {
        let mock = Arc::new(MockContract::new());
        let contract: Arc<dyn ContractApi> = mock.clone();

        assert!(add_member(&contract, ALICE, "not-an-address").await.is_err());
        assert!(mock.writes().is_empty());

        add_member(&contract, ALICE, BOB).await.unwrap();
        assert_eq!(mock.writes(), vec![format!("addToVault {} {}", ALICE, BOB)]);
    }

    #[tokio::test]
    async fn test_deposit_rejects_zero() {
        let mock = Arc::new(MockContract::new());
        let contract: Arc<dyn ContractApi> = mock.clone();

        assert!(deposit(&contract, ALICE, 0).await.is_err());
        assert!(mock.writes().is_empty());

        deposit(&contract, ALICE, WEI_PER_ETH).await.unwrap();
        assert_eq!(
            mock.writes(),
            vec![format!("depositToVault {} {}", ALICE, WEI_PER_ETH)]
        );
    }

    #[tokio::test]
    async fn test_withdraw_gated_by_displayed_balance() {
        let mock = Arc::new(MockContract::new());
        let contract: Arc<dyn ContractApi> = mock.clone();

        let err = withdraw(&contract, ALICE, 2 * WEI_PER_ETH, WEI_PER_ETH)
            .await
            .unwrap_err();
        assert!(matches!(err, RemitError::Validation(_)));
        assert!(mock.writes().is_empty());

        withdraw(&contract, ALICE, WEI_PER_ETH, WEI_PER_ETH).await.unwrap();
        assert_eq!(
            mock.writes(),
            vec![format!("withdrawFromVault {} {}", ALICE, WEI_PER_ETH)]
        );
    }

    #[tokio::test]
    async fn test_contract_rejection_surfaces_reason() {
        let mock = Arc::new(MockContract::new());
        mock.reject_writes_with("Only the creator can add members");
        let contract: Arc<dyn ContractApi> = mock;

        let err = add_member(&contract, ALICE, BOB).await.unwrap_err();
        assert_eq!(err.user_message(), "Only the creator can add members");
    }
}
