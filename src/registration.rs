//! Username/phone registration. The only purely local validation in the
//! system lives here; everything else is the contract's call.

use thiserror::Error;

use crate::error::RemitError;
use crate::session::Session;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PHONE_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Phone,
}

#[derive(Error, Debug, PartialEq)]
pub enum RegistrationError {
    /// Attributable to one input field; message shown next to it.
    #[error("{message}")]
    Field { field: Field, message: String },
    #[error("Registration failed. Please try again.")]
    Failed,
}

impl RegistrationError {
    fn username(message: &str) -> Self {
        RegistrationError::Field {
            field: Field::Username,
            message: message.to_string(),
        }
    }

    fn phone(message: &str) -> Self {
        RegistrationError::Field {
            field: Field::Phone,
            message: message.to_string(),
        }
    }
}

/// Length checks only; no contract call is made for invalid input.
pub fn validate(username: &str, phone: &str) -> Result<(), RegistrationError> {
    if username.len() < MIN_USERNAME_LEN {
        return Err(RegistrationError::username(
            "Username must be at least 3 characters",
        ));
    }
    if phone.len() < MIN_PHONE_LEN {
        return Err(RegistrationError::phone(
            "Phone number must be at least 5 characters",
        ));
    }
    Ok(())
}

/// Full registration flow: local validation, two availability reads, one
/// write, wait for confirmation, then refresh the cached profile. A
/// confirmed transaction is success unconditionally; there is no retry.
pub async fn register(
    session: &mut Session,
    username: &str,
    phone: &str,
) -> Result<(), RegistrationError> {
    let username = username.trim();
    let phone = phone.trim();
    validate(username, phone)?;

    let contract = session.contract().map_err(|_| RegistrationError::Failed)?;

    match contract.check_username_availability(username).await {
        Ok(true) => {}
        Ok(false) => return Err(RegistrationError::username("Username already taken")),
        Err(e) => {
            tracing::error!("Registration error: {}", e);
            return Err(RegistrationError::Failed);
        }
    }

    match contract.check_phone_availability(phone).await {
        Ok(true) => {}
        Ok(false) => return Err(RegistrationError::phone("Phone number already registered")),
        Err(e) => {
            tracing::error!("Registration error: {}", e);
            return Err(RegistrationError::Failed);
        }
    }

    let tx = contract
        .register_user(username, phone)
        .await
        .map_err(|e| reject_to_field(e))?;

    contract.wait_for_confirmation(&tx).await.map_err(|e| {
        tracing::error!("Registration error: {}", e);
        RegistrationError::Failed
    })?;

    session.refresh_profile().await;
    Ok(())
}

/// The availability checks and the write race other registrants, so the
/// contract can still reject a name both reads said was free. Attribute the
/// verbatim reason to a field when it names one.
fn reject_to_field(e: RemitError) -> RegistrationError {
    tracing::error!("Registration error: {}", e);
    match e {
        RemitError::Rejected(reason) => {
            let lower = reason.to_lowercase();
            if lower.contains("username") {
                RegistrationError::Field {
                    field: Field::Username,
                    message: reason,
                }
            } else if lower.contains("phone") {
                RegistrationError::Field {
                    field: Field::Phone,
                    message: reason,
                }
            } else {
                RegistrationError::Failed
            }
        }
        _ => RegistrationError::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ContractApi;
    use crate::testutil::{MockContract, MockProvider};
    use std::sync::Arc;

    const ALICE: &str = "0xaaaa000000000000000000000000000000000001";

    async fn connected_session(contract: Arc<MockContract>) -> Session {
        let provider = MockProvider::with_accounts(vec![ALICE.to_string()]);
        let mut session = Session::new(
            Arc::new(provider),
            Box::new(move |_| contract.clone() as Arc<dyn ContractApi>),
        );
        session.connect().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_short_username_rejected_without_contract_call() {
        let contract = Arc::new(MockContract::new());
        let mut session = connected_session(contract.clone()).await;

        let err = register(&mut session, "ab", "5551234").await.unwrap_err();
        assert!(matches!(err, RegistrationError::Field { field: Field::Username, .. }));
        assert_eq!(contract.availability_calls(), 0);
        assert!(contract.writes().is_empty());
    }

    #[tokio::test]
    async fn test_short_phone_rejected_without_contract_call() {
        let contract = Arc::new(MockContract::new());
        let mut session = connected_session(contract.clone()).await;

        let err = register(&mut session, "alice", "1234").await.unwrap_err();
        assert!(matches!(err, RegistrationError::Field { field: Field::Phone, .. }));
        assert_eq!(contract.availability_calls(), 0);
    }

    #[tokio::test]
    async fn test_taken_username_is_field_error_without_write() {
        let contract = Arc::new(MockContract::new());
        contract.take_username("alice");
        let mut session = connected_session(contract.clone()).await;

        let err = register(&mut session, "alice", "5551234").await.unwrap_err();
        assert_eq!(err, RegistrationError::username("Username already taken"));
        assert!(contract.writes().is_empty());
    }

    #[tokio::test]
    async fn test_taken_phone_is_field_error_without_write() {
        let contract = Arc::new(MockContract::new());
        contract.take_phone("5551234");
        let mut session = connected_session(contract.clone()).await;

        let err = register(&mut session, "alice", "5551234").await.unwrap_err();
        assert_eq!(err, RegistrationError::phone("Phone number already registered"));
        assert!(contract.writes().is_empty());
    }

    #[tokio::test]
    async fn test_successful_registration_refreshes_profile() {
        let contract = Arc::new(MockContract::new());
        let mut session = connected_session(contract.clone()).await;
        assert!(session.profile().is_none());

        // Simulate the contract state the confirmed write produces.
        contract.register_profile(ALICE, "alice", "5551234");

        register(&mut session, "alice", "5551234").await.unwrap();
        assert_eq!(contract.writes(), vec!["registerUser alice 5551234"]);
        assert_eq!(session.profile().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_contract_rejection_reason_surfaced_verbatim() {
        let contract = Arc::new(MockContract::new());
        contract.reject_writes_with("Username is reserved");
        let mut session = connected_session(contract.clone()).await;

        let err = register(&mut session, "admin", "5551234").await.unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Field {
                field: Field::Username,
                message: "Username is reserved".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_disconnected_session_fails_generically() {
        let contract = Arc::new(MockContract::new());
        let provider = MockProvider::with_accounts(vec![ALICE.to_string()]);
        let mut session = Session::new(
            Arc::new(provider),
            Box::new(move |_| contract.clone() as Arc<dyn ContractApi>),
        );

        let err = register(&mut session, "alice", "5551234").await.unwrap_err();
        assert_eq!(err, RegistrationError::Failed);
    }
}
