use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemitError {
    #[error("No wallet provider found. Please install a wallet extension.")]
    ProviderAbsent,
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("Rejected by contract: {0}")]
    Rejected(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not connected")]
    NotConnected,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RemitError {
    /// Contract business rejections carry a reason string the user should see
    /// verbatim; everything else gets a generic message at the call site.
    pub fn user_message(&self) -> String {
        match self {
            RemitError::Rejected(reason) => reason.clone(),
            RemitError::Validation(msg) => msg.clone(),
            RemitError::ProviderAbsent => self.to_string(),
            _ => "Transaction failed. Please try again.".to_string(),
        }
    }
}
