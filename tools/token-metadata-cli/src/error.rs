use thiserror::Error;
use token_metadata_sdk::ChainError;

use crate::config::ConfigError;
use crate::upload::UploadError;
use crate::wallet::WalletError;

/// Any failure that ends a run. Each variant names the stage it came from.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("failed to serialize metadata document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RunError {
    pub fn stage(&self) -> &'static str {
        match self {
            RunError::Config(_) => "config",
            RunError::Wallet(_) => "wallet",
            RunError::Upload(_) => "upload",
            RunError::Chain(_) => "chain",
            RunError::Serialize(_) => "compose",
        }
    }

    /// Operator-facing suggestion, when there is an obvious next step.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RunError::Chain(e) => e.hint(),
            RunError::Wallet(WalletError::NotFound(_)) => {
                Some("set WALLET_PATH to a JSON keypair file (64 byte values)")
            }
            RunError::Wallet(WalletError::TokenNotFound(_)) => {
                Some("check the mint address and that SOLANA_NETWORK matches the mint's cluster")
            }
            RunError::Upload(UploadError::TooLarge { .. }) => {
                Some("shrink the image or raise upload.imageMaxSize")
            }
            _ => None,
        }
    }
}
