//! Error types

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Sub-reason of a failed metadata transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChainErrorKind {
    /// A metadata account already exists for the mint
    AlreadyExists,
    /// The payer cannot cover fees or rent
    InsufficientFunds,
    /// The signer is not the mint authority
    AuthorityMismatch,
    /// Anything else reported by the node
    Other,
}

impl ChainErrorKind {
    /// Classify a node error message.
    ///
    /// The RPC client has no typed channel for these cases, so detection is by substring,
    /// case-insensitive. Earlier rules win.
    pub fn classify(message: &str) -> Self {
        let m = message.to_lowercase();
        if m.contains("already in use") || m.contains("already exists") {
            ChainErrorKind::AlreadyExists
        } else if m.contains("insufficient funds")
            || m.contains("insufficient lamports")
            || m.contains("no record of a prior credit")
        {
            ChainErrorKind::InsufficientFunds
        } else if m.contains("authority") {
            ChainErrorKind::AuthorityMismatch
        } else {
            ChainErrorKind::Other
        }
    }
}

/// Errors surfaced by the on-chain linking step.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Instruction parameters rejected before anything was sent
    #[error("invalid create-metadata parameters: {0}")]
    InvalidInstruction(#[source] anyhow::Error),

    /// Metadata was already created for this mint
    #[error("metadata already exists for mint {mint}")]
    AlreadyExists {
        mint: Pubkey,
        #[source]
        source: anyhow::Error,
    },

    /// Payer balance too low for fees and rent
    #[error("insufficient funds in wallet {payer}")]
    InsufficientFunds {
        payer: Pubkey,
        #[source]
        source: anyhow::Error,
    },

    /// Signer lacks mint authority rights
    #[error("signer {signer} is not the mint authority of {mint}")]
    AuthorityMismatch {
        mint: Pubkey,
        signer: Pubkey,
        #[source]
        source: anyhow::Error,
    },

    /// Generic submission or confirmation failure
    #[error("metadata transaction failed: {0}")]
    Other(#[source] anyhow::Error),
}

impl ChainError {
    /// Wrap a submission failure, classifying it by message.
    pub fn from_submission(mint: Pubkey, signer: Pubkey, source: anyhow::Error) -> Self {
        // `{:#}` includes the whole context chain, where preflight logs live.
        match ChainErrorKind::classify(&format!("{source:#}")) {
            ChainErrorKind::AlreadyExists => ChainError::AlreadyExists { mint, source },
            ChainErrorKind::InsufficientFunds => ChainError::InsufficientFunds {
                payer: signer,
                source,
            },
            ChainErrorKind::AuthorityMismatch => ChainError::AuthorityMismatch {
                mint,
                signer,
                source,
            },
            ChainErrorKind::Other => ChainError::Other(source),
        }
    }

    pub fn kind(&self) -> ChainErrorKind {
        match self {
            ChainError::AlreadyExists { .. } => ChainErrorKind::AlreadyExists,
            ChainError::InsufficientFunds { .. } => ChainErrorKind::InsufficientFunds,
            ChainError::AuthorityMismatch { .. } => ChainErrorKind::AuthorityMismatch,
            ChainError::InvalidInstruction(_) | ChainError::Other(_) => ChainErrorKind::Other,
        }
    }

    /// Operator-facing suggestion for the classified cases.
    pub fn hint(&self) -> Option<&'static str> {
        match self.kind() {
            ChainErrorKind::AlreadyExists => Some(
                "the token already has metadata; use an update-metadata flow instead of create",
            ),
            ChainErrorKind::InsufficientFunds => {
                Some("not enough SOL to pay for the transaction; top up the wallet")
            }
            ChainErrorKind::AuthorityMismatch => {
                Some("the wallet does not hold mint authority for this token")
            }
            ChainErrorKind::Other => None,
        }
    }
}
