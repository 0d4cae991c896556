//! Wallet loading and pre-flight checks.

use std::path::{Path, PathBuf};

use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use thiserror::Error;
use token_metadata_sdk::ChainClient;
use tracing::{info, warn};
use zeroize::Zeroize;

/// Raw ed25519 keypair length: 32-byte secret followed by 32-byte public key.
pub const SECRET_KEY_LEN: usize = 64;

/// Below this the run continues with a warning.
pub const LOW_BALANCE_LAMPORTS: u64 = 10_000_000;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read wallet file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("wallet file {} must be a JSON array of {SECRET_KEY_LEN} byte values: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("token {0} not found on chain")]
    TokenNotFound(Pubkey),

    #[error("wallet check failed: {0}")]
    Rpc(#[source] anyhow::Error),
}

/// Signing identity for the run.
pub struct WalletIdentity {
    keypair: Keypair,
}

impl WalletIdentity {
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl From<Keypair> for WalletIdentity {
    fn from(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

/// Parse the contents of a wallet file.
pub fn parse_secret_key(raw: &str) -> Result<Vec<u8>, String> {
    let bytes: Vec<u8> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if bytes.len() != SECRET_KEY_LEN {
        return Err(format!("found {} values", bytes.len()));
    }
    Ok(bytes)
}

/// Read a wallet file and build the signing identity.
/// Render a lamport amount as SOL with four decimals, e.g. `1.5000 SOL`.
pub fn format_sol(lamports: u64) -> String {
    format!("{:.4} SOL", lamports as f64 / LAMPORTS_PER_SOL as f64)
}

pub fn load(path: &Path) -> Result<WalletIdentity, WalletError> {
    if !path.exists() {
        return Err(WalletError::NotFound(path.to_path_buf()));
    }
    let mut raw = std::fs::read_to_string(path).map_err(|source| WalletError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_secret_key(&raw);
    raw.zeroize();

    let malformed = |reason: String| WalletError::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    let mut bytes = parsed.map_err(malformed)?;
    let keypair = Keypair::from_bytes(&bytes).map_err(|e| malformed(e.to_string()));
    bytes.zeroize();

    let identity = WalletIdentity::from(keypair?);
    info!(wallet = %short(&identity.pubkey().to_string()), "wallet loaded");
    Ok(identity)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalletStatus {
    pub balance_lamports: u64,
    pub low_balance: bool,
}

/// Check the wallet balance and that `mint` exists.
///
/// A low balance only logs a warning; a missing mint is fatal.
pub async fn validate(
    chain: &dyn ChainClient,
    wallet: &WalletIdentity,
    mint: &Pubkey,
) -> Result<WalletStatus, WalletError> {
    let balance_lamports = chain
        .get_balance(&wallet.pubkey())
        .await
        .map_err(WalletError::Rpc)?;
    info!("SOL balance: {}", format_sol(balance_lamports));

    let low_balance = balance_lamports < LOW_BALANCE_LAMPORTS;
    if low_balance {
        warn!(
            balance_lamports,
            "low SOL balance; it may not cover the transaction"
        );
    }

    if !chain.account_exists(mint).await.map_err(WalletError::Rpc)? {
        return Err(WalletError::TokenNotFound(*mint));
    }
    info!(%mint, "token found on chain");

    Ok(WalletStatus {
        balance_lamports,
        low_balance,
    })
}

pub(crate) fn short(s: &str) -> String {
    if s.len() <= 10 {
        return s.to_string();
    }
    format!("{}...{}", &s[..5], &s[s.len() - 5..])
}
