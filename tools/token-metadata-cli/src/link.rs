//! Links a mint to its metadata URI with one CreateMetadataAccountV3 transaction.

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use token_metadata_sdk::{ChainClient, ChainError, CreateMetadataParams, TokenMetadataClient};
use tracing::{error, info};

use crate::config::LinkTarget;
use crate::wallet::WalletIdentity;

/// Progress of the metadata transaction. There is no retry out of `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Unsent,
    Submitted,
    Confirmed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkReceipt {
    pub signature: Signature,
    pub metadata_account: Pubkey,
}

pub async fn link(
    chain: &dyn ChainClient,
    client: &TokenMetadataClient,
    target: &LinkTarget,
    metadata_uri: &str,
    signer: &WalletIdentity,
) -> Result<LinkReceipt, ChainError> {
    let authority = signer.pubkey();
    let metadata_account = client.metadata_pda(&target.mint);
    info!(%metadata_account, "metadata account derived");

    let ix = client
        .create_metadata_ix(CreateMetadataParams {
            payer: authority,
            mint: target.mint,
            authority,
            name: target.name.clone(),
            symbol: target.symbol.clone(),
            uri: metadata_uri.to_string(),
            is_mutable: true,
        })
        .map_err(ChainError::InvalidInstruction)?;

    let mut state = LinkState::Unsent;
    info!(?state, "signing create-metadata transaction");
    state = LinkState::Submitted;
    info!(?state, "awaiting confirmation");

    match chain.send_and_confirm(&[ix], signer.keypair()).await {
        Ok(signature) => {
            state = LinkState::Confirmed;
            info!(?state, %signature, "metadata linked to token");
            Ok(LinkReceipt {
                signature,
                metadata_account,
            })
        }
        Err(e) => {
            state = LinkState::Failed;
            let err = ChainError::from_submission(target.mint, authority, e);
            error!(?state, kind = ?err.kind(), "create-metadata transaction failed");
            Err(err)
        }
    }
}
