//! Read-back of a mint's metadata account for the `show` subcommand.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use token_metadata_sdk::{decode_metadata, ChainClient, TokenMetadataClient};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowReport {
    pub mint: String,
    pub metadata_account: String,
    pub exists: bool,
    pub metadata: Option<ShownMetadata>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShownMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub update_authority: String,
    pub is_mutable: bool,
}

/// Read back the metadata account of `mint`, if one exists.
pub async fn show(
    chain: &dyn ChainClient,
    client: &TokenMetadataClient,
    mint: &Pubkey,
) -> anyhow::Result<ShowReport> {
    let metadata_account = client.metadata_pda(mint);
    let metadata = match chain.get_account_data(&metadata_account).await? {
        Some(data) => {
            let view = decode_metadata(&data)?;
            Some(ShownMetadata {
                name: view.name,
                symbol: view.symbol,
                uri: view.uri,
                update_authority: view.update_authority.to_string(),
                is_mutable: view.is_mutable,
            })
        }
        None => None,
    };
    Ok(ShowReport {
        mint: mint.to_string(),
        metadata_account: metadata_account.to_string(),
        exists: metadata.is_some(),
        metadata,
    })
}
