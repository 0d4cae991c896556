//! Token Metadata – Rust SDK (client-side helpers)
//!
//! This crate provides:
//! - PDA helpers for the Metaplex metadata account of a mint
//! - An instruction builder for `CreateMetadataAccountV3` with client-side validation
//! - A decoder for existing metadata accounts
//! - The [`ChainClient`] seam used to talk to an RPC node, with an implementation over
//!   `solana-client`
//!
//! Recent blockhashes, signing and submission go through [`ChainClient`].

pub mod error;
pub mod rpc;

pub use error::{ChainError, ChainErrorKind};
pub use rpc::{ChainClient, RpcChainClient};

use mpl_token_metadata::{
    accounts::Metadata,
    instructions::CreateMetadataAccountV3Builder,
    types::{Creator, DataV2},
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

/// PDA seed for the metadata account.
pub const METADATA_SEED: &[u8] = b"metadata";

/// Maximum name length accepted by the metadata program.
pub const NAME_MAX_LEN: usize = 32;
/// Maximum symbol length accepted by the metadata program.
pub const SYMBOL_MAX_LEN: usize = 10;
/// Maximum URI length accepted by the metadata program.
pub const URI_MAX_LEN: usize = 200;

/// The Metaplex Token Metadata program id.
pub fn id() -> Pubkey {
    mpl_token_metadata::ID
}

/// Derive the metadata PDA for a mint under the given program.
///
/// Seeds are `["metadata", program_id, mint]`. The result depends only on its inputs, so the
/// workflow can locate the account before it exists.
pub fn find_metadata_pda_with_program(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[METADATA_SEED, program_id.as_ref(), mint.as_ref()],
        program_id,
    )
}

/// Thin client for building PDAs and instructions for the Token Metadata program.
///
/// The `program_id` must be the deployed Token Metadata program id.
#[derive(Clone, Debug)]
pub struct TokenMetadataClient {
    pub program_id: Pubkey,
}

impl Default for TokenMetadataClient {
    fn default() -> Self {
        Self::new(id())
    }
}

impl TokenMetadataClient {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Derive the metadata PDA for a given mint.
    pub fn metadata_pda(&self, mint: &Pubkey) -> Pubkey {
        let (pda, _bump) = find_metadata_pda_with_program(&self.program_id, mint);
        pda
    }

    /// Derive the metadata PDA for a given mint, with the bump.
    pub fn metadata_pda_and_bump(&self, mint: &Pubkey) -> (Pubkey, u8) {
        find_metadata_pda_with_program(&self.program_id, mint)
    }

    /// Build a CreateMetadataAccountV3 instruction.
    ///
    /// Accounts (strict order):
    /// - metadata_pda (writable)
    /// - mint (readonly)
    /// - mint_authority (readonly, signer)
    /// - payer (writable, signer)
    /// - update_authority (readonly, signer)
    /// - system_program (readonly)
    ///
    /// The authority is recorded as the only creator, verified, with a 100% share.
    /// Seller fee is zero; collection, uses and collection details are left empty.
    pub fn create_metadata_ix(&self, params: CreateMetadataParams) -> anyhow::Result<Instruction> {
        self.validate_metadata_fields(&params.name, &params.symbol, &params.uri)?;
        let metadata_pda = self.metadata_pda(&params.mint);

        let data = DataV2 {
            name: params.name,
            symbol: params.symbol,
            uri: params.uri,
            seller_fee_basis_points: 0,
            creators: Some(vec![Creator {
                address: params.authority,
                verified: true,
                share: 100,
            }]),
            collection: None,
            uses: None,
        };

        let mut ix = CreateMetadataAccountV3Builder::new()
            .metadata(metadata_pda)
            .mint(params.mint)
            .mint_authority(params.authority)
            .payer(params.payer)
            .update_authority(params.authority, true)
            .data(data)
            .is_mutable(params.is_mutable)
            .instruction();
        ix.program_id = self.program_id;
        Ok(ix)
    }
}

/// Parameters for the CreateMetadataAccountV3 instruction.
#[derive(Clone, Debug)]
pub struct CreateMetadataParams {
    /// Account that pays for the metadata PDA creation
    pub payer: Pubkey,
    /// Token mint the metadata is associated with
    pub mint: Pubkey,
    /// Signer that must match the mint authority; also becomes update authority and creator
    pub authority: Pubkey,
    /// Token name (<= NAME_MAX_LEN)
    pub name: String,
    /// Token symbol (<= SYMBOL_MAX_LEN)
    pub symbol: String,
    /// Off-chain JSON document URI (<= URI_MAX_LEN)
    pub uri: String,
    /// If false, metadata can never be updated
    pub is_mutable: bool,
}

/// Fields read back from an existing metadata account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataView {
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub is_mutable: bool,
}

/// Decode a metadata account's raw data.
///
/// The program pads strings with NUL bytes; they are stripped here.
pub fn decode_metadata(data: &[u8]) -> anyhow::Result<MetadataView> {
    let md = Metadata::from_bytes(data)
        .map_err(|e| anyhow::anyhow!("invalid metadata account data: {e}"))?;
    Ok(MetadataView {
        mint: md.mint,
        update_authority: md.update_authority,
        name: md.name.trim_end_matches('\0').to_string(),
        symbol: md.symbol.trim_end_matches('\0').to_string(),
        uri: md.uri.trim_end_matches('\0').to_string(),
        is_mutable: md.is_mutable,
    })
}

// === Validation helpers ===
impl TokenMetadataClient {
    fn validate_metadata_fields(&self, name: &str, symbol: &str, uri: &str) -> anyhow::Result<()> {
        anyhow::ensure!(!name.is_empty(), "name is empty");
        anyhow::ensure!(!symbol.is_empty(), "symbol is empty");
        anyhow::ensure!(!uri.is_empty(), "uri is empty");
        anyhow::ensure!(name.len() <= NAME_MAX_LEN, "name too long");
        anyhow::ensure!(symbol.len() <= SYMBOL_MAX_LEN, "symbol too long");
        anyhow::ensure!(uri.len() <= URI_MAX_LEN, "uri too long");
        Ok(())
    }
}
