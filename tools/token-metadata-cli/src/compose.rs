//! Off-chain metadata JSON document.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::config::TokenConfig;
use crate::upload::GenericFile;

pub const METADATA_FILE_NAME: &str = "metadata.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub external_url: Option<String>,
    pub attributes: Vec<Attribute>,
    pub properties: Properties,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// "ft" for fungible tokens
    pub category: String,
    pub creators: Vec<CreatorShare>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorShare {
    pub address: String,
    pub verified: bool,
    pub share: u8,
}

fn attribute(trait_type: &str, value: &str) -> Attribute {
    Attribute {
        trait_type: trait_type.to_string(),
        value: value.to_string(),
    }
}

/// Build the metadata document for `token`.
///
/// Pure: identical inputs give identical documents and identical serialized bytes.
pub fn compose(token: &TokenConfig, image_uri: &str, creator: &Pubkey) -> MetadataDocument {
    MetadataDocument {
        name: token.name.clone(),
        symbol: token.symbol.clone(),
        description: token.description.clone(),
        image: image_uri.to_string(),
        external_url: token.external_url.clone().filter(|u| !u.is_empty()),
        attributes: vec![
            attribute("Type", "SPL Token"),
            attribute("Network", "Solana"),
            attribute("Standard", "Metaplex"),
        ],
        properties: Properties {
            category: "ft".to_string(),
            creators: vec![CreatorShare {
                address: creator.to_string(),
                verified: true,
                share: 100,
            }],
        },
    }
}

impl MetadataDocument {
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn to_file(&self) -> serde_json::Result<GenericFile> {
        Ok(GenericFile::new(
            self.to_json_bytes()?,
            METADATA_FILE_NAME,
            "application/json",
        ))
    }
}
