//! Token configuration: the static token file, overrides from flags/env, and validation.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use token_metadata_sdk::{NAME_MAX_LEN, SYMBOL_MAX_LEN};

use crate::upload::{StorageConfig, UploadPolicy};

pub const NAME_MAX_CHARS: usize = 32;
pub const SYMBOL_MAX_CHARS: usize = 10;

pub const DEFAULT_IMAGE_PATH: &str = "./assets/image.png";
pub const DEFAULT_IMAGE_MAX_SIZE: u64 = 2 * 1024 * 1024;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "invalid configuration:{}",
        .0.iter().map(|v| format!("\n  - {v}")).collect::<String>()
    )]
    Invalid(Vec<String>),
}

/// Solana cluster the run targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    #[value(alias = "mainnet")]
    MainnetBeta,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::MainnetBeta => "mainnet-beta",
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    /// IPFS API endpoint used when none is configured.
    pub fn default_upload_endpoint(self) -> &'static str {
        match self {
            Network::Devnet | Network::Testnet => "http://127.0.0.1:5001",
            Network::MainnetBeta => "https://ipfs.infura.io:5001",
        }
    }

    pub fn explorer_address_url(self, address: &impl fmt::Display) -> String {
        format!(
            "https://explorer.solana.com/address/{address}{}",
            self.cluster_query()
        )
    }

    pub fn explorer_tx_url(self, signature: &impl fmt::Display) -> String {
        format!(
            "https://explorer.solana.com/tx/{signature}{}",
            self.cluster_query()
        )
    }

    fn cluster_query(self) -> String {
        match self {
            Network::MainnetBeta => String::new(),
            other => format!("?cluster={}", other.as_str()),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === Token file ===

/// On-disk token configuration (`token.json`).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenFile {
    pub mint_address: String,
    pub metadata: MetadataSection,
    pub upload: UploadSection,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataSection {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image_path: String,
    #[serde(alias = "external_url")]
    pub external_url: String,
}

impl Default for MetadataSection {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            description: String::new(),
            image_path: DEFAULT_IMAGE_PATH.to_string(),
            external_url: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadSection {
    /// Bytes
    pub image_max_size: u64,
    pub retry_attempts: u32,
    /// Milliseconds
    pub timeout: u64,
    /// Milliseconds between attempts
    pub retry_delay: u64,
}

impl Default for UploadSection {
    fn default() -> Self {
        Self {
            image_max_size: DEFAULT_IMAGE_MAX_SIZE,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT_MS,
            retry_delay: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl TokenFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// === Resolved settings ===

/// Values taken from flags or the environment rather than the token file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub network: Network,
    pub rpc_url: Option<String>,
    pub wallet_path: PathBuf,
    pub mint_address: Option<String>,
    pub upload_endpoint: Option<String>,
    pub upload_gateway: Option<String>,
    pub upload_api_key: Option<String>,
    pub out_dir: PathBuf,
}

/// Where the run talks to and writes to.
#[derive(Clone, Debug)]
pub struct Runtime {
    pub network: Network,
    pub rpc_url: String,
    pub wallet_path: PathBuf,
    pub out_dir: PathBuf,
}

/// What gets written into the on-chain metadata account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkTarget {
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
}

/// Validated token configuration.
#[derive(Clone, Debug)]
pub struct TokenConfig {
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image_path: PathBuf,
    pub external_url: Option<String>,
}

impl TokenConfig {
    pub fn link_target(&self) -> LinkTarget {
        LinkTarget {
            mint: self.mint,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
        }
    }
}

/// Everything the full upload-and-link run needs, built once at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    pub runtime: Runtime,
    pub token: TokenConfig,
    pub upload: UploadPolicy,
    pub storage: StorageConfig,
}

/// Inputs of the direct `set` flow: the metadata URI already exists.
#[derive(Clone, Debug, Default)]
pub struct DirectArgs {
    pub mint_address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub uri: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DirectSettings {
    pub runtime: Runtime,
    pub target: LinkTarget,
    pub uri: String,
}

impl Overrides {
    /// Network endpoints and paths, with per-network defaults filled in.
    pub fn runtime(&self) -> Runtime {
        Runtime {
            network: self.network,
            rpc_url: non_empty(self.rpc_url.as_deref())
                .unwrap_or(self.network.default_rpc_url())
                .to_string(),
            wallet_path: self.wallet_path.clone(),
            out_dir: self.out_dir.clone(),
        }
    }

    fn storage(&self) -> StorageConfig {
        StorageConfig {
            endpoint: non_empty(self.upload_endpoint.as_deref())
                .unwrap_or(self.network.default_upload_endpoint())
                .to_string(),
            gateway: non_empty(self.upload_gateway.as_deref())
                .unwrap_or(StorageConfig::DEFAULT_GATEWAY)
                .to_string(),
            api_key: non_empty(self.upload_api_key.as_deref()).map(str::to_string),
        }
    }
}

/// Merge the token file with overrides and validate the result.
///
/// Every rule is checked; all violations are reported together.
pub fn resolve(file: TokenFile, overrides: &Overrides) -> Result<Settings, ConfigError> {
    let mut violations = Vec::new();

    let mint_raw = non_empty(overrides.mint_address.as_deref())
        .unwrap_or(file.mint_address.as_str())
        .trim()
        .to_string();
    let mint = check_mint(&mint_raw, "mintAddress", &mut violations);
    let md = file.metadata;
    check_len(&md.name, "metadata.name", NAME_MAX_CHARS, NAME_MAX_LEN, &mut violations);
    check_len(&md.symbol, "metadata.symbol", SYMBOL_MAX_CHARS, SYMBOL_MAX_LEN, &mut violations);

    let image_path = PathBuf::from(md.image_path.trim());
    if image_path.as_os_str().is_empty() {
        violations.push("metadata.imagePath is not set".to_string());
    } else if !image_path.is_file() {
        violations.push(format!("image file not found: {}", image_path.display()));
    }

    if file.upload.retry_attempts == 0 {
        violations.push("upload.retryAttempts must be at least 1".to_string());
    }

    let mint = match mint {
        Some(mint) if violations.is_empty() => mint,
        _ => return Err(ConfigError::Invalid(violations)),
    };

    Ok(Settings {
        runtime: overrides.runtime(),
        token: TokenConfig {
            mint,
            name: md.name,
            symbol: md.symbol,
            description: md.description,
            image_path,
            external_url: non_empty(Some(md.external_url.as_str())).map(str::to_string),
        },
        upload: UploadPolicy::from(&file.upload),
        storage: overrides.storage(),
    })
}

/// Validate the inputs of the direct `set` flow.
pub fn resolve_direct(args: DirectArgs, overrides: &Overrides) -> Result<DirectSettings, ConfigError> {
    let mut violations = Vec::new();

    let mint_raw = args.mint_address.unwrap_or_default();
    let mint = check_mint(mint_raw.trim(), "TOKEN_MINT_ADDRESS", &mut violations);
    let name = args.name.unwrap_or_default();
    let symbol = args.symbol.unwrap_or_default();
    let uri = args.uri.unwrap_or_default().trim().to_string();
    check_len(&name, "TOKEN_NAME", NAME_MAX_CHARS, NAME_MAX_LEN, &mut violations);
    check_len(&symbol, "TOKEN_SYMBOL", SYMBOL_MAX_CHARS, SYMBOL_MAX_LEN, &mut violations);
    if uri.is_empty() {
        violations.push("TOKEN_URI is not set".to_string());
    }

    let mint = match mint {
        Some(mint) if violations.is_empty() => mint,
        _ => return Err(ConfigError::Invalid(violations)),
    };

    Ok(DirectSettings {
        runtime: overrides.runtime(),
        target: LinkTarget { mint, name, symbol },
        uri,
    })
}

fn check_mint(raw: &str, field: &str, violations: &mut Vec<String>) -> Option<Pubkey> {
    if raw.is_empty() {
        violations.push(format!("{field} is not set"));
        return None;
    }
    match Pubkey::from_str(raw) {
        Ok(pk) => Some(pk),
        Err(_) => {
            violations.push(format!("{field} `{raw}` is not a valid address"));
            None
        }
    }
}

/// The on-chain limit is in UTF-8 bytes, so non-ASCII text hits it before the character limit.
fn check_len(
    value: &str,
    field: &str,
    max_chars: usize,
    max_bytes: usize,
    violations: &mut Vec<String>,
) {
    let chars = value.chars().count();
    let bytes = value.len();
    if value.trim().is_empty() {
        violations.push(format!("{field} is not set"));
    } else if chars > max_chars {
        violations.push(format!(
            "{field} is too long ({chars} characters, max {max_chars})"
        ));
    } else if bytes > max_bytes {
        violations.push(format!(
            "{field} is too long ({bytes} bytes when encoded, max {max_bytes})"
        ));
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
