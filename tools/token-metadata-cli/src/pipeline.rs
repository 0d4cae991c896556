//! The run as an explicit sequence of stages, plus the single place that records its outcome.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use solana_sdk::pubkey::Pubkey;
use token_metadata_sdk::{ChainClient, TokenMetadataClient};
use tracing::{error, info, warn};

use crate::compose::{self, MetadataDocument};
use crate::config::{DirectSettings, Runtime, Settings};
use crate::error::RunError;
use crate::link::{self, LinkReceipt};
use crate::record::{self, ErrorRecord, SuccessRecord};
use crate::upload::{self, GenericFile, Uploader};
use crate::wallet::{self, WalletIdentity};

/// Upload the image and metadata document, then link them to the mint.
pub async fn run(
    settings: &Settings,
    chain: &dyn ChainClient,
    uploader: &dyn Uploader,
) -> Result<SuccessRecord, RunError> {
    let runtime = &settings.runtime;
    let token = &settings.token;
    info!(network = %runtime.network, mint = %token.mint, "starting metadata run");

    let signer = wallet::load(&runtime.wallet_path)?;
    wallet::validate(chain, &signer, &token.mint).await?;

    let image = GenericFile::read(&token.image_path)?;
    let image_asset = upload::upload(uploader, &image, &settings.upload).await?;

    let document = compose::compose(token, &image_asset.uri, &signer.pubkey());
    let metadata_file = document.to_file()?;
    let metadata_asset = upload::upload(uploader, &metadata_file, &settings.upload).await?;

    let client = TokenMetadataClient::default();
    let receipt = link::link(
        chain,
        &client,
        &token.link_target(),
        &metadata_asset.uri,
        &signer,
    )
    .await?;

    Ok(success_record(
        runtime,
        &signer,
        &token.mint,
        &receipt,
        Uris {
            image: image_asset.uri,
            metadata: metadata_asset.uri,
        },
        Some(document),
    ))
}

/// Link an already hosted metadata URI to the mint; nothing is uploaded.
pub async fn set_metadata(
    settings: &DirectSettings,
    chain: &dyn ChainClient,
) -> Result<SuccessRecord, RunError> {
    let runtime = &settings.runtime;
    let target = &settings.target;
    info!(network = %runtime.network, mint = %target.mint, uri = %settings.uri, "setting metadata");

    let signer = wallet::load(&runtime.wallet_path)?;
    wallet::validate(chain, &signer, &target.mint).await?;

    let client = TokenMetadataClient::default();
    let receipt = link::link(chain, &client, target, &settings.uri, &signer).await?;

    Ok(success_record(
        runtime,
        &signer,
        &target.mint,
        &receipt,
        Uris {
            image: String::new(),
            metadata: settings.uri.clone(),
        },
        None,
    ))
}

struct Uris {
    image: String,
    metadata: String,
}

fn success_record(
    runtime: &Runtime,
    signer: &WalletIdentity,
    mint: &Pubkey,
    receipt: &LinkReceipt,
    uris: Uris,
    metadata: Option<MetadataDocument>,
) -> SuccessRecord {
    let network = runtime.network;
    SuccessRecord {
        success: true,
        timestamp: record::now(),
        network,
        mint_address: mint.to_string(),
        wallet_address: signer.pubkey().to_string(),
        metadata_account: receipt.metadata_account.to_string(),
        image_uri: uris.image,
        metadata_uri: uris.metadata,
        signature: receipt.signature.to_string(),
        explorer_url: network.explorer_address_url(mint),
        transaction_url: network.explorer_tx_url(&receipt.signature),
        metadata,
    }
}

/// A run after its record has been written.
#[derive(Debug)]
pub enum Recorded {
    Success {
        path: PathBuf,
        record: SuccessRecord,
    },
    Failure {
        path: PathBuf,
        record: ErrorRecord,
        error: anyhow::Error,
    },
}

impl Recorded {
    pub fn is_success(&self) -> bool {
        matches!(self, Recorded::Success { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Recorded::Success { path, .. } | Recorded::Failure { path, .. } => path,
        }
    }
}

/// Write exactly one record for the outcome: `results.json` or `error.json` in `out_dir`.
///
/// The returned error only reports a failure to write the record itself.
pub fn finish(
    out_dir: &Path,
    outcome: Result<SuccessRecord, RunError>,
) -> anyhow::Result<Recorded> {
    match outcome {
        Ok(record) => {
            let path = record::write_success(out_dir, &record)
                .context("failed to write results record")?;
            info!(path = %path.display(), signature = %record.signature, "run succeeded");
            Ok(Recorded::Success { path, record })
        }
        Err(e) => {
            let stage = e.stage();
            let hint = e.hint();
            let error = anyhow::Error::new(e);
            error!(stage, "run failed: {error:#}");
            if let Some(hint) = hint {
                warn!("hint: {hint}");
            }
            let record = ErrorRecord::new(&error, hint);
            let path =
                record::write_error(out_dir, &record).context("failed to write error record")?;
            Ok(Recorded::Failure {
                path,
                record,
                error,
            })
        }
    }
}
