//! The run record: `results.json` on success, `error.json` on failure.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::compose::MetadataDocument;
use crate::config::Network;

pub const RESULTS_FILE: &str = "results.json";
pub const ERROR_FILE: &str = "error.json";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRecord {
    pub success: bool,
    pub timestamp: String,
    pub network: Network,
    pub mint_address: String,
    pub wallet_address: String,
    pub metadata_account: String,
    pub image_uri: String,
    pub metadata_uri: String,
    pub signature: String,
    pub explorer_url: String,
    pub transaction_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataDocument>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorRecord {
    pub success: bool,
    pub timestamp: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Message followed by every cause in the chain
    pub stack: String,
}

impl ErrorRecord {
    pub fn new(err: &anyhow::Error, hint: Option<&str>) -> Self {
        Self {
            success: false,
            timestamp: now(),
            error: err.to_string(),
            hint: hint.map(str::to_string),
            stack: format!("{err:?}"),
        }
    }
}

pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write `results.json` into `dir`, replacing any previous file and removing a stale
/// `error.json`.
pub fn write_success(dir: &Path, record: &SuccessRecord) -> anyhow::Result<PathBuf> {
    let path = write_json(&dir.join(RESULTS_FILE), record)?;
    remove_stale(&dir.join(ERROR_FILE))?;
    Ok(path)
}

/// Write `error.json` into `dir`, replacing any previous file and removing a stale
/// `results.json`.
pub fn write_error(dir: &Path, record: &ErrorRecord) -> anyhow::Result<PathBuf> {
    let path = write_json(&dir.join(ERROR_FILE), record)?;
    remove_stale(&dir.join(RESULTS_FILE))?;
    Ok(path)
}

fn remove_stale(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> anyhow::Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(path.to_path_buf())
}
