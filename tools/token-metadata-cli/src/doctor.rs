//! Environment diagnostics for the `doctor` subcommand.

use std::path::Path;

use serde::Serialize;
use token_metadata_sdk::ChainClient;

use crate::config::{self, Network, Overrides, TokenFile};
use crate::wallet::{self, LOW_BALANCE_LAMPORTS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Debug, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Pass,
            detail: detail.into(),
        }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warn,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Fail,
            detail: detail.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub version: &'static str,
    pub network: Network,
    pub ok: bool,
    pub checks: Vec<Check>,
}

impl Report {
    pub fn new(network: Network, checks: Vec<Check>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            network,
            ok: checks.iter().all(|c| c.status != CheckStatus::Fail),
            checks,
        }
    }
}

/// Checks that need no network access.
pub fn offline_checks(config_path: &Path, overrides: &Overrides) -> Vec<Check> {
    let mut checks = vec![Check::pass("version", env!("CARGO_PKG_VERSION"))];
    checks.push(wallet_file_check(&overrides.wallet_path));

    let file = match TokenFile::load(config_path) {
        Ok(file) => file,
        Err(e) => {
            checks.push(Check::fail("config", e.to_string()));
            return checks;
        }
    };

    let mint_raw = overrides
        .mint_address
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| file.mint_address.clone());
    let mint_len = mint_raw.trim().len();
    if mint_len > 0 && !(43..=44).contains(&mint_len) {
        checks.push(Check::warn(
            "mint_length",
            format!("mint address is {mint_len} characters; most addresses are 43 or 44"),
        ));
    }

    checks.push(image_check(&file));

    match config::resolve(file, overrides) {
        Ok(settings) => checks.push(Check::pass(
            "config",
            format!(
                "{} ({}) on {}",
                settings.token.name, settings.token.symbol, settings.token.mint
            ),
        )),
        Err(e) => checks.push(Check::fail("config", e.to_string())),
    }
    checks
}

fn wallet_file_check(path: &Path) -> Check {
    if !path.is_file() {
        return Check::fail(
            "wallet_file",
            format!("wallet file not found: {}", path.display()),
        );
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => return Check::fail("wallet_file", format!("{}: {e}", path.display())),
    };
    match wallet::parse_secret_key(&raw) {
        Ok(_) => Check::pass("wallet_file", path.display().to_string()),
        Err(reason) => Check::fail(
            "wallet_file",
            format!(
                "{} is not a {}-element byte array: {reason}",
                path.display(),
                wallet::SECRET_KEY_LEN
            ),
        ),
    }
}

fn image_check(file: &TokenFile) -> Check {
    let path = Path::new(file.metadata.image_path.trim());
    let max = file.upload.image_max_size;
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > max => Check::fail(
            "image",
            format!(
                "{} is {} bytes, over the {max} byte limit",
                path.display(),
                meta.len()
            ),
        ),
        Ok(meta) => Check::pass(
            "image",
            format!(
                "{} ({:.1} KB of {:.1} KB allowed)",
                path.display(),
                meta.len() as f64 / 1024.0,
                max as f64 / 1024.0
            ),
        ),
        Err(e) => Check::fail("image", format!("{}: {e}", path.display())),
    }
}

/// RPC reachability and wallet balance.
pub async fn online_checks(
    chain: &dyn ChainClient,
    wallet_path: &Path,
    network: Network,
) -> Vec<Check> {
    let mut checks = Vec::new();
    match chain.get_slot().await {
        Ok(slot) => checks.push(Check::pass("rpc", format!("current slot {slot}"))),
        Err(e) => {
            checks.push(Check::fail("rpc", format!("{e:#}")));
            return checks;
        }
    }

    let identity = match wallet::load(wallet_path) {
        Ok(identity) => identity,
        Err(e) => {
            checks.push(Check::fail("balance", e.to_string()));
            return checks;
        }
    };
    let wallet = identity.pubkey();
    let check = match chain.get_balance(&wallet).await {
        Ok(0) if network == Network::Devnet => Check::fail(
            "balance",
            format!("{wallet} has no SOL; request one with `solana airdrop 1 {wallet} --url devnet`"),
        ),
        Ok(0) => Check::fail("balance", format!("{wallet} has no SOL")),
        Ok(lamports) if lamports < LOW_BALANCE_LAMPORTS => Check::warn(
            "balance",
            format!("low balance: {}", wallet::format_sol(lamports)),
        ),
        Ok(lamports) => Check::pass("balance", wallet::format_sol(lamports)),
        Err(e) => Check::fail("balance", format!("{e:#}")),
    };
    checks.push(check);
    checks
}
