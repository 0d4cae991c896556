#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use token_metadata_cli::{
    config::{MetadataSection, Overrides, TokenFile, UploadSection},
    upload::{GenericFile, Uploader},
};
use token_metadata_sdk::ChainClient;

pub const SIGNATURE_BYTES: [u8; 64] = [7; 64];

/// In-memory chain: accounts by address, a fixed balance, and a scripted send result.
pub struct MockChain {
    pub balance: u64,
    pub accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    pub send_error: Option<String>,
    pub rpc_error: Option<String>,
    pub sent: Mutex<Vec<Instruction>>,
    pub sends: AtomicUsize,
}

impl MockChain {
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            accounts: Mutex::new(HashMap::new()),
            send_error: None,
            rpc_error: None,
            sent: Mutex::new(Vec::new()),
            sends: AtomicUsize::new(0),
        }
    }

    pub fn with_mint(self, mint: Pubkey) -> Self {
        self.accounts.lock().unwrap().insert(mint, vec![0; 82]);
        self
    }

    pub fn with_account(self, address: Pubkey, data: Vec<u8>) -> Self {
        self.accounts.lock().unwrap().insert(address, data);
        self
    }

    pub fn failing_send(mut self, message: &str) -> Self {
        self.send_error = Some(message.to_string());
        self
    }

    pub fn failing_rpc(mut self, message: &str) -> Self {
        self.rpc_error = Some(message.to_string());
        self
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    fn check_rpc(&self) -> anyhow::Result<()> {
        match &self.rpc_error {
            Some(msg) => Err(anyhow::anyhow!(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_balance(&self, _pubkey: &Pubkey) -> anyhow::Result<u64> {
        self.check_rpc()?;
        Ok(self.balance)
    }

    async fn get_account_data(&self, pubkey: &Pubkey) -> anyhow::Result<Option<Vec<u8>>> {
        self.check_rpc()?;
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_slot(&self) -> anyhow::Result<u64> {
        self.check_rpc()?;
        Ok(1_234)
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        _payer: &Keypair,
    ) -> anyhow::Result<Signature> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .extend(instructions.iter().cloned());
        match &self.send_error {
            Some(msg) => Err(anyhow::anyhow!(msg.clone())),
            None => Ok(Signature::from(SIGNATURE_BYTES)),
        }
    }
}

/// Uploader that fails its first `failures` calls, then returns a URI derived from the file name.
pub struct MockUploader {
    failures: usize,
    attempts: Mutex<Vec<(String, tokio::time::Instant)>>,
}

impl MockUploader {
    pub fn succeeding() -> Self {
        Self::failing(0)
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<(String, tokio::time::Instant)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload(&self, file: &GenericFile) -> anyhow::Result<String> {
        let n = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push((file.file_name.clone(), tokio::time::Instant::now()));
            attempts.len()
        };
        if n <= self.failures {
            anyhow::bail!("upstream unavailable (attempt {n})");
        }
        Ok(format!("https://gateway.test/ipfs/{}-{n}", file.file_name))
    }
}

/// Write a fresh keypair as a 64-value JSON array.
pub fn write_wallet(dir: &Path) -> (PathBuf, Pubkey) {
    let keypair = Keypair::new();
    let path = dir.join("keypair.json");
    let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
    std::fs::write(&path, json).unwrap();
    (path, keypair.pubkey())
}

pub fn write_image(dir: &Path, size: usize) -> PathBuf {
    let path = dir.join("image.png");
    std::fs::write(&path, vec![0xAB; size]).unwrap();
    path
}

pub fn token_file(mint: &Pubkey, image: &Path) -> TokenFile {
    TokenFile {
        mint_address: mint.to_string(),
        metadata: MetadataSection {
            name: "My Token Name".to_string(),
            symbol: "MTN".to_string(),
            description: "A token used in tests".to_string(),
            image_path: image.display().to_string(),
            external_url: "https://example.com".to_string(),
        },
        upload: UploadSection::default(),
    }
}

pub fn overrides(dir: &Path, wallet: &Path) -> Overrides {
    Overrides {
        wallet_path: wallet.to_path_buf(),
        out_dir: dir.to_path_buf(),
        ..Overrides::default()
    }
}
