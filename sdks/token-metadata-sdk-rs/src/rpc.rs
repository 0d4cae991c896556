//! RPC seam between the workflow and a Solana node.

use anyhow::Context as _;
use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tracing::debug;

/// Network operations the workflow needs. Each call is awaited to completion before the
/// next one starts.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native balance in lamports.
    async fn get_balance(&self, pubkey: &Pubkey) -> anyhow::Result<u64>;

    /// Raw account data, or `None` when the account does not exist.
    async fn get_account_data(&self, pubkey: &Pubkey) -> anyhow::Result<Option<Vec<u8>>>;

    /// Current slot, used as a liveness probe.
    async fn get_slot(&self) -> anyhow::Result<u64>;

    /// Sign `instructions` into one transaction paid by `signer`, submit it and wait for
    /// confirmation.
    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        signer: &Keypair,
    ) -> anyhow::Result<Signature>;

    async fn account_exists(&self, pubkey: &Pubkey) -> anyhow::Result<bool> {
        Ok(self.get_account_data(pubkey).await?.is_some())
    }
}

/// [`ChainClient`] over the nonblocking `solana-client` RPC client, at `confirmed` commitment.
pub struct RpcChainClient {
    rpc: RpcClient,
}

impl RpcChainClient {
    pub fn new(url: &str) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(url.to_string(), CommitmentConfig::confirmed()),
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_balance(&self, pubkey: &Pubkey) -> anyhow::Result<u64> {
        self.rpc
            .get_balance(pubkey)
            .await
            .with_context(|| format!("get_balance {pubkey}"))
    }

    async fn get_account_data(&self, pubkey: &Pubkey) -> anyhow::Result<Option<Vec<u8>>> {
        let res = self
            .rpc
            .get_account_with_commitment(pubkey, self.rpc.commitment())
            .await
            .with_context(|| format!("get_account {pubkey}"))?;
        Ok(res.value.map(|account| account.data))
    }

    async fn get_slot(&self) -> anyhow::Result<u64> {
        self.rpc.get_slot().await.context("get_slot")
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        signer: &Keypair,
    ) -> anyhow::Result<Signature> {
        let recent = self
            .rpc
            .get_latest_blockhash()
            .await
            .context("get_latest_blockhash")?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&signer.pubkey()),
            &[signer],
            recent,
        );
        debug!(signature = %tx.signatures[0], "submitting transaction");

        self.rpc
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|e| {
                let logs = preflight_logs(&e);
                if logs.is_empty() {
                    return anyhow::Error::new(e);
                }
                let summary = format!("{e}; logs:\n\t{}", logs.join("\n\t"));
                anyhow::Error::new(e).context(summary)
            })
    }
}

/// Program logs from a failed preflight simulation, if the node returned any.
fn preflight_logs(err: &ClientError) -> Vec<String> {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
            ..
        }) => sim.logs.clone().unwrap_or_default(),
        _ => Vec::new(),
    }
}
