use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use token_metadata_sdk::{RpcChainClient, TokenMetadataClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_metadata_cli::{
    config::{self, DirectArgs, Network, Overrides, TokenFile},
    doctor,
    pipeline::{self, Recorded},
    record::SuccessRecord,
    show,
    upload::IpfsUploader,
    RunError,
};

#[derive(Parser, Debug)]
#[command(
    name = "token-metadata",
    version,
    about = "Attach Metaplex metadata to an existing SPL token",
    long_about = "Uploads token art and a metadata document, then creates the token's on-chain metadata account.\nJSON is always printed to stdout; logs/status to stderr."
)]
struct Cli {
    /// Solana cluster
    #[arg(
        env = "SOLANA_NETWORK",
        global = true,
        long,
        value_enum,
        default_value_t = Network::Devnet
    )]
    network: Network,

    /// RPC endpoint URL (defaults to the cluster's public endpoint)
    #[arg(env = "RPC_URL", global = true, long)]
    rpc_url: Option<String>,

    /// Wallet keypair file (JSON array of 64 bytes)
    #[arg(
        env = "WALLET_PATH",
        global = true,
        long = "wallet",
        default_value = "./wallets/keypair.json"
    )]
    wallet_path: PathBuf,

    /// Token mint address; overrides `mintAddress` in the config file
    #[arg(env = "TOKEN_MINT_ADDRESS", global = true, long)]
    mint: Option<String>,

    /// Token config file
    #[arg(env = "TOKEN_CONFIG", global = true, long, default_value = "token.json")]
    config: PathBuf,

    /// Directory receiving results.json / error.json
    #[arg(global = true, long, default_value = ".")]
    out_dir: PathBuf,

    /// IPFS HTTP API endpoint (defaults per network)
    #[arg(env = "UPLOAD_ENDPOINT", global = true, long)]
    upload_endpoint: Option<String>,

    /// Gateway used to build asset URIs
    #[arg(env = "UPLOAD_GATEWAY", global = true, long)]
    upload_gateway: Option<String>,

    /// Bearer key for the upload endpoint
    #[arg(env = "UPLOAD_API_KEY", global = true, long, hide_env_values = true)]
    upload_api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload image + metadata and create the metadata account (default)
    #[command(
        alias = "create",
        about = "Upload image and metadata, then create the on-chain metadata account"
    )]
    Run,

    /// Create the metadata account from an already hosted metadata URI
    #[command(about = "Create the metadata account for an existing metadata URI (no upload)")]
    Set {
        #[arg(env = "TOKEN_NAME", long)]
        name: Option<String>,
        #[arg(env = "TOKEN_SYMBOL", long)]
        symbol: Option<String>,
        #[arg(env = "TOKEN_URI", long)]
        uri: Option<String>,
    },

    /// Show the metadata account of a mint
    #[command(alias = "inspect", about = "Show the metadata account of --mint, if present")]
    Show,

    /// Check wallet, config and image; `--online` also checks RPC and balance
    #[command(alias = "check", about = "Diagnose the local setup")]
    Doctor {
        #[arg(long)]
        online: bool,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            network: self.network,
            rpc_url: self.rpc_url.clone(),
            wallet_path: self.wallet_path.clone(),
            mint_address: self.mint.clone(),
            upload_endpoint: self.upload_endpoint.clone(),
            upload_gateway: self.upload_gateway.clone(),
            upload_api_key: self.upload_api_key.clone(),
            out_dir: self.out_dir.clone(),
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_metadata_cli=info,token_metadata_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging();

    let overrides = args.overrides();
    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let outcome = run_from_config(&args.config, &overrides).await;
            report(&overrides.out_dir, outcome)
        }
        Commands::Set { name, symbol, uri } => {
            let direct = DirectArgs {
                mint_address: args.mint.clone(),
                name,
                symbol,
                uri,
            };
            let outcome = set_direct(direct, &overrides).await;
            report(&overrides.out_dir, outcome)
        }
        Commands::Show => {
            let mint = args
                .mint
                .as_deref()
                .context("--mint or TOKEN_MINT_ADDRESS required")?;
            let mint = Pubkey::from_str(mint.trim()).context("invalid mint address")?;
            let runtime = overrides.runtime();
            let chain = RpcChainClient::new(&runtime.rpc_url);
            let report = show::show(&chain, &TokenMetadataClient::default(), &mint).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Doctor { online } => {
            let mut checks = doctor::offline_checks(&args.config, &overrides);
            if online {
                let runtime = overrides.runtime();
                let chain = RpcChainClient::new(&runtime.rpc_url);
                checks.extend(
                    doctor::online_checks(&chain, &runtime.wallet_path, runtime.network).await,
                );
            }
            let report = doctor::Report::new(overrides.network, checks);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.ok {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn run_from_config(
    config_path: &Path,
    overrides: &Overrides,
) -> Result<SuccessRecord, RunError> {
    let file = TokenFile::load(config_path)?;
    let settings = config::resolve(file, overrides)?;
    let chain = RpcChainClient::new(&settings.runtime.rpc_url);
    let uploader = IpfsUploader::new(settings.storage.clone(), settings.upload.timeout)?;
    pipeline::run(&settings, &chain, &uploader).await
}

async fn set_direct(direct: DirectArgs, overrides: &Overrides) -> Result<SuccessRecord, RunError> {
    let settings = config::resolve_direct(direct, overrides)?;
    let chain = RpcChainClient::new(&settings.runtime.rpc_url);
    pipeline::set_metadata(&settings, &chain).await
}

/// The one place that turns an outcome into a record, stdout JSON and an exit status.
fn report(out_dir: &Path, outcome: Result<SuccessRecord, RunError>) -> anyhow::Result<()> {
    match pipeline::finish(out_dir, outcome)? {
        Recorded::Success { path, record } => {
            info!(explorer = %record.explorer_url, "record written to {}", path.display());
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Recorded::Failure { path, record, .. } => {
            info!("error record written to {}", path.display());
            println!("{}", serde_json::to_string_pretty(&record)?);
            std::process::exit(1);
        }
    }
}
