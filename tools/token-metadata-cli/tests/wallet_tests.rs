mod common;

use solana_sdk::pubkey::Pubkey;
use token_metadata_cli::wallet::{self, WalletError, LOW_BALANCE_LAMPORTS};

use common::{write_wallet, MockChain};

#[test]
fn loads_a_64_byte_keypair_file() {
    let dir = tempfile::tempdir().unwrap();
    let (path, pubkey) = write_wallet(dir.path());

    let identity = wallet::load(&path).unwrap();
    assert_eq!(identity.pubkey(), pubkey);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = wallet::load(&dir.path().join("nope.json")).err().unwrap();
    assert!(matches!(err, WalletError::NotFound(_)));
}

#[test]
fn rejects_anything_but_a_64_value_byte_array() {
    let dir = tempfile::tempdir().unwrap();
    let cases = vec![
        "not json".to_string(),
        "{}".to_string(),
        "\"5Kd3NBUAdUnhyzenEwVLy9pBKxSwXvE9FMPyR4UKZvpe\"".to_string(),
        serde_json::to_string(&vec![1u8; 63]).unwrap(),
        serde_json::to_string(&vec![1u8; 65]).unwrap(),
        serde_json::to_string(&vec![256u32; 64]).unwrap(),
        serde_json::to_string(&vec![-1i32; 64]).unwrap(),
    ];
    for (i, raw) in cases.iter().enumerate() {
        let path = dir.path().join(format!("wallet-{i}.json"));
        std::fs::write(&path, raw).unwrap();
        let err = wallet::load(&path).err().unwrap();
        assert!(
            matches!(err, WalletError::Malformed { .. }),
            "case {i}: {err}"
        );
    }
}

#[test]
fn parse_secret_key_reports_length() {
    let reason = wallet::parse_secret_key("[1,2,3]").unwrap_err();
    assert_eq!(reason, "found 3 values");
}

#[tokio::test]
async fn validate_passes_with_funded_wallet_and_existing_mint() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_wallet(dir.path());
    let identity = wallet::load(&path).unwrap();
    let mint = Pubkey::new_unique();
    let chain = MockChain::new(2_000_000_000).with_mint(mint);

    let status = wallet::validate(&chain, &identity, &mint).await.unwrap();
    assert_eq!(status.balance_lamports, 2_000_000_000);
    assert!(!status.low_balance);
}

#[tokio::test]
async fn low_balance_is_only_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_wallet(dir.path());
    let identity = wallet::load(&path).unwrap();
    let mint = Pubkey::new_unique();
    let chain = MockChain::new(LOW_BALANCE_LAMPORTS - 1).with_mint(mint);

    let status = wallet::validate(&chain, &identity, &mint).await.unwrap();
    assert!(status.low_balance);
}

#[tokio::test]
async fn missing_mint_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_wallet(dir.path());
    let identity = wallet::load(&path).unwrap();
    let mint = Pubkey::new_unique();
    let chain = MockChain::new(2_000_000_000);

    let err = wallet::validate(&chain, &identity, &mint).await.unwrap_err();
    assert!(matches!(err, WalletError::TokenNotFound(m) if m == mint));
}

#[tokio::test]
async fn rpc_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_wallet(dir.path());
    let identity = wallet::load(&path).unwrap();
    let chain = MockChain::new(0).failing_rpc("connection refused");

    let err = wallet::validate(&chain, &identity, &Pubkey::new_unique())
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Rpc(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn sol_amounts_render_with_four_decimals() {
    assert_eq!(wallet::format_sol(1_500_000_000), "1.5000 SOL");
    assert_eq!(wallet::format_sol(LOW_BALANCE_LAMPORTS), "0.0100 SOL");
    assert_eq!(wallet::format_sol(0), "0.0000 SOL");
}
