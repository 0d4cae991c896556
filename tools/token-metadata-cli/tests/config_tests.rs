mod common;

use std::time::Duration;

use clap::ValueEnum;
use serial_test::serial;
use solana_sdk::pubkey::Pubkey;
use token_metadata_cli::config::{
    self, ConfigError, DirectArgs, Network, Overrides, TokenFile, DEFAULT_IMAGE_MAX_SIZE,
};

use common::{overrides, token_file, write_image};

fn violations(err: ConfigError) -> Vec<String> {
    match err {
        ConfigError::Invalid(v) => v,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn resolve_fills_documented_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), 1024);
    let mint = Pubkey::new_unique();
    let wallet = dir.path().join("keypair.json");

    let settings = config::resolve(token_file(&mint, &image), &overrides(dir.path(), &wallet))
        .unwrap();

    assert_eq!(settings.token.mint, mint);
    assert_eq!(settings.token.name, "My Token Name");
    assert_eq!(settings.token.external_url.as_deref(), Some("https://example.com"));
    assert_eq!(settings.upload.max_image_bytes, DEFAULT_IMAGE_MAX_SIZE);
    assert_eq!(settings.upload.retry_attempts, 3);
    assert_eq!(settings.upload.timeout, Duration::from_secs(30));
    assert_eq!(settings.upload.retry_delay, Duration::from_millis(2000));
    assert_eq!(settings.runtime.network, Network::Devnet);
    assert_eq!(settings.runtime.rpc_url, "https://api.devnet.solana.com");
    assert_eq!(settings.storage.endpoint, "http://127.0.0.1:5001");
    assert_eq!(settings.storage.gateway, "https://ipfs.io/ipfs");
    assert!(settings.storage.api_key.is_none());
}

#[test]
fn overrides_take_precedence_over_file_and_network_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), 10);
    let file_mint = Pubkey::new_unique();
    let env_mint = Pubkey::new_unique();

    let flags = Overrides {
        network: Network::MainnetBeta,
        rpc_url: Some("http://localhost:8899".to_string()),
        mint_address: Some(env_mint.to_string()),
        upload_api_key: Some("secret".to_string()),
        upload_gateway: Some(String::new()),
        ..overrides(dir.path(), &dir.path().join("keypair.json"))
    };
    let settings = config::resolve(token_file(&file_mint, &image), &flags).unwrap();

    assert_eq!(settings.token.mint, env_mint);
    assert_eq!(settings.runtime.rpc_url, "http://localhost:8899");
    assert_eq!(settings.storage.endpoint, "https://ipfs.infura.io:5001");
    // blank values fall back to defaults
    assert_eq!(settings.storage.gateway, "https://ipfs.io/ipfs");
    assert_eq!(settings.storage.api_key.as_deref(), Some("secret"));
}

#[test]
fn long_name_and_symbol_are_reported_together() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), 10);
    let mut file = token_file(&Pubkey::new_unique(), &image);
    file.metadata.name = "N".repeat(33);
    file.metadata.symbol = "S".repeat(11);

    let err = config::resolve(file, &Overrides::default()).unwrap_err();
    let v = violations(err);

    assert_eq!(v.len(), 2, "{v:?}");
    assert!(v[0].contains("metadata.name is too long (33 characters, max 32)"));
    assert!(v[1].contains("metadata.symbol is too long (11 characters, max 10)"));
}

#[test]
fn multibyte_text_is_limited_by_encoded_length() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), 10);
    let mut file = token_file(&Pubkey::new_unique(), &image);
    // 18 characters, 34 bytes
    file.metadata.name = "Мой Тестовый Токен".to_string();
    // 6 characters, 12 bytes
    file.metadata.symbol = "ТОКЕНЫ".to_string();

    let v = violations(config::resolve(file, &Overrides::default()).unwrap_err());

    assert_eq!(v.len(), 2, "{v:?}");
    assert!(v[0].contains("metadata.name is too long (34 bytes when encoded, max 32)"));
    assert!(v[1].contains("metadata.symbol is too long (12 bytes when encoded, max 10)"));
}

#[test]
fn multibyte_text_within_byte_limit_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), 10);
    let mut file = token_file(&Pubkey::new_unique(), &image);
    // 16 characters, 32 bytes
    file.metadata.name = "é".repeat(16);
    file.metadata.symbol = "ü".repeat(5);

    assert!(config::resolve(file, &Overrides::default()).is_ok());
}

#[test]
fn direct_mode_limits_encoded_length() {
    let args = DirectArgs {
        mint_address: Some(Pubkey::new_unique().to_string()),
        name: Some("Мой Тестовый Токен".to_string()),
        symbol: Some("MTN".to_string()),
        uri: Some("https://gateway.test/ipfs/abc".to_string()),
    };
    let v = violations(config::resolve_direct(args, &Overrides::default()).unwrap_err());
    assert_eq!(
        v,
        vec!["TOKEN_NAME is too long (34 bytes when encoded, max 32)".to_string()]
    );
}

#[test]
fn every_violation_is_collected() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = TokenFile::default();
    file.mint_address = "not-a-mint".to_string();
    file.metadata.image_path = dir.path().join("missing.png").display().to_string();
    file.upload.retry_attempts = 0;

    let v = violations(config::resolve(file, &Overrides::default()).unwrap_err());

    assert_eq!(v.len(), 5, "{v:?}");
    assert!(v[0].contains("mintAddress `not-a-mint` is not a valid address"));
    assert!(v[1].contains("metadata.name is not set"));
    assert!(v[2].contains("metadata.symbol is not set"));
    assert!(v[3].contains("image file not found"));
    assert!(v[4].contains("retryAttempts must be at least 1"));
}

#[test]
fn token_file_accepts_camel_case_and_snake_case_external_url() {
    let json = r#"{
        "mintAddress": "11111111111111111111111111111111",
        "metadata": {
            "name": "My Token Name",
            "symbol": "MTN",
            "description": "d",
            "imagePath": "./art.png",
            "external_url": "https://example.com"
        },
        "upload": { "retryAttempts": 5, "retryDelay": 100 }
    }"#;
    let file: TokenFile = serde_json::from_str(json).unwrap();

    assert_eq!(file.metadata.external_url, "https://example.com");
    assert_eq!(file.upload.retry_attempts, 5);
    assert_eq!(file.upload.retry_delay, 100);
    // unspecified fields keep their defaults
    assert_eq!(file.upload.image_max_size, DEFAULT_IMAGE_MAX_SIZE);
    assert_eq!(file.upload.timeout, 30_000);
}

#[test]
fn empty_external_url_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), 10);
    let mut file = token_file(&Pubkey::new_unique(), &image);
    file.metadata.external_url = "  ".to_string();

    let settings = config::resolve(file, &Overrides::default()).unwrap();
    assert!(settings.token.external_url.is_none());
}

#[test]
fn load_reports_parse_errors_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = TokenFile::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("token.json"));

    let err = TokenFile::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
#[serial]
fn default_image_path_is_relative_to_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets/image.png"), [1u8; 16]).unwrap();
    std::fs::write(
        dir.path().join("token.json"),
        format!(
            r#"{{"mintAddress":"{}","metadata":{{"name":"My Token Name","symbol":"MTN"}}}}"#,
            Pubkey::new_unique()
        ),
    )
    .unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = TokenFile::load(std::path::Path::new("token.json"))
        .and_then(|file| config::resolve(file, &Overrides::default()));
    std::env::set_current_dir(previous).unwrap();

    let settings = result.unwrap();
    assert_eq!(
        settings.token.image_path,
        std::path::PathBuf::from("./assets/image.png")
    );
}

#[test]
fn direct_mode_requires_a_uri() {
    let args = DirectArgs {
        mint_address: Some(Pubkey::new_unique().to_string()),
        name: Some("My Token Name".to_string()),
        symbol: Some("MTN".to_string()),
        uri: None,
    };
    let v = violations(config::resolve_direct(args, &Overrides::default()).unwrap_err());
    assert_eq!(v, vec!["TOKEN_URI is not set".to_string()]);
}

#[test]
fn direct_mode_resolves_link_target() {
    let mint = Pubkey::new_unique();
    let args = DirectArgs {
        mint_address: Some(format!(" {mint} ")),
        name: Some("My Token Name".to_string()),
        symbol: Some("MTN".to_string()),
        uri: Some("https://gateway.test/ipfs/abc".to_string()),
    };
    let settings = config::resolve_direct(args, &Overrides::default()).unwrap();

    assert_eq!(settings.target.mint, mint);
    assert_eq!(settings.target.symbol, "MTN");
    assert_eq!(settings.uri, "https://gateway.test/ipfs/abc");
}

#[test]
fn network_names_and_explorer_links() {
    assert_eq!(
        Network::from_str("mainnet", true).unwrap(),
        Network::MainnetBeta
    );
    assert_eq!(
        Network::from_str("mainnet-beta", true).unwrap(),
        Network::MainnetBeta
    );
    assert_eq!(Network::from_str("testnet", true).unwrap(), Network::Testnet);

    let mint = Pubkey::new_unique();
    assert_eq!(
        Network::Devnet.explorer_address_url(&mint),
        format!("https://explorer.solana.com/address/{mint}?cluster=devnet")
    );
    assert_eq!(
        Network::MainnetBeta.explorer_address_url(&mint),
        format!("https://explorer.solana.com/address/{mint}")
    );
    assert!(Network::Testnet
        .explorer_tx_url(&"sig")
        .ends_with("/tx/sig?cluster=testnet"));
}
