//! Transaction submission and gas margin behavior.

use crate::utils::{MockWallet, WALLET, wallet_account};
use alloy_primitives::{Address, TxHash, U256};
use serde_json::json;
use wallet_compat::{
    Error, PeerMeta, ProviderIdentity, TransactionRequest, WalletClient,
    transactions::{ETH_ESTIMATE_GAS, ETH_SEND_TRANSACTION},
};

const HASH: &str = "0x6c67a873b80151058fb8fa7ea4b2b1e4b61bd6b8b136bf9a0bcd9ed77dcbdbdf";

fn request() -> TransactionRequest {
    TransactionRequest {
        to: Some(Address::repeat_byte(0x22)),
        value: Some(U256::from(1)),
        ..Default::default()
    }
}

fn uniswap_wallet() -> ProviderIdentity {
    ProviderIdentity::WalletConnect {
        peer_meta: Some(PeerMeta { name: "Uniswap Wallet".to_string(), ..Default::default() }),
    }
}

#[tokio::test]
async fn sends_with_default_gas_margin() {
    let client = WalletClient::new(
        MockWallet::new()
            .respond(ETH_ESTIMATE_GAS, Ok(json!("0xa")))
            .respond(ETH_SEND_TRANSACTION, Ok(json!(HASH))),
    );

    let hash = client.send_transaction(request()).await.unwrap();
    assert_eq!(hash, HASH.parse::<TxHash>().unwrap());

    let calls = client.provider().calls();
    assert_eq!(calls.len(), 2);
    // the wallet's estimate of 10 goes out padded to 12
    assert_eq!(calls[1].0, ETH_SEND_TRANSACTION);
    assert_eq!(calls[1].1[0]["gas"], json!("0xc"));
}

#[tokio::test]
async fn sends_with_configured_gas_margin() {
    let client = WalletClient::new(
        MockWallet::new()
            .respond(ETH_ESTIMATE_GAS, Ok(json!("0xa")))
            .respond(ETH_SEND_TRANSACTION, Ok(json!(HASH))),
    );

    client.send_transaction_with_gas_margin(request(), Some(0.1)).await.unwrap();
    assert_eq!(client.provider().calls()[1].1[0]["gas"], json!("0xb"));
}

#[tokio::test]
async fn sends_without_gas_margin() {
    let client =
        WalletClient::new(MockWallet::new().respond(ETH_SEND_TRANSACTION, Ok(json!(HASH))));

    client.send_transaction_with_gas_margin(request(), None).await.unwrap();

    let calls = client.provider().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ETH_SEND_TRANSACTION);
    assert!(calls[0].1[0].get("gas").is_none());
}

#[tokio::test]
async fn uniswap_wallet_estimates_in_wallet() {
    let client = WalletClient::new(
        MockWallet::new()
            .with_identity(uniswap_wallet())
            .respond(ETH_SEND_TRANSACTION, Ok(json!(HASH))),
    );

    // the default margin is ignored for wallets that estimate themselves
    client.send_transaction(request()).await.unwrap();

    let calls = client.provider().calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1[0].get("gas").is_none());
}

#[tokio::test]
async fn wallet_set_gas_limit_is_replaced() {
    let client = WalletClient::new(
        MockWallet::new()
            .respond(ETH_ESTIMATE_GAS, Ok(json!("0xa")))
            .respond(ETH_SEND_TRANSACTION, Ok(json!(HASH))),
    );

    let tx = TransactionRequest { gas: Some(U256::from(5)), ..request() };
    client.send_transaction(tx).await.unwrap();

    let calls = client.provider().calls();
    // the caller's limit only feeds the estimation call
    assert_eq!(calls[0].1[0]["gas"], json!("0x5"));
    assert_eq!(calls[1].1[0]["gas"], json!("0xc"));
}

#[tokio::test]
async fn fills_the_sender_from_the_wallet() {
    let client = WalletClient::new(
        MockWallet::new()
            .respond(ETH_ESTIMATE_GAS, Ok(json!("0xa")))
            .respond(ETH_SEND_TRANSACTION, Ok(json!(HASH))),
    );

    client.send_transaction(request()).await.unwrap();

    let calls = client.provider().calls();
    assert_eq!(calls[0].1[0]["from"], json!(WALLET));
    assert_eq!(calls[1].1[0]["from"], json!(WALLET));
}

#[tokio::test]
async fn keeps_an_explicit_sender() {
    let sender = Address::repeat_byte(0x33);
    let client = WalletClient::new(
        MockWallet::new()
            .respond(ETH_ESTIMATE_GAS, Ok(json!("0xa")))
            .respond(ETH_SEND_TRANSACTION, Ok(json!(HASH))),
    );

    let tx = TransactionRequest { from: Some(sender), ..request() };
    client.send_transaction(tx).await.unwrap();

    assert_ne!(sender, wallet_account());
    assert_eq!(client.provider().calls()[1].1[0]["from"], json!(format!("{sender:?}")));
}

#[tokio::test]
async fn rejects_malformed_transaction_hashes() {
    let client = WalletClient::new(
        MockWallet::new()
            .respond(ETH_ESTIMATE_GAS, Ok(json!("0xa")))
            .respond(ETH_SEND_TRANSACTION, Ok(json!("not a transaction hash"))),
    );

    let error = client.send_transaction(request()).await.unwrap_err();
    match error {
        Error::UnexpectedResponse { method, .. } => assert_eq!(method, ETH_SEND_TRANSACTION),
        other => panic!("expected an unexpected response error, got {other:?}"),
    }
}

#[tokio::test]
async fn wallet_errors_propagate() {
    let client = WalletClient::new(MockWallet::new().respond(
        ETH_ESTIMATE_GAS,
        Err(wallet_compat::RpcError::other("execution reverted")),
    ));

    let error = client.send_transaction(request()).await.unwrap_err();
    assert_eq!(error.to_string(), "execution reverted");
    assert_eq!(client.provider().calls().len(), 1);
}
