//! Wallet identity classification through the public client.

use crate::utils::MockWallet;
use serde_json::json;
use wallet_compat::{InjectedFlags, PeerMeta, ProviderIdentity, WalletClient, WalletType};

#[tokio::test]
async fn classifies_every_provider() {
    let client = WalletClient::new(MockWallet::new());
    let meta = client.wallet_meta();
    assert_eq!(meta.wallet_type, WalletType::Unknown);
    assert_eq!(meta.agent, "(Unknown)");

    let client = WalletClient::new(MockWallet::new().with_identity(
        ProviderIdentity::WalletConnect {
            peer_meta: Some(PeerMeta {
                name: "Rainbow".to_string(),
                description: "the fun, simple way to start your web3 journey".to_string(),
                url: "https://rainbow.me".to_string(),
                icons: vec!["https://rainbow.me/icon.png".to_string()],
            }),
        },
    ));
    let meta = client.wallet_meta();
    assert_eq!(meta.wallet_type, WalletType::WalletConnect);
    assert_eq!(meta.agent, "Rainbow (WalletConnect)");
    assert_eq!(meta.name.as_deref(), Some("Rainbow"));
    assert_eq!(meta.url.as_deref(), Some("https://rainbow.me"));

    let client = WalletClient::new(MockWallet::new().with_identity(ProviderIdentity::Injected(
        InjectedFlags::new().flag("Rabby", true).flag("MetaMask", true),
    )));
    let meta = client.wallet_meta();
    assert_eq!(meta.wallet_type, WalletType::Injected);
    assert_eq!(meta.agent, "Rabby MetaMask (Injected)");
    assert_eq!(meta.name.as_deref(), Some("Rabby"));
}

#[test]
fn serializes_for_analytics() {
    let meta = wallet_compat::meta::wallet_meta(
        &MockWallet::new().with_identity(ProviderIdentity::Injected(
            InjectedFlags::new().flag("MetaMask", true),
        )),
    );
    assert_eq!(
        serde_json::to_value(&meta).unwrap(),
        json!({
            "type": "Injected",
            "agent": "MetaMask (Injected)",
            "name": "MetaMask",
        })
    );

    let meta = wallet_compat::meta::wallet_meta(&MockWallet::new());
    assert_eq!(
        serde_json::to_value(&meta).unwrap(),
        json!({
            "type": "Unknown",
            "agent": "(Unknown)",
        })
    );
}
