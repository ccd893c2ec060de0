//! Wallet identity classification.
//!
//! Wallets self-identify through two very different channels: WalletConnect
//! sessions carry peer metadata exchanged during the handshake, while
//! injected providers decorate themselves with `isMetaMask`-style boolean
//! flags. Both are normalized here into a [`WalletMeta`] that the signing
//! and transaction policies key off.

use crate::provider::IdentifiableProvider;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity material a provider exposes about the wallet behind it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderIdentity {
    /// A session relayed through a WalletConnect bridge, with whatever peer
    /// metadata the remote wallet shared during session setup.
    WalletConnect {
        /// Metadata shared by the remote peer, if any.
        peer_meta: Option<PeerMeta>,
    },
    /// A locally injected provider object (browser extension or in-app
    /// webview) with its self-identification flags.
    Injected(InjectedFlags),
}

/// Metadata a WalletConnect peer shares about itself during session setup.
///
/// Wallets routinely omit fields, so everything defaults to empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMeta {
    /// Human-readable wallet description.
    #[serde(default)]
    pub description: String,
    /// Wallet homepage.
    #[serde(default)]
    pub url: String,
    /// Wallet icon URLs.
    #[serde(default)]
    pub icons: Vec<String>,
    /// Wallet display name.
    #[serde(default)]
    pub name: String,
}

/// Self-identification flags declared for an injected provider.
///
/// Injected wallets conventionally expose `is<Name>` booleans on the provider
/// object (`isMetaMask`, `isCoinbaseWallet`, ...). Bindings declare the flags
/// they observed here instead of the crate reflecting over a foreign object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InjectedFlags {
    flags: Vec<(String, bool)>,
    qr_url: bool,
}

impl InjectedFlags {
    /// No flags at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a self-identification flag (`MetaMask` for `isMetaMask`).
    ///
    /// Declaration order is kept; it decides the agent string and which flag
    /// becomes the wallet's display name.
    pub fn flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.push((name.into(), value));
        self
    }

    /// Marks the connection as QR-initiated (eg Coinbase Wallet via mobile QR).
    pub fn qr_url(mut self, value: bool) -> Self {
        self.qr_url = value;
        self
    }

    /// Ingests raw boolean properties as found on an injected provider
    /// object, keeping the truthy `is`-prefixed ones with the prefix
    /// stripped, plus the `qrUrl` marker.
    pub fn from_properties<'a, I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut this = Self::new();
        for (name, value) in properties {
            if name == "qrUrl" {
                this.qr_url = value;
            } else if let Some(stripped) = name.strip_prefix("is") {
                if !stripped.is_empty() {
                    this = this.flag(stripped, value);
                }
            }
        }
        this
    }

    /// Flag names making up the wallet's agent string: set flags in
    /// declaration order, `qrUrl` appended, `MetaMask` sorted last so that
    /// wallets spoofing MetaMask list themselves first.
    fn agent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.flags.iter().filter(|(_, set)| *set).map(|(name, _)| name.as_str()).collect();
        if self.qr_url {
            names.push("qrUrl");
        }
        names.sort_by_key(|name| *name == "MetaMask");
        names
    }
}

/// How the wallet is connected to the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletType {
    /// The provider exposed no identity material.
    Unknown,
    /// Relayed through a WalletConnect session.
    WalletConnect,
    /// Injected into the page or webview.
    Injected,
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "Unknown",
            Self::WalletConnect => "WalletConnect",
            Self::Injected => "Injected",
        })
    }
}

/// Normalized wallet identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMeta {
    /// Connection type.
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Provenance string combining every detected identity flag with the
    /// parenthesized connection type, eg `"MetaMask (Injected)"`. Never
    /// empty; an anonymous provider still yields the bare type tag.
    pub agent: String,
    /// Wallet display name, if one could be detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Peer description, WalletConnect sessions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Peer homepage, WalletConnect sessions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Peer icon URLs, WalletConnect sessions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<String>>,
}

impl WalletMeta {
    /// Meta for a provider that exposed no identity material.
    pub fn unknown() -> Self {
        Self {
            wallet_type: WalletType::Unknown,
            agent: format!("({})", WalletType::Unknown),
            name: None,
            description: None,
            url: None,
            icons: None,
        }
    }
}

/// Classifies the wallet behind `provider`.
///
/// Total: a provider without identity material is classified as
/// [`WalletType::Unknown`] rather than rejected, and the agent string is
/// never empty.
pub fn wallet_meta<P: IdentifiableProvider + ?Sized>(provider: &P) -> WalletMeta {
    match provider.identity() {
        None => WalletMeta::unknown(),
        Some(ProviderIdentity::WalletConnect { peer_meta }) => wallet_connect_meta(peer_meta),
        Some(ProviderIdentity::Injected(flags)) => injected_meta(&flags),
    }
}

/// Returns the wallet's display name, if one could be detected.
pub fn wallet_name<P: IdentifiableProvider + ?Sized>(provider: &P) -> Option<String> {
    wallet_meta(provider).name
}

/// Returns the WalletConnect peer metadata, if the provider is a
/// WalletConnect session that shared any.
pub fn peer_meta<P: IdentifiableProvider + ?Sized>(provider: &P) -> Option<PeerMeta> {
    match provider.identity() {
        Some(ProviderIdentity::WalletConnect { peer_meta }) => peer_meta,
        _ => None,
    }
}

fn wallet_connect_meta(peer_meta: Option<PeerMeta>) -> WalletMeta {
    let name = peer_meta.as_ref().map(|peer| peer.name.clone()).filter(|name| !name.is_empty());
    let agent = match &name {
        Some(name) => format!("{name} ({})", WalletType::WalletConnect),
        None => format!("({})", WalletType::WalletConnect),
    };
    let (description, url, icons) = match peer_meta {
        Some(peer) => (Some(peer.description), Some(peer.url), Some(peer.icons)),
        None => (None, None, None),
    };
    WalletMeta { wallet_type: WalletType::WalletConnect, agent, name, description, url, icons }
}

fn injected_meta(flags: &InjectedFlags) -> WalletMeta {
    let names = flags.agent_names();
    let agent = if names.is_empty() {
        format!("({})", WalletType::Injected)
    } else {
        format!("{} ({})", names.join(" "), WalletType::Injected)
    };
    WalletMeta {
        wallet_type: WalletType::Injected,
        agent,
        name: names.first().map(|name| (*name).to_string()),
        description: None,
        url: None,
        icons: None,
    }
}
