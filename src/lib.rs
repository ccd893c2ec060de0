//! Compatibility layer for signing EIP-712 typed data and sending
//! transactions through quirky Ethereum wallet providers.
//!
//! Wallet support for EIP-712 is uneven: some wallets only implement
//! `eth_signTypedData_v4`, some only the historical `eth_signTypedData`
//! with its ambiguous parameter ordering, and some neither. This crate
//! wraps an opaque JSON-RPC provider and gets a signature out of all of
//! them, classifying wallet errors and falling back across signing methods
//! where that is known to be safe. See [`signing::sign_typed_data`] for the
//! exact ladder.
//!
//! The provider is anything implementing [`WalletProvider`]; how requests
//! reach the wallet (injected object, WalletConnect bridge, HTTP) is the
//! embedder's business. Providers that can say what kind of wallet sits
//! behind them implement [`IdentifiableProvider`] on top, which feeds both
//! the user-facing [`WalletMeta`] and the quirk handling in
//! [`WalletPolicy`].
//!
//! # Example
//!
//! ```no_run
//! # async fn example(provider: impl wallet_compat::WalletProvider + wallet_compat::NameResolver) -> Result<(), wallet_compat::Error> {
//! use serde_json::json;
//! use wallet_compat::{Eip712Types, TypedDataDomain, WalletClient};
//!
//! let client = WalletClient::new(provider);
//! let domain = TypedDataDomain {
//!     name: Some("Ether Mail".to_string()),
//!     version: Some("1".to_string()),
//!     chain_id: Some(1),
//!     ..Default::default()
//! };
//! let types: Eip712Types = serde_json::from_value(json!({
//!     "Mail": [
//!         { "name": "contents", "type": "string" },
//!     ],
//! }))?;
//! let signature = client.sign_typed_data(&domain, &types, &json!({ "contents": "Hello" })).await?;
//! # let _ = signature;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use alloy_primitives::TxHash;
use serde_json::Value;
use std::sync::Arc;

pub mod error;
pub mod meta;
pub mod policy;
pub mod provider;
pub mod rpc;
pub mod signing;
pub mod transactions;
pub mod typed_data;

pub use error::{Error, Result};
pub use meta::{InjectedFlags, PeerMeta, ProviderIdentity, WalletMeta, WalletType};
pub use policy::{FailureClass, WalletPolicy};
pub use provider::{IdentifiableProvider, NameResolver, TracingSink, WalletProvider, WarningSink};
pub use rpc::{ErrorCode, RpcError};
pub use transactions::{DEFAULT_GAS_MARGIN, TransactionRequest};
pub use typed_data::{Eip712Types, PropertyDef, TypedDataDomain};

/// High-level handle binding a provider to a policy and a warning sink.
///
/// The free functions in [`signing`] and [`transactions`] do the actual
/// work; this wrapper only saves passing the policy and sink around.
#[derive(Clone)]
pub struct WalletClient<P> {
    provider: P,
    policy: WalletPolicy,
    warnings: Arc<dyn WarningSink>,
}

impl<P> WalletClient<P>
where
    P: WalletProvider,
{
    /// Creates a client with the default [`WalletPolicy`] and warnings
    /// logged through [`tracing`].
    pub fn new(provider: P) -> Self {
        Self { provider, policy: WalletPolicy::default(), warnings: Arc::new(TracingSink) }
    }

    /// Replaces the wallet quirk policy.
    pub fn with_policy(mut self, policy: WalletPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the sink fallback warnings are reported to.
    pub fn with_warning_sink(mut self, warnings: Arc<dyn WarningSink>) -> Self {
        self.warnings = warnings;
        self
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Identity metadata of the wallet behind the provider.
    pub fn wallet_meta(&self) -> WalletMeta {
        meta::wallet_meta(&self.provider)
    }

    /// Signs typed data with the wallet's default account, falling back
    /// across signing methods as the wallet requires.
    pub async fn sign_typed_data(
        &self,
        domain: &TypedDataDomain,
        types: &Eip712Types,
        value: &Value,
    ) -> Result<Value>
    where
        P: NameResolver,
    {
        signing::sign_typed_data(
            &self.provider,
            &self.policy,
            self.warnings.as_ref(),
            domain,
            types,
            value,
        )
        .await
    }

    /// Sends a transaction with its gas limit set to the wallet's estimate
    /// padded by [`DEFAULT_GAS_MARGIN`].
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        self.send_transaction_with_gas_margin(tx, Some(DEFAULT_GAS_MARGIN)).await
    }

    /// Sends a transaction with an explicit gas margin. `None` skips
    /// estimation entirely and leaves gas to the wallet.
    pub async fn send_transaction_with_gas_margin(
        &self,
        tx: TransactionRequest,
        gas_margin: Option<f64>,
    ) -> Result<TxHash> {
        transactions::send_transaction(&self.provider, &self.policy, tx, gas_margin).await
    }
}
