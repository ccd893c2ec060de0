//! Capability traits implemented by the caller's provider binding.
//!
//! The crate never talks to a transport directly. Everything it needs from
//! the outside world is expressed as a small trait: sending JSON-RPC
//! requests, reporting the active account, resolving human-readable names,
//! exposing wallet identity material, and receiving compatibility warnings.

use crate::{meta::ProviderIdentity, rpc::RpcError};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;

/// A JSON-RPC connection to a wallet.
///
/// `send` submits a single request and resolves with the wallet's result, or
/// rejects with the wallet's error verbatim. Timeouts and transport-level
/// retries are the implementation's concern; a hanging transport hangs the
/// calling operation.
#[async_trait]
pub trait WalletProvider: IdentifiableProvider + Send + Sync {
    /// Sends a raw JSON-RPC request to the wallet.
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;

    /// Returns the account the wallet currently signs with.
    async fn default_account(&self) -> Result<Address, RpcError>;
}

/// Resolves human-readable names (ENS) to addresses.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolves `name` to its canonical address.
    async fn resolve_name(&self, name: &str) -> Result<Address, RpcError>;
}

/// Declares what a provider knows about the wallet behind it.
///
/// A provider that cannot identify its wallet keeps the default and is
/// classified as unknown; it still signs and sends like any other.
pub trait IdentifiableProvider {
    /// Returns the wallet's identity material, if the provider exposes any.
    fn identity(&self) -> Option<ProviderIdentity> {
        None
    }
}

/// Receives compatibility warnings emitted during signing fallbacks.
///
/// Exactly one warning is emitted per fallback transition, carrying the
/// wallet error that triggered it.
pub trait WarningSink: Send + Sync {
    /// Reports a fallback warning along with the error that caused it.
    fn warn(&self, message: &str, cause: &RpcError);
}

/// Default [`WarningSink`] forwarding to [`tracing`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str, cause: &RpcError) {
        tracing::warn!(%cause, "{message}");
    }
}
