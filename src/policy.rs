//! Wallet quirk policy and wallet error classification.
//!
//! Some wallets predate the final EIP-712 parameter ordering or estimate
//! gas on their own. Rather than hardcoding those quirks at the call sites,
//! they live here as plain data so embedders can extend the lists as new
//! wallets surface.

use crate::rpc::{ErrorCode, RpcError};

/// Quirk lists consulted before talking to a wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletPolicy {
    /// Wallets that only understand the historical `eth_signTypedData`
    /// parameter ordering. Matched as a substring of the wallet name.
    pub legacy_typed_data_wallets: Vec<String>,
    /// Wallets that estimate gas themselves and reject transactions
    /// carrying an explicit gas limit. Matched against the exact wallet
    /// name.
    pub in_wallet_gas_estimation: Vec<String>,
}

impl Default for WalletPolicy {
    fn default() -> Self {
        Self {
            legacy_typed_data_wallets: vec![
                "SafePal Wallet".to_string(),
                "Ledger Wallet Connect".to_string(),
            ],
            in_wallet_gas_estimation: vec!["Uniswap Wallet".to_string()],
        }
    }
}

impl WalletPolicy {
    /// Whether typed data signing should start with `eth_signTypedData_v4`.
    ///
    /// Unidentified wallets get the modern method; the fallback ladder
    /// covers the rest.
    pub fn supports_v4(&self, wallet_name: Option<&str>) -> bool {
        let Some(name) = wallet_name else { return true };
        !self.legacy_typed_data_wallets.iter().any(|legacy| name.contains(legacy.as_str()))
    }

    /// Whether the wallet estimates gas in-wallet, in which case the
    /// transaction must go out without a gas limit.
    pub fn estimates_gas_in_wallet(&self, wallet_name: Option<&str>) -> bool {
        let Some(name) = wallet_name else { return false };
        self.in_wallet_gas_estimation.iter().any(|wallet| wallet == name)
    }
}

/// How a wallet error should steer the signing flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    /// The wallet rejected the request parameters.
    InvalidParams,
    /// The wallet does not implement the method at all.
    MethodUnavailable,
    /// The wallet does not know the requested account.
    UnknownAccount,
    /// Anything else. Not retried, propagated as-is.
    Fatal,
}

/// Classifies a wallet error. The error code wins over the message text;
/// message matching is case-insensitive.
pub fn classify(error: &RpcError) -> FailureClass {
    if error.code == Some(ErrorCode::InvalidParams) {
        return FailureClass::InvalidParams;
    }
    let message = error.message.to_lowercase();
    if message.contains("not found") || message.contains("not implemented") {
        return FailureClass::MethodUnavailable;
    }
    if message.contains("unknown account") {
        return FailureClass::UnknownAccount;
    }
    FailureClass::Fatal
}
