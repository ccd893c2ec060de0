//! Transaction submission through the wallet, with a configurable safety
//! margin on top of the wallet's own gas estimate.

use crate::{
    error::{Error, Result},
    meta::wallet_name,
    policy::WalletPolicy,
    provider::WalletProvider,
};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gas estimation method.
pub const ETH_ESTIMATE_GAS: &str = "eth_estimateGas";
/// Transaction submission method.
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";

/// Fraction added on top of the wallet's gas estimate when none is given.
pub const DEFAULT_GAS_MARGIN: f64 = 0.2;

/// A transaction as wallets accept it over JSON-RPC.
///
/// Every field is optional; the wallet fills in whatever is absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Sender. Filled with the wallet's default account when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Recipient. Absent for contract deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Gas limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    /// Legacy gas price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// EIP-1559 fee cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// EIP-1559 priority fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    /// Value in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Calldata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Nonce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
    /// EIP-155 chain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<U256>,
}

/// Sends `tx` through the wallet and returns the transaction hash.
///
/// The gas limit is this function's concern: with a margin set it is
/// replaced by `eth_estimateGas` plus the margin, without one it is
/// stripped so the wallet estimates on its own. Any gas limit on the
/// request only serves as a hint to the estimation call. Wallets the
/// policy marks as estimating in-wallet never get an estimation call;
/// they reject transactions carrying a gas limit.
pub async fn send_transaction<P>(
    provider: &P,
    policy: &WalletPolicy,
    mut tx: TransactionRequest,
    gas_margin: Option<f64>,
) -> Result<TxHash>
where
    P: WalletProvider + ?Sized,
{
    if tx.from.is_none() {
        tx.from = Some(provider.default_account().await?);
    }

    let in_wallet = policy.estimates_gas_in_wallet(wallet_name(provider).as_deref());
    tx.gas = match gas_margin {
        Some(margin) if !in_wallet => {
            let estimate = estimate_gas(provider, &tx).await?;
            let padded = apply_gas_margin(estimate, margin);
            debug!(%estimate, gas = %padded, "padded gas estimate");
            Some(padded)
        }
        _ => None,
    };

    debug!(from = ?tx.from, to = ?tx.to, "sending transaction");
    let response = provider.send(ETH_SEND_TRANSACTION, vec![serde_json::to_value(&tx)?]).await?;
    serde_json::from_value(response)
        .map_err(|source| Error::UnexpectedResponse { method: ETH_SEND_TRANSACTION, source })
}

/// Asks the wallet for a gas estimate for `tx`.
pub async fn estimate_gas<P>(provider: &P, tx: &TransactionRequest) -> Result<U256>
where
    P: WalletProvider + ?Sized,
{
    let response = provider.send(ETH_ESTIMATE_GAS, vec![serde_json::to_value(tx)?]).await?;
    serde_json::from_value(response)
        .map_err(|source| Error::UnexpectedResponse { method: ETH_ESTIMATE_GAS, source })
}

/// Pads `estimate` by `margin`, truncating the margin to whole percent.
pub fn apply_gas_margin(estimate: U256, margin: f64) -> U256 {
    // negative or NaN margins collapse to zero through the cast
    let percent = U256::from((margin * 100.0).floor() as u64);
    estimate + estimate * percent / U256::from(100)
}
