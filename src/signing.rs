//! Typed data signing across wallets with inconsistent EIP-712 support.
//!
//! Wallets disagree on which signing method they implement and on the
//! parameter ordering of the historical one. [`sign_typed_data`] starts
//! with the method the [`WalletPolicy`] picks for the wallet and falls back
//! once on narrowly classified failures:
//!
//! * `eth_signTypedData` answered with an unknown-account or
//!   invalid-params error is retried as `eth_signTypedData_v4` with the
//!   identical payload.
//! * A method-not-found style error from either typed data method drops to
//!   `eth_sign` over the EIP-712 signing hash.
//! * Everything else, user rejections included, propagates untouched.
//!
//! At most two wallet calls are made and each fallback emits exactly one
//! warning through the injected [`WarningSink`].

use crate::{
    error::Result,
    meta::wallet_name,
    policy::{FailureClass, WalletPolicy, classify},
    provider::{NameResolver, WalletProvider, WarningSink},
    rpc::RpcError,
    typed_data::{self, Eip712Types, TypedDataDomain},
};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Historical typed data signing method with ambiguous parameter ordering.
pub const ETH_SIGN_TYPED_DATA: &str = "eth_signTypedData";
/// Finalized EIP-712 typed data signing method.
pub const ETH_SIGN_TYPED_DATA_V4: &str = "eth_signTypedData_v4";
/// Raw signing over a 32 byte digest, the fallback of last resort.
pub const ETH_SIGN: &str = "eth_sign";

/// Warning emitted when the unversioned method is retried as the versioned
/// one because the wallet expects the opposite parameter ordering.
pub const PARAMETER_ORDERING_WARNING: &str =
    "signTypedData: wallet expects the opposite parameter ordering, falling back to eth_signTypedData_v4";
/// Warning emitted when the unversioned method is retried as the versioned
/// one because the wallet rejected the request parameters.
pub const INVALID_PARAMS_WARNING: &str =
    "signTypedData: wallet rejected typed data parameters, falling back to eth_signTypedData_v4";
/// Warning emitted when signing drops to `eth_sign` because the wallet does
/// not implement EIP-712.
pub const EIP712_UNSUPPORTED_WARNING: &str =
    "signTypedData: wallet does not implement EIP-712, falling back to eth_sign";

/// The wallet method a signing attempt goes out on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningMethod {
    /// `eth_signTypedData`.
    TypedData,
    /// `eth_signTypedData_v4`.
    TypedDataV4,
    /// `eth_sign` over the EIP-712 signing hash.
    EthSign,
}

impl SigningMethod {
    /// The JSON-RPC method name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TypedData => ETH_SIGN_TYPED_DATA,
            Self::TypedDataV4 => ETH_SIGN_TYPED_DATA_V4,
            Self::EthSign => ETH_SIGN,
        }
    }
}

impl fmt::Display for SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signs `value` under `domain` with the wallet's default account.
///
/// Name references in the domain and message are resolved up front; a
/// resolver failure aborts before any signing attempt. The signature is
/// returned in whatever shape the wallet produced it.
pub async fn sign_typed_data<P>(
    provider: &P,
    policy: &WalletPolicy,
    warnings: &dyn WarningSink,
    domain: &TypedDataDomain,
    types: &Eip712Types,
    value: &Value,
) -> Result<Value>
where
    P: WalletProvider + NameResolver + ?Sized,
{
    let primary_type = typed_data::validate(types)?;
    let (domain, value) =
        typed_data::resolve_names(provider, domain, types, &primary_type, value).await?;

    let account = provider.default_account().await?;
    // wallets are stricter about casing than the rest of the ecosystem
    let address = format!("{account:?}");
    let payload = typed_data::encode_payload(&domain, types, &primary_type, &value)?;

    let first = if policy.supports_v4(wallet_name(provider).as_deref()) {
        SigningMethod::TypedDataV4
    } else {
        SigningMethod::TypedData
    };

    debug!(method = %first, %address, %primary_type, "signing typed data");
    let error = match attempt(provider, first, &address, &payload).await {
        Ok(signature) => return Ok(signature),
        Err(error) => error,
    };

    let retry = match (first, classify(&error)) {
        (SigningMethod::TypedData, FailureClass::UnknownAccount) => {
            warnings.warn(PARAMETER_ORDERING_WARNING, &error);
            SigningMethod::TypedDataV4
        }
        (SigningMethod::TypedData, FailureClass::InvalidParams) => {
            warnings.warn(INVALID_PARAMS_WARNING, &error);
            SigningMethod::TypedDataV4
        }
        (_, FailureClass::MethodUnavailable) => {
            warnings.warn(EIP712_UNSUPPORTED_WARNING, &error);
            SigningMethod::EthSign
        }
        _ => return Err(error.into()),
    };

    let body = match retry {
        // computed only now, successful attempts never need it
        SigningMethod::EthSign => {
            typed_data::encode_digest(&domain, types, &primary_type, &value)?.to_string()
        }
        _ => payload,
    };
    debug!(method = %retry, %address, "retrying typed data signing");
    Ok(attempt(provider, retry, &address, &body).await?)
}

async fn attempt<P>(
    provider: &P,
    method: SigningMethod,
    address: &str,
    body: &str,
) -> Result<Value, RpcError>
where
    P: WalletProvider + ?Sized,
{
    provider
        .send(
            method.as_str(),
            vec![Value::String(address.to_string()), Value::String(body.to_string())],
        )
        .await
}
