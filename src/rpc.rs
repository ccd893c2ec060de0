//! JSON-RPC error bindings for wallet-facing requests.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{borrow::Cow, fmt};

/// A JSON-RPC error as received from a wallet provider.
///
/// Wallets are wildly inconsistent in how they reject requests: some return a
/// full error object, some only a numeric code, and some only a message. All
/// three fields are therefore optional on the wire; an entirely empty error is
/// still representable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code, if the wallet supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Error message, empty if the wallet supplied none.
    #[serde(default)]
    pub message: Cow<'static, str>,
    /// Additional error payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    /// New [`RpcError`] with the given [`ErrorCode`] and its canonical message.
    pub const fn new(code: ErrorCode) -> Self {
        Self { message: Cow::Borrowed(code.message()), code: Some(code), data: None }
    }

    /// Creates a new `MethodNotFound` error.
    pub const fn method_not_found() -> Self {
        Self::new(ErrorCode::MethodNotFound)
    }

    /// Creates a new `InvalidParams` error.
    pub fn invalid_params<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: Some(ErrorCode::InvalidParams), message: message.into().into(), data: None }
    }

    /// Creates a new `UserRejected` error, as emitted by EIP-1193 providers
    /// when the user declines a request.
    pub fn user_rejected<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: Some(ErrorCode::UserRejected), message: message.into().into(), data: None }
    }

    /// Creates a new error carrying only a message, the way several mobile
    /// wallets reject requests.
    pub fn other<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code: None, message: message.into().into(), data: None }
    }

    /// Attaches an error payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the numeric error code, if any.
    pub fn code_i64(&self) -> Option<i64> {
        self.code.map(|code| code.code())
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}: {}", code.message(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RpcError {}

/// List of JSON-RPC error codes, extended with the EIP-1193 provider codes
/// that browser wallets emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Server received invalid JSON.
    ParseError,
    /// Invalid request object.
    InvalidRequest,
    /// Method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal call error.
    InternalError,
    /// Failed to send transaction, see also <https://github.com/MetaMask/eth-rpc-errors/blob/main/src/error-constants.ts>
    TransactionRejected,
    /// Custom geth error code, <https://github.com/vapory-legacy/wiki/blob/master/JSON-RPC-Error-Codes-Improvement-Proposal.md>
    ExecutionError,
    /// EIP-1193: the user rejected the request.
    UserRejected,
    /// EIP-1193: the requested method/account has not been authorized.
    Unauthorized,
    /// EIP-1193: the provider does not support the requested method.
    UnsupportedMethod,
    /// EIP-1193: the provider is disconnected from all chains.
    Disconnected,
    /// EIP-1193: the provider is not connected to the requested chain.
    ChainDisconnected,
    /// Used for provider specific errors.
    ServerError(i64),
}

impl ErrorCode {
    /// Returns the error code as `i64`
    pub fn code(&self) -> i64 {
        match *self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::TransactionRejected => -32003,
            Self::ExecutionError => 3,
            Self::UserRejected => 4001,
            Self::Unauthorized => 4100,
            Self::UnsupportedMethod => 4200,
            Self::Disconnected => 4900,
            Self::ChainDisconnected => 4901,
            Self::ServerError(c) => c,
        }
    }

    /// Returns the message associated with the error
    pub const fn message(&self) -> &'static str {
        match *self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::TransactionRejected => "Transaction rejected",
            Self::ExecutionError => "Execution error",
            Self::UserRejected => "User rejected the request",
            Self::Unauthorized => "Unauthorized",
            Self::UnsupportedMethod => "Unsupported method",
            Self::Disconnected => "Disconnected",
            Self::ChainDisconnected => "Chain disconnected",
            Self::ServerError(_) => "Server error",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'a> Deserialize<'a> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        i64::deserialize(deserializer).map(Into::into)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32003 => Self::TransactionRejected,
            3 => Self::ExecutionError,
            4001 => Self::UserRejected,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            _ => Self::ServerError(code),
        }
    }
}
