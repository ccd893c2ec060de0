//! Crate-level error and result types.

use crate::{rpc::RpcError, typed_data::TypedDataError};

/// Result alias defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure while signing typed data or sending a transaction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The wallet returned an error that is not handled by a fallback.
    /// Carried unchanged, message and all.
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// A name in the domain or message could not be resolved to an address.
    #[error("failed to resolve name `{name}`")]
    Resolve {
        /// The name that failed to resolve.
        name: String,
        /// The resolver's error.
        source: RpcError,
    },
    /// The typed data itself is malformed.
    #[error(transparent)]
    TypedData(#[from] TypedDataError),
    /// A request body could not be serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The wallet answered a request with a value of an unexpected shape.
    #[error("unexpected response to `{method}`")]
    UnexpectedResponse {
        /// The RPC method that was called.
        method: &'static str,
        /// The deserialization failure.
        source: serde_json::Error,
    },
}
