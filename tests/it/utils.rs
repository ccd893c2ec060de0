//! Shared test doubles and typed data fixtures.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::Mutex,
};
use wallet_compat::{
    Eip712Types, IdentifiableProvider, NameResolver, ProviderIdentity, RpcError, TypedDataDomain,
    WalletProvider, WarningSink,
};

/// The account every mock wallet signs with, lowercase as sent on the wire.
pub const WALLET: &str = "0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826";

pub fn wallet_account() -> Address {
    WALLET.parse().unwrap()
}

/// A wallet provider with scripted responses, recording every request.
///
/// Responses are consumed in order; each one asserts the method it was
/// scripted for, and any call beyond the script panics. That makes "no
/// third attempt" failures loud.
pub struct MockWallet {
    identity: Option<ProviderIdentity>,
    account: Address,
    names: BTreeMap<String, Address>,
    responses: Mutex<VecDeque<(&'static str, Result<Value, RpcError>)>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            identity: None,
            account: wallet_account(),
            names: BTreeMap::new(),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_identity(mut self, identity: ProviderIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_name(mut self, name: &str, address: Address) -> Self {
        self.names.insert(name.to_string(), address);
        self
    }

    /// Scripts the response to the next expected `method` call.
    pub fn respond(self, method: &'static str, response: Result<Value, RpcError>) -> Self {
        self.responses.lock().unwrap().push_back((method, response));
        self
    }

    /// Every `send` call made so far, in order.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        let (expected, response) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted call to {method}"));
        assert_eq!(method, expected, "wallet called out of order");
        response
    }

    async fn default_account(&self) -> Result<Address, RpcError> {
        Ok(self.account)
    }
}

impl IdentifiableProvider for MockWallet {
    fn identity(&self) -> Option<ProviderIdentity> {
        self.identity.clone()
    }
}

#[async_trait]
impl NameResolver for MockWallet {
    async fn resolve_name(&self, name: &str) -> Result<Address, RpcError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RpcError::other(format!("could not resolve {name}")))
    }
}

/// A [`WarningSink`] that collects instead of logging.
#[derive(Default)]
pub struct CollectedWarnings(Mutex<Vec<(String, RpcError)>>);

impl CollectedWarnings {
    pub fn take(&self) -> Vec<(String, RpcError)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl WarningSink for CollectedWarnings {
    fn warn(&self, message: &str, cause: &RpcError) {
        self.0.lock().unwrap().push((message.to_string(), cause.clone()));
    }
}

pub fn mail_domain() -> TypedDataDomain {
    TypedDataDomain {
        name: Some("Ether Mail".to_string()),
        version: Some("1".to_string()),
        chain_id: Some(1),
        verifying_contract: Some("0xcccccccccccccccccccccccccccccccccccccccc".to_string()),
        salt: None,
    }
}

pub fn mail_types() -> Eip712Types {
    serde_json::from_value(json!({
        "Person": [
            { "name": "name", "type": "string" },
            { "name": "wallet", "type": "address" },
        ],
        "Mail": [
            { "name": "from", "type": "Person" },
            { "name": "to", "type": "Person" },
            { "name": "contents", "type": "string" },
            { "name": "number", "type": "uint256" },
            { "name": "bignum", "type": "uint256" },
        ],
    }))
    .unwrap()
}

pub fn mail_message() -> Value {
    json!({
        "from": {
            "name": "Cow",
            "wallet": WALLET,
        },
        "to": {
            "name": "Bob",
            "wallet": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        },
        "contents": "Hello, Bob!",
        "number": 9876543210u64,
        "bignum": 9007199254740992u64,
    })
}

/// The EIP-712 signing hash of [`mail_message`] under [`mail_domain`],
/// as carried by the `eth_sign` fallback.
pub const MAIL_DIGEST: &str = "0x997987773a7c24826f4d5bb58a0adb6909636e0a0def99de063639873969ad96";

/// Asserts that `data` is the serialized signing payload for the mail
/// fixture, with every integer in exact decimal form.
pub fn assert_encoded_payload(data: &Value) {
    let Value::String(payload) = data else { panic!("expected a string payload, got {data:?}") };
    let parsed: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(
        parsed["domain"],
        json!({
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xcccccccccccccccccccccccccccccccccccccccc",
        })
    );
    assert_eq!(parsed["primaryType"], json!("Mail"));
    assert_eq!(parsed["message"], mail_message());
    assert_eq!(
        parsed["types"]["EIP712Domain"],
        json!([
            { "type": "string", "name": "name" },
            { "type": "string", "name": "version" },
            { "type": "uint256", "name": "chainId" },
            { "type": "address", "name": "verifyingContract" },
        ])
    );
    assert_eq!(parsed["types"]["Person"].as_array().map(Vec::len), Some(2));
    assert_eq!(parsed["types"]["Mail"].as_array().map(Vec::len), Some(5));
    // integers beyond f64 precision survive serialization verbatim
    assert!(
        payload.contains(r#""bignum":9007199254740992"#),
        "bignum must stay an unquoted exact integer: {payload}"
    );
}
