//! EIP-712 typed data: domain descriptor, schema validation, name
//! resolution and the bridge into the [`alloy_dyn_abi`] encoder.
//!
//! The message schema is the [`Eip712Types`] map of declared struct types.
//! Before anything touches the wire it is validated as a whole: every
//! referenced type must be declared, the type graph must be acyclic, and
//! exactly one declared type may be unreferenced (the primary type). Field
//! type strings are classified into [`FieldKind`] variants so the name
//! resolution pass can find `address`-typed values without guessing.

use crate::{error::Error, provider::NameResolver};
use alloy_dyn_abi::{DynSolType, Resolver, TypedData};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
};

pub use alloy_dyn_abi::{Eip712Types, PropertyDef};

/// The signing domain of an EIP-712 message.
///
/// All fields are optional; absent fields are left out of the domain
/// separator entirely. `verifying_contract` is a string rather than an
/// address because it may hold an unresolved name until the resolution pass
/// has run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    /// User-readable name of the signing domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current major version of the signing domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// EIP-155 chain id the signature is valid on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Address of the contract that will verify the signature, or a name
    /// that resolves to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,
    /// Disambiguating salt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<B256>,
}

impl TypedDataDomain {
    /// Converts into the encoder's [`Eip712Domain`], parsing the verifying
    /// contract. Run the name resolution pass first if it may hold a name.
    pub fn to_eip712(&self) -> Result<Eip712Domain, TypedDataError> {
        let verifying_contract = match &self.verifying_contract {
            Some(contract) => Some(contract.parse::<Address>().map_err(|_| {
                TypedDataError::InvalidVerifyingContract(contract.clone())
            })?),
            None => None,
        };
        Ok(Eip712Domain::new(
            self.name.clone().map(Cow::Owned),
            self.version.clone().map(Cow::Owned),
            self.chain_id.map(U256::from),
            verifying_contract,
            self.salt,
        ))
    }

    /// The `EIP712Domain` property list for the fields this domain carries,
    /// in canonical order.
    fn type_properties(&self) -> Vec<PropertyDef> {
        let mut props = Vec::new();
        if self.name.is_some() {
            props.push(PropertyDef::new_unchecked("string", "name"));
        }
        if self.version.is_some() {
            props.push(PropertyDef::new_unchecked("string", "version"));
        }
        if self.chain_id.is_some() {
            props.push(PropertyDef::new_unchecked("uint256", "chainId"));
        }
        if self.verifying_contract.is_some() {
            props.push(PropertyDef::new_unchecked("address", "verifyingContract"));
        }
        if self.salt.is_some() {
            props.push(PropertyDef::new_unchecked("bytes32", "salt"));
        }
        props
    }
}

/// Classified form of a property's type string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind<'a> {
    /// A built-in Solidity type (`uint256`, `address`, `string`, ...).
    Primitive(&'a str),
    /// A reference to a declared struct type.
    Struct(&'a str),
    /// An array of another kind, fixed or dynamic length.
    Array(Box<FieldKind<'a>>),
}

impl<'a> FieldKind<'a> {
    /// Classifies `type_name` against the declared `types`.
    ///
    /// Built-in Solidity types win over declared types of the same name, the
    /// same precedence the encoder applies. An undeclared non-primitive is
    /// classified as a primitive here and rejected by [`validate`].
    pub fn of(type_name: &'a str, types: &Eip712Types) -> Self {
        if let Some(stripped) = type_name.strip_suffix(']') {
            if let Some((elem, _)) = stripped.rsplit_once('[') {
                return Self::Array(Box::new(Self::of(elem, types)));
            }
        }
        if DynSolType::parse(type_name).is_ok() {
            Self::Primitive(type_name)
        } else if types.contains_key(type_name) {
            Self::Struct(type_name)
        } else {
            Self::Primitive(type_name)
        }
    }
}

/// Validates the declared `types` and returns the inferred primary type.
///
/// Rejects dangling type references and circular type graphs, and requires
/// that exactly one declared type (`EIP712Domain` aside) is not referenced
/// by any other. All of this runs before any resolver or wallet call.
pub fn validate(types: &Eip712Types) -> Result<String, TypedDataError> {
    let mut referenced = BTreeSet::new();
    for (type_name, props) in types.iter() {
        for prop in props {
            let root = prop.root_type_name();
            if DynSolType::parse(root).is_ok() {
                continue;
            }
            if types.contains_key(root) {
                referenced.insert(root.to_string());
            } else {
                return Err(TypedDataError::UndeclaredType {
                    parent: type_name.clone(),
                    type_name: prop.type_name().to_string(),
                });
            }
        }
    }

    // circular references surface here
    let resolver = Resolver::from(types);
    for name in types.keys() {
        resolver.resolve(name)?;
    }

    let candidates: Vec<String> = types
        .keys()
        .filter(|name| name.as_str() != Eip712Domain::NAME)
        .filter(|name| !referenced.contains(name.as_str()))
        .cloned()
        .collect();
    match candidates.len() {
        0 => Err(TypedDataError::NoPrimaryType),
        1 => Ok(candidates.into_iter().next().expect("len checked")),
        _ => Err(TypedDataError::AmbiguousPrimaryType(candidates)),
    }
}

/// Resolves name references in the domain and message to addresses.
///
/// `address`-typed values (the verifying contract included) that do not
/// parse as addresses are treated as names. Each unique name is resolved
/// once; a resolver failure aborts the whole operation before any signing
/// attempt. With no name references the returned copies are structurally
/// unchanged.
pub async fn resolve_names<R>(
    resolver: &R,
    domain: &TypedDataDomain,
    types: &Eip712Types,
    primary_type: &str,
    message: &Value,
) -> Result<(TypedDataDomain, Value), Error>
where
    R: NameResolver + ?Sized,
{
    let mut names = BTreeSet::new();
    if let Some(contract) = &domain.verifying_contract {
        if contract.parse::<Address>().is_err() {
            names.insert(contract.clone());
        }
    }
    collect_names(&FieldKind::Struct(primary_type), message, types, &mut names);

    let mut resolved = BTreeMap::new();
    for name in names {
        let address = resolver
            .resolve_name(&name)
            .await
            .map_err(|source| Error::Resolve { name: name.clone(), source })?;
        resolved.insert(name, address);
    }

    let mut domain = domain.clone();
    let mut message = message.clone();
    if !resolved.is_empty() {
        if let Some(contract) = &domain.verifying_contract {
            if let Some(address) = resolved.get(contract) {
                domain.verifying_contract = Some(format!("{address:?}"));
            }
        }
        substitute_names(&FieldKind::Struct(primary_type), &mut message, types, &resolved);
    }
    Ok((domain, message))
}

fn collect_names(
    kind: &FieldKind<'_>,
    value: &Value,
    types: &Eip712Types,
    names: &mut BTreeSet<String>,
) {
    match kind {
        FieldKind::Primitive("address") => {
            if let Value::String(s) = value {
                if s.parse::<Address>().is_err() {
                    names.insert(s.clone());
                }
            }
        }
        FieldKind::Primitive(_) => {}
        FieldKind::Struct(name) => {
            let Some(props) = types.get(*name) else { return };
            let Value::Object(fields) = value else { return };
            for prop in props {
                if let Some(field) = fields.get(prop.name()) {
                    collect_names(&FieldKind::of(prop.type_name(), types), field, types, names);
                }
            }
        }
        FieldKind::Array(elem) => {
            if let Value::Array(items) = value {
                for item in items {
                    collect_names(elem, item, types, names);
                }
            }
        }
    }
}

fn substitute_names(
    kind: &FieldKind<'_>,
    value: &mut Value,
    types: &Eip712Types,
    resolved: &BTreeMap<String, Address>,
) {
    match kind {
        FieldKind::Primitive("address") => {
            if let Value::String(s) = value {
                if let Some(address) = resolved.get(s.as_str()) {
                    *value = Value::String(format!("{address:?}"));
                }
            }
        }
        FieldKind::Primitive(_) => {}
        FieldKind::Struct(name) => {
            let Some(props) = types.get(*name) else { return };
            let Value::Object(fields) = value else { return };
            for prop in props {
                if let Some(field) = fields.get_mut(prop.name()) {
                    substitute_names(&FieldKind::of(prop.type_name(), types), field, types, resolved);
                }
            }
        }
        FieldKind::Array(elem) => {
            if let Value::Array(items) = value {
                for item in items {
                    substitute_names(elem, item, types, resolved);
                }
            }
        }
    }
}

/// Serializes the full signing payload the way wallets expect it: declared
/// types plus a synthesized `EIP712Domain` entry, the domain, the primary
/// type and the message.
///
/// The output is deterministic, and integers keep their exact decimal form
/// no matter how large.
pub fn encode_payload(
    domain: &TypedDataDomain,
    types: &Eip712Types,
    primary_type: &str,
    message: &Value,
) -> Result<String, TypedDataError> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload<'a> {
        types: &'a Eip712Types,
        domain: &'a TypedDataDomain,
        primary_type: &'a str,
        message: &'a Value,
    }

    let mut types = types.clone();
    types.insert(Eip712Domain::NAME.to_string(), domain.type_properties());
    Ok(serde_json::to_string(&Payload { types: &types, domain, primary_type, message })?)
}

/// Computes the EIP-712 signing hash (`0x1901 ‖ domainSeparator ‖
/// hashStruct(message)`) used by the `eth_sign` fallback.
pub fn encode_digest(
    domain: &TypedDataDomain,
    types: &Eip712Types,
    primary_type: &str,
    message: &Value,
) -> Result<B256, TypedDataError> {
    let typed = TypedData {
        domain: domain.to_eip712()?,
        resolver: Resolver::from(types),
        primary_type: primary_type.to_string(),
        message: message.clone(),
    };
    Ok(typed.eip712_signing_hash()?)
}

/// Errors produced while validating or encoding typed data.
#[derive(Debug, thiserror::Error)]
pub enum TypedDataError {
    /// A property references a type that is neither declared nor a built-in
    /// Solidity type.
    #[error("type `{parent}` references undeclared type `{type_name}`")]
    UndeclaredType {
        /// The declared type holding the offending property.
        parent: String,
        /// The property's type string.
        type_name: String,
    },
    /// Every declared type is referenced by another, so none qualifies as
    /// the primary type.
    #[error("no primary type: every declared type is referenced by another")]
    NoPrimaryType,
    /// More than one declared type is unreferenced.
    #[error("ambiguous primary type: {}", .0.join(", "))]
    AmbiguousPrimaryType(Vec<String>),
    /// The verifying contract is neither an address nor a resolved name.
    #[error("invalid verifying contract `{0}`")]
    InvalidVerifyingContract(String),
    /// Type graph or message errors reported by the encoder.
    #[error(transparent)]
    Encode(#[from] alloy_dyn_abi::Error),
    /// Payload serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
