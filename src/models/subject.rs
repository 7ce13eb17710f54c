// src/models/subject.rs
//! Credential subject payloads.
//!
//! A credential's `credentialSubject` takes a different shape for each
//! credential subtype. Payloads arriving from untyped sources (request
//! bodies, storage rows) are held as a raw JSON value until the subject
//! registry converts them into their concrete type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A concrete subject schema, identified by the credential subtype tag
/// that selects it (the second entry of a credential's `type`).
pub trait SubjectKind:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Subtype tag, e.g. "WifiAccess".
    const TYPE_TAG: &'static str;

    /// Description written into credentials issued for this subtype.
    const DESCRIPTION: &'static str;
}

/// Object-safe view over any [`SubjectKind`] value.
pub trait SubjectPayload: fmt::Debug + Send + Sync {
    fn type_tag(&self) -> &'static str;

    fn to_value(&self) -> Result<Value, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: SubjectKind> SubjectPayload for T {
    fn type_tag(&self) -> &'static str {
        T::TYPE_TAG
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The `credentialSubject` of a credential.
///
/// Deserialization always yields [`CredentialSubject::Untyped`]; only the
/// subject registry produces [`CredentialSubject::Typed`].
#[derive(Clone, Debug)]
pub enum CredentialSubject {
    Untyped(Value),
    Typed(Arc<dyn SubjectPayload>),
}

impl CredentialSubject {
    pub fn typed<T: SubjectKind>(payload: T) -> Self {
        CredentialSubject::Typed(Arc::new(payload))
    }

    pub fn is_typed(&self) -> bool {
        matches!(self, CredentialSubject::Typed(_))
    }

    /// Tag of the typed payload, `None` while untyped.
    pub fn type_tag(&self) -> Option<&'static str> {
        match self {
            CredentialSubject::Typed(payload) => Some(payload.type_tag()),
            CredentialSubject::Untyped(_) => None,
        }
    }

    /// Borrows the typed payload if it is a `T`.
    pub fn downcast_ref<T: SubjectKind>(&self) -> Option<&T> {
        match self {
            CredentialSubject::Typed(payload) => payload.as_any().downcast_ref::<T>(),
            CredentialSubject::Untyped(_) => None,
        }
    }

    /// JSON form of the payload, whichever variant holds it.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            CredentialSubject::Untyped(value) => Ok(value.clone()),
            CredentialSubject::Typed(payload) => payload.to_value(),
        }
    }
}

impl Default for CredentialSubject {
    fn default() -> Self {
        CredentialSubject::Untyped(Value::Object(Default::default()))
    }
}

impl PartialEq for CredentialSubject {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_value(), other.to_value()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for CredentialSubject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CredentialSubject::Untyped(value) => value.serialize(serializer),
            CredentialSubject::Typed(payload) => payload
                .to_value()
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CredentialSubject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(CredentialSubject::Untyped)
    }
}

/// Subject of a "WifiAccess" credential.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct WifiAccessInfo {
    pub id: String,
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    /// Access role granted to the device, e.g. "User" or "Validator"
    #[serde(rename = "type")]
    pub access_type: String,
}

impl SubjectKind for WifiAccessInfo {
    const TYPE_TAG: &'static str = "WifiAccess";
    const DESCRIPTION: &'static str = "Example Wifi Access Credential";
}

/// Subject of a "MiningLicense" credential.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct MiningLicenseInfo {
    pub id: String,
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    pub name: String,
    pub model: String,
    pub serial: String,
}

impl SubjectKind for MiningLicenseInfo {
    const TYPE_TAG: &'static str = "MiningLicense";
    const DESCRIPTION: &'static str = "Example Mining License Credential";
}

/// Subject of an identity credential such as a "PermanentResidentCard".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectInfo {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub gender: String,
    pub birth_country: String,
    pub birth_date: String,
}

impl SubjectKind for SubjectInfo {
    const TYPE_TAG: &'static str = "PermanentResidentCard";
    const DESCRIPTION: &'static str = "Government of Example Permanent Resident Card";
}
