// src/services/subject_registry.rs
//! Subject registry: maps a credential subtype tag to its subject schema.
//!
//! Credentials that arrive from untyped sources carry their subject as a raw
//! JSON map. Before verification or business use the registry converts that
//! map into the concrete payload type selected by the credential's second
//! `type` entry. Unknown tags are an error, never a silent pass-through.
//!
//! The set of schemas is open: a new subtype implements [`SubjectKind`] and is
//! registered once with [`SubjectRegistry::register`].

use crate::error::SubjectError;
use crate::models::credential::VerifiableCredential;
use crate::models::subject::{
    CredentialSubject, MiningLicenseInfo, SubjectInfo, SubjectKind, WifiAccessInfo,
};
use serde::de::Error as _;
use serde_json::Value;
use std::collections::HashMap;

type Converter = fn(Value) -> Result<CredentialSubject, serde_json::Error>;

/// A registered subject schema.
#[derive(Clone, Copy)]
pub struct SubjectSchema {
    pub type_tag: &'static str,
    pub description: &'static str,
    convert: Converter,
}

impl SubjectSchema {
    fn of<T: SubjectKind>() -> Self {
        SubjectSchema {
            type_tag: T::TYPE_TAG,
            description: T::DESCRIPTION,
            convert: convert_as::<T>,
        }
    }
}

fn convert_as<T: SubjectKind>(raw: Value) -> Result<CredentialSubject, serde_json::Error> {
    let payload: T = serde_json::from_value(raw)?;
    Ok(CredentialSubject::typed(payload))
}

#[derive(Clone)]
pub struct SubjectRegistry {
    schemas: HashMap<&'static str, SubjectSchema>,
}

impl SubjectRegistry {
    /// A registry with no schemas.
    pub fn empty() -> Self {
        SubjectRegistry {
            schemas: HashMap::new(),
        }
    }

    /// Registers `T` under its type tag, replacing any earlier schema for it.
    pub fn register<T: SubjectKind>(&mut self) -> &mut Self {
        self.schemas.insert(T::TYPE_TAG, SubjectSchema::of::<T>());
        self
    }

    pub fn is_registered(&self, type_tag: &str) -> bool {
        self.schemas.contains_key(type_tag)
    }

    /// Looks up the schema for a subtype tag.
    pub fn resolve_subject_type(&self, type_tag: &str) -> Result<&SubjectSchema, SubjectError> {
        self.schemas
            .get(type_tag)
            .ok_or_else(|| SubjectError::UnknownCredentialType(type_tag.to_string()))
    }

    /// Converts a subject (raw or typed) into the payload type registered
    /// for `type_tag`.
    pub fn convert(
        &self,
        type_tag: &str,
        subject: &CredentialSubject,
    ) -> Result<CredentialSubject, SubjectError> {
        let schema = self.resolve_subject_type(type_tag)?;
        let conversion_error = |source| SubjectError::Conversion {
            tag: type_tag.to_string(),
            source,
        };
        let raw = subject.to_value().map_err(conversion_error)?;
        if !raw.is_object() {
            // derived structs also accept sequences, filled by position
            return Err(conversion_error(serde_json::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&raw)
            ))));
        }
        (schema.convert)(raw).map_err(conversion_error)
    }

    /// Converts a credential's subject in place, dispatching on its subtype
    /// tag, and brings the `subtype` mirror in line with `type[1]`.
    pub fn convert_credential(&self, vc: &mut VerifiableCredential) -> Result<(), SubjectError> {
        let type_tag = vc.subtype_tag().to_string();
        vc.credential_subject = self.convert(&type_tag, &vc.credential_subject)?;
        vc.subtype = type_tag;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Default for SubjectRegistry {
    /// The built-in WifiAccess, MiningLicense and PermanentResidentCard schemas.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register::<WifiAccessInfo>()
            .register::<MiningLicenseInfo>()
            .register::<SubjectInfo>();
        registry
    }
}
