// src/models/fixtures.rs
//! Shared test data: fixed keys, sample DID documents and sample credentials.

use crate::contracts::did_registry::MemoryDidRegistry;
use crate::models::credential::{
    VCProof, VerifiableCredential, CONTEXT_CREDENTIALS_V1, CONTEXT_SECP256K1_2019,
    CREDENTIAL_TYPE, PROOF_PURPOSE, PROOF_TYPE,
};
use crate::models::did::{DIDDocument, VerificationMethod};
use crate::models::presentation::{VPProof, VerifiablePresentation, PRESENTATION_TYPE};
use crate::models::subject::{
    CredentialSubject, MiningLicenseInfo, SubjectInfo, SubjectKind, WifiAccessInfo,
};
use crate::utils::canonical;
use crate::wallet::key_management::{CredentialSigner, KeyManager};

pub const TEST_PRIVATE_KEY: [u8; 32] = [
    165, 190, 153, 12, 246, 178, 211, 170, 147, 144, 51, 73, 48, 27, 20, 79, 61, 110, 201, 118,
    99, 219, 50, 252, 135, 12, 107, 237, 245, 95, 170, 17,
];

pub const HOLDER_PRIVATE_KEY: [u8; 32] = [
    17, 42, 201, 88, 3, 119, 250, 64, 9, 187, 33, 140, 76, 222, 5, 98, 134, 61, 200, 14, 91,
    173, 38, 227, 110, 7, 156, 49, 212, 83, 66, 129,
];

pub const HOLDER_DID: &str = "did:metablox:HFXPiudexfvsJBqABNmBp785YwaKGjo95kmDpBxhMMYo";
pub const ISSUER_DID: &str = "did:metablox:sampleIssuer";

const SAMPLE_DATE: &str = "2022-03-31T12:53:19-07:00";
const SAMPLE_EXPIRY: &str = "2032-03-31T12:53:19-07:00";

pub fn issuer_key() -> KeyManager {
    KeyManager::from_bytes(&TEST_PRIVATE_KEY).unwrap()
}

pub fn holder_key() -> KeyManager {
    KeyManager::from_bytes(&HOLDER_PRIVATE_KEY).unwrap()
}

fn document(did: &str, key: &KeyManager) -> DIDDocument {
    let method_id = format!("{}#verification", did);
    DIDDocument {
        context: vec![
            "https://w3id.org/did/v1".to_string(),
            CONTEXT_SECP256K1_2019.to_string(),
        ],
        id: did.to_string(),
        created: SAMPLE_DATE.to_string(),
        updated: SAMPLE_DATE.to_string(),
        version: 1,
        verification_method: vec![VerificationMethod {
            id: method_id.clone(),
            method_type: "EcdsaSecp256k1VerificationKey2019".to_string(),
            controller: did.to_string(),
            public_key_multibase: key.public_key_multibase(),
        }],
        authentication: method_id,
        service: Vec::new(),
    }
}

pub fn holder_document() -> DIDDocument {
    document(HOLDER_DID, &holder_key())
}

pub fn issuer_document() -> DIDDocument {
    document(ISSUER_DID, &issuer_key())
}

/// Resolver that knows the sample holder and issuer.
pub fn resolver() -> MemoryDidRegistry {
    let registry = MemoryDidRegistry::new();
    registry.register(holder_document()).unwrap();
    registry.register(issuer_document()).unwrap();
    registry
}

pub fn sample_wifi_access_info() -> WifiAccessInfo {
    WifiAccessInfo {
        id: HOLDER_DID.to_string(),
        credential_id: "1".to_string(),
        access_type: "User".to_string(),
    }
}

pub fn sample_mining_license_info() -> MiningLicenseInfo {
    MiningLicenseInfo {
        id: HOLDER_DID.to_string(),
        credential_id: "2".to_string(),
        name: "TestName".to_string(),
        model: "TestModel".to_string(),
        serial: "TestSerial".to_string(),
    }
}

pub fn sample_subject_info() -> SubjectInfo {
    SubjectInfo {
        id: HOLDER_DID.to_string(),
        given_name: "JOHN".to_string(),
        family_name: "SMITH".to_string(),
        gender: "Male".to_string(),
        birth_country: "Bahamas".to_string(),
        birth_date: "1958-07-17".to_string(),
    }
}

fn sample_vc<T: SubjectKind>(number: u32, info: T) -> VerifiableCredential {
    VerifiableCredential {
        context: vec![
            CONTEXT_CREDENTIALS_V1.to_string(),
            CONTEXT_SECP256K1_2019.to_string(),
        ],
        id: format!("http://metablox.com/credentials/{}", number),
        vc_type: vec![CREDENTIAL_TYPE.to_string(), T::TYPE_TAG.to_string()],
        subtype: T::TYPE_TAG.to_string(),
        issuer: ISSUER_DID.to_string(),
        issuance_date: SAMPLE_DATE.to_string(),
        expiration_date: SAMPLE_EXPIRY.to_string(),
        description: T::DESCRIPTION.to_string(),
        credential_subject: CredentialSubject::typed(info),
        proof: VCProof {
            proof_type: PROOF_TYPE.to_string(),
            created: SAMPLE_DATE.to_string(),
            verification_method: format!("{}#verification", ISSUER_DID),
            proof_purpose: PROOF_PURPOSE.to_string(),
            jws_signature: "eyJhbGciOiJFUzI1NiJ9..placeholder".to_string(),
        },
        revoked: false,
    }
}

fn signed(mut vc: VerifiableCredential) -> VerifiableCredential {
    vc.proof.jws_signature = String::new();
    let message = canonical::encode(&vc).unwrap();
    vc.proof.jws_signature = issuer_key().sign(&message).unwrap();
    vc
}

/// Unsigned WifiAccess credential with a placeholder proof.
pub fn sample_wifi_access_vc() -> VerifiableCredential {
    sample_vc(1, sample_wifi_access_info())
}

pub fn signed_wifi_access_vc() -> VerifiableCredential {
    signed(sample_wifi_access_vc())
}

pub fn signed_mining_license_vc() -> VerifiableCredential {
    signed(sample_vc(2, sample_mining_license_info()))
}

/// Identity credential signed by the sample issuer with the given expiry.
pub fn signed_identity_vc_expiring(expiration_date: &str) -> VerifiableCredential {
    let mut vc = sample_vc(3, sample_subject_info());
    vc.expiration_date = expiration_date.to_string();
    signed(vc)
}

/// Unsigned presentation of the sample WifiAccess credential.
pub fn sample_presentation() -> VerifiablePresentation {
    VerifiablePresentation {
        context: vec![
            CONTEXT_CREDENTIALS_V1.to_string(),
            CONTEXT_SECP256K1_2019.to_string(),
        ],
        vp_type: vec![PRESENTATION_TYPE.to_string()],
        verifiable_credential: vec![sample_wifi_access_vc()],
        holder: HOLDER_DID.to_string(),
        proof: VPProof {
            proof_type: PROOF_TYPE.to_string(),
            created: SAMPLE_DATE.to_string(),
            verification_method: format!("{}#verification", HOLDER_DID),
            proof_purpose: PROOF_PURPOSE.to_string(),
            jws_signature: "eyJhbGciOiJFUzI1NiJ9..placeholder".to_string(),
            nonce: "sampleNonce".to_string(),
        },
    }
}
