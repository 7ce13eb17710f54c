// src/services/holder.rs
//! Holder side of the presentation protocol.
//!
//! Wraps credentials into a presentation bound to the verifier's nonce and
//! signs it with the holder's authentication key.

use crate::error::{DocumentError, PresentationError};
use crate::models::credential::{
    VerifiableCredential, CONTEXT_CREDENTIALS_V1, CONTEXT_SECP256K1_2019, PROOF_PURPOSE,
    PROOF_TYPE,
};
use crate::models::did::DIDDocument;
use crate::models::presentation::{VPProof, VerifiablePresentation, PRESENTATION_TYPE};
use crate::utils::canonical;
use crate::wallet::key_management::CredentialSigner;
use chrono::{SecondsFormat, Utc};

pub struct Holder<'a> {
    document: &'a DIDDocument,
    signer: &'a dyn CredentialSigner,
}

impl<'a> Holder<'a> {
    pub fn new(document: &'a DIDDocument, signer: &'a dyn CredentialSigner) -> Self {
        Holder { document, signer }
    }

    /// Builds and signs a presentation of `credentials` answering `nonce`.
    ///
    /// # Errors
    /// `DocumentError::KeyMismatch` if the signer is not the key behind the
    /// holder document's authentication method.
    pub fn present(
        &self,
        credentials: Vec<VerifiableCredential>,
        nonce: &str,
    ) -> Result<VerifiablePresentation, PresentationError> {
        let method = self.document.authentication_method()?;
        if method.public_key()? != self.signer.verifying_key() {
            return Err(DocumentError::KeyMismatch(method.id.clone()).into());
        }

        let mut vp = VerifiablePresentation {
            context: vec![
                CONTEXT_CREDENTIALS_V1.to_string(),
                CONTEXT_SECP256K1_2019.to_string(),
            ],
            vp_type: vec![PRESENTATION_TYPE.to_string()],
            verifiable_credential: credentials,
            holder: self.document.id.clone(),
            proof: VPProof {
                proof_type: PROOF_TYPE.to_string(),
                created: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                verification_method: method.id.clone(),
                proof_purpose: PROOF_PURPOSE.to_string(),
                jws_signature: String::new(),
                nonce: nonce.to_string(),
            },
        };
        let message = canonical::encode(&vp)?;
        vp.proof.jws_signature = self.signer.sign(&message)?;
        Ok(vp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use crate::services::verifier::verify_vp_secp256k1;
    use crate::wallet::key_management::KeyManager;

    #[test]
    fn test_presentation_shape() {
        let document = fixtures::holder_document();
        let key = fixtures::holder_key();
        let vp = Holder::new(&document, &key)
            .present(vec![fixtures::signed_wifi_access_vc()], "sampleNonce")
            .unwrap();

        assert_eq!(vp.holder, document.id);
        assert_eq!(vp.vp_type, vec!["VerifiablePresentation".to_string()]);
        assert_eq!(vp.proof.nonce, "sampleNonce");
        assert_eq!(vp.proof.verification_method, document.authentication);
        assert!(verify_vp_secp256k1(&vp, &key.public_key).unwrap());
    }

    #[test]
    fn test_foreign_key_rejected() {
        let document = fixtures::holder_document();
        let stranger = KeyManager::new();

        let err = Holder::new(&document, &stranger)
            .present(vec![], "sampleNonce")
            .unwrap_err();
        assert!(matches!(
            err,
            PresentationError::Document(DocumentError::KeyMismatch(_))
        ));
    }
}
