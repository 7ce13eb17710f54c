// src/services/verifier.rs
//! Credential and presentation verification.
//!
//! A presentation is accepted only if all of these hold:
//! 1. its nonce is the live nonce issued to the presenting client (consumed first, unconditionally)
//! 2. every embedded credential converts to its registered subject schema,
//!    is not revoked, and verifies against its issuer's resolved key
//! 3. the holder's proof verifies over the presentation exactly as received
//!
//! Verdicts are `Ok(true)` / `Ok(false)`. `Err` means verification could not
//! run (or, for the nonce, that the challenge was invalid).

use crate::contracts::did_registry::DidResolver;
use crate::error::{
    ExternalCollaboratorError, PresentationError, SignatureError, VerificationError,
};
use crate::models::credential::VerifiableCredential;
use crate::models::presentation::VerifiablePresentation;
use crate::services::nonce::NonceStore;
use crate::services::subject_registry::SubjectRegistry;
use crate::utils::canonical;
use crate::wallet::key_management::verify_bytes;
use k256::ecdsa::VerifyingKey;
use log::{debug, info, warn};
use std::sync::Arc;

/// Checks a credential's proof against `public_key`, re-deriving the
/// canonical bytes from the credential's current state.
///
/// The subject must already be in its typed form (see
/// [`SubjectRegistry::convert_credential`]).
pub fn verify_vc_secp256k1(
    vc: &VerifiableCredential,
    public_key: &VerifyingKey,
) -> Result<bool, VerificationError> {
    let message = canonical::encode(vc)?;
    Ok(verify_bytes(&message, &vc.proof.jws_signature, public_key)?)
}

/// Checks a presentation's holder proof against `public_key`.
pub fn verify_vp_secp256k1(
    vp: &VerifiablePresentation,
    public_key: &VerifyingKey,
) -> Result<bool, VerificationError> {
    let message = canonical::encode(vp)?;
    Ok(verify_bytes(&message, &vp.proof.jws_signature, public_key)?)
}

/// Verification service wired to its collaborators.
#[derive(Clone)]
pub struct Verifier {
    resolver: Arc<dyn DidResolver>,
    nonces: Arc<dyn NonceStore>,
    subjects: Arc<SubjectRegistry>,
}

impl Verifier {
    pub fn new(
        resolver: Arc<dyn DidResolver>,
        nonces: Arc<dyn NonceStore>,
        subjects: Arc<SubjectRegistry>,
    ) -> Self {
        Verifier {
            resolver,
            nonces,
            subjects,
        }
    }

    /// Resolves `did` and returns the key its document declares under `method_id`.
    pub async fn resolve_public_key(
        &self,
        did: &str,
        method_id: &str,
    ) -> Result<VerifyingKey, VerificationError> {
        let document = self
            .resolver
            .resolve_did(did)
            .await
            .map_err(ExternalCollaboratorError::from)?;
        Ok(document.public_key_for(method_id)?)
    }

    /// Verifies a single credential's issuer signature.
    ///
    /// The credential is converted to its typed subject first, so untyped
    /// input from request bodies is checked against the schema it claims.
    /// Revocation status is not consulted here; see [`Verifier::verify_presentation`].
    pub async fn verify_credential(
        &self,
        vc: &VerifiableCredential,
    ) -> Result<bool, VerificationError> {
        let mut typed = vc.clone();
        self.subjects.convert_credential(&mut typed)?;
        let key = self
            .resolve_public_key(&typed.issuer, &typed.proof.verification_method)
            .await?;
        verify_vc_secp256k1(&typed, &key)
    }

    /// Verifies a presentation submitted by `client_key`.
    ///
    /// # Errors
    /// - `PresentationError::InvalidNonce` if the nonce is missing, wrong,
    ///   expired or already used; no signature work is done in that case
    /// - other variants if a collaborator failed or a signature is malformed
    pub async fn verify_presentation(
        &self,
        vp: &VerifiablePresentation,
        client_key: &str,
    ) -> Result<bool, PresentationError> {
        if !self.nonces.consume(client_key, &vp.proof.nonce).await? {
            warn!("rejected presentation from {}: invalid nonce", client_key);
            return Err(PresentationError::InvalidNonce(client_key.to_string()));
        }

        for vc in &vp.verifiable_credential {
            if vc.revoked {
                warn!("rejected presentation from {}: credential {} is revoked", client_key, vc.id);
                return Ok(false);
            }
            if !self.verify_credential(vc).await? {
                warn!(
                    "rejected presentation from {}: credential {} failed verification",
                    client_key, vc.id
                );
                return Ok(false);
            }
            debug!("credential {} verified", vc.id);
        }

        let holder_key = self
            .resolve_public_key(&vp.holder, &vp.proof.verification_method)
            .await?;
        if !verify_vp_secp256k1(vp, &holder_key)? {
            warn!("rejected presentation from {}: holder proof failed", client_key);
            return Ok(false);
        }

        info!(
            "verified presentation from {} by {} with {} credential(s)",
            client_key,
            vp.holder,
            vp.verifiable_credential.len()
        );
        Ok(true)
    }
}

/// Distinguishes a malformed signature (data corruption) from other failures.
pub fn is_malformed(err: &VerificationError) -> bool {
    matches!(
        err,
        VerificationError::Signature(SignatureError::MalformedSignature(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DocumentError, ResolveError};
    use crate::models::fixtures;
    use crate::services::holder::Holder;
    use crate::services::nonce::MemoryNonceStore;
    use std::time::Duration;

    const CLIENT: &str = "192.168.1.20";

    fn verifier() -> (Verifier, Arc<MemoryNonceStore>) {
        let nonces = Arc::new(MemoryNonceStore::new(Duration::from_secs(300)));
        let verifier = Verifier::new(
            Arc::new(fixtures::resolver()),
            nonces.clone(),
            Arc::new(SubjectRegistry::default()),
        );
        (verifier, nonces)
    }

    fn present(vcs: Vec<VerifiableCredential>, nonce: &str) -> VerifiablePresentation {
        Holder::new(&fixtures::holder_document(), &fixtures::holder_key())
            .present(vcs, nonce)
            .unwrap()
    }

    #[test]
    fn test_verify_vc_correct_and_wrong_key() {
        let vc = fixtures::signed_wifi_access_vc();
        let other = crate::wallet::key_management::KeyManager::new();

        assert!(verify_vc_secp256k1(&vc, &fixtures::issuer_key().public_key).unwrap());
        assert!(!verify_vc_secp256k1(&vc, &other.public_key).unwrap());
    }

    #[test]
    fn test_tampered_type_fails() {
        let mut vc = fixtures::signed_wifi_access_vc();
        vc.vc_type.push("Modified".to_string());

        assert!(!verify_vc_secp256k1(&vc, &fixtures::issuer_key().public_key).unwrap());
    }

    #[test]
    fn test_tampered_subject_fails() {
        let mut vc = fixtures::signed_wifi_access_vc();
        let mut info = fixtures::sample_wifi_access_info();
        info.access_type = "Validator".to_string();
        vc.credential_subject = crate::models::subject::CredentialSubject::typed(info);

        assert!(!verify_vc_secp256k1(&vc, &fixtures::issuer_key().public_key).unwrap());
    }

    #[test]
    fn test_malformed_signature_is_error() {
        let mut vc = fixtures::signed_wifi_access_vc();
        vc.proof.jws_signature = "not a signature".to_string();

        let err = verify_vc_secp256k1(&vc, &fixtures::issuer_key().public_key).unwrap_err();
        assert!(is_malformed(&err));
    }

    #[tokio::test]
    async fn test_verify_credential_from_json() {
        let (verifier, _) = verifier();
        let json = serde_json::to_string(&fixtures::signed_wifi_access_vc()).unwrap();
        let received: VerifiableCredential = serde_json::from_str(&json).unwrap();

        assert!(!received.credential_subject.is_typed());
        assert!(verifier.verify_credential(&received).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_issuer_cannot_run() {
        let (verifier, _) = verifier();
        let mut vc = fixtures::signed_wifi_access_vc();
        vc.issuer = "did:metablox:unknownIssuer".to_string();

        let err = verifier.verify_credential(&vc).await.unwrap_err();
        assert!(matches!(
            err,
            VerificationError::External(ExternalCollaboratorError::Resolve(ResolveError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_foreign_verification_method_cannot_run() {
        let (verifier, _) = verifier();
        let mut vc = fixtures::signed_wifi_access_vc();
        vc.proof.verification_method = "did:metablox:attacker#key".to_string();

        let err = verifier.verify_credential(&vc).await.unwrap_err();
        assert!(matches!(
            err,
            VerificationError::Document(DocumentError::UnknownVerificationMethod { .. })
        ));
    }

    #[tokio::test]
    async fn test_presentation_accepted_then_replay_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (verifier, nonces) = verifier();
        nonces.insert(CLIENT, "sampleNonce").unwrap();
        let vp = present(vec![fixtures::signed_wifi_access_vc()], "sampleNonce");

        assert!(verifier.verify_presentation(&vp, CLIENT).await.unwrap());

        let replay = verifier.verify_presentation(&vp, CLIENT).await;
        assert!(matches!(replay, Err(PresentationError::InvalidNonce(c)) if c == CLIENT));
    }

    #[tokio::test]
    async fn test_presentation_over_the_wire() {
        let (verifier, nonces) = verifier();
        let nonce = nonces.issue(CLIENT).await.unwrap();
        let vp = present(
            vec![fixtures::signed_wifi_access_vc(), fixtures::signed_mining_license_vc()],
            &nonce,
        );
        let json = serde_json::to_vec(&vp).unwrap();
        let received: VerifiablePresentation = serde_json::from_slice(&json).unwrap();

        assert!(verifier.verify_presentation(&received, CLIENT).await.unwrap());
    }

    #[tokio::test]
    async fn test_nonce_checked_before_signatures() {
        let (verifier, nonces) = verifier();
        nonces.insert(CLIENT, "sampleNonce").unwrap();
        let mut vp = present(vec![fixtures::signed_wifi_access_vc()], "otherNonce");
        // would be a hard error if signatures were examined
        vp.proof.jws_signature = "garbage".to_string();

        assert!(matches!(
            verifier.verify_presentation(&vp, CLIENT).await,
            Err(PresentationError::InvalidNonce(_))
        ));
        // mismatch burned the stored nonce too
        assert!(nonces.is_empty());
    }

    #[tokio::test]
    async fn test_other_clients_nonce_rejected() {
        let (verifier, nonces) = verifier();
        nonces.insert("client-a", "sampleNonce").unwrap();
        let vp = present(vec![fixtures::signed_wifi_access_vc()], "sampleNonce");

        assert!(matches!(
            verifier.verify_presentation(&vp, "client-b").await,
            Err(PresentationError::InvalidNonce(_))
        ));
    }

    #[tokio::test]
    async fn test_one_bad_credential_fails_all() {
        let (verifier, nonces) = verifier();
        nonces.insert(CLIENT, "sampleNonce").unwrap();
        let mut forged = fixtures::signed_mining_license_vc();
        forged.expiration_date = "2099-01-01T00:00:00Z".to_string();
        let vp = present(vec![fixtures::signed_wifi_access_vc(), forged], "sampleNonce");

        assert!(!verifier.verify_presentation(&vp, CLIENT).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoked_credential_fails() {
        let (verifier, nonces) = verifier();
        nonces.insert(CLIENT, "sampleNonce").unwrap();
        let mut revoked = fixtures::signed_wifi_access_vc();
        revoked.revoked = true;
        // the issuance signature itself is still intact
        assert!(verify_vc_secp256k1(&revoked, &fixtures::issuer_key().public_key).unwrap());

        let vp = present(vec![revoked], "sampleNonce");
        assert!(!verifier.verify_presentation(&vp, CLIENT).await.unwrap());
    }

    #[tokio::test]
    async fn test_tampered_holder_proof_fails() {
        let (verifier, nonces) = verifier();
        nonces.insert(CLIENT, "sampleNonce").unwrap();
        let mut vp = present(vec![fixtures::signed_wifi_access_vc()], "sampleNonce");
        vp.vp_type.push("Modified".to_string());

        assert!(!verifier.verify_presentation(&vp, CLIENT).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_subtype_in_presentation_is_error() {
        let (verifier, nonces) = verifier();
        nonces.insert(CLIENT, "sampleNonce").unwrap();
        let mut vc = fixtures::signed_wifi_access_vc();
        vc.vc_type = vec!["VerifiableCredential".to_string(), "UnknownKind".to_string()];
        let vp = present(vec![vc], "sampleNonce");

        assert!(matches!(
            verifier.verify_presentation(&vp, CLIENT).await,
            Err(PresentationError::Verification(VerificationError::Subject(_)))
        ));
    }
}
