// src/services/credential_issuer.rs
//! Credential Lifecycle Service
//!
//! Issues, renews and revokes verifiable credentials.
//!
//! ```text
//! Unissued -> Issued -> Renewed* -> Revoked (terminal)
//! ```
//!
//! Every mutation follows the same commit pattern: build the updated
//! credential on a copy, persist it, and only then replace the caller's
//! value. A failure anywhere before the store confirms leaves both the
//! persisted record and the caller's credential untouched.

use crate::contracts::credential_registry::RevocationRegistry;
use crate::error::{DocumentError, ExternalCollaboratorError, LifecycleError};
use crate::models::credential::{
    VCProof, VerifiableCredential, CONTEXT_CREDENTIALS_V1, CONTEXT_SECP256K1_2019,
    CREDENTIAL_TYPE, PROOF_PURPOSE, PROOF_TYPE,
};
use crate::models::did::DIDDocument;
use crate::models::presentation::VerifiablePresentation;
use crate::models::subject::{
    CredentialSubject, MiningLicenseInfo, SubjectInfo, SubjectKind, WifiAccessInfo,
};
use crate::services::subject_registry::SubjectRegistry;
use crate::services::verifier::{verify_vc_secp256k1, Verifier};
use crate::settings::Settings;
use crate::storage::credential_store::CredentialStore;
use crate::utils::canonical;
use crate::utils::crypto::hash_data;
use crate::wallet::key_management::CredentialSigner;
use chrono::{DateTime, FixedOffset, Months, SecondsFormat, SubsecRound, Utc};
use log::{info, warn};
use std::sync::Arc;

/// Outcome of a committed revocation.
#[derive(Debug)]
pub struct RevocationReceipt {
    pub credential_id: String,

    /// SHA-256 of the credential's canonical bytes, as sent to the registry
    pub digest: [u8; 32],

    /// Set when the external registry could not be notified. The local
    /// revocation stands regardless.
    pub registry_warning: Option<ExternalCollaboratorError>,
}

/// Service that owns the `expirationDate`, `proof` and `revoked` fields of
/// the credentials it manages.
#[derive(Clone)]
pub struct CredentialIssuer {
    store: Arc<dyn CredentialStore>,
    registry: Option<Arc<dyn RevocationRegistry>>,
    subjects: Arc<SubjectRegistry>,
    settings: Settings,
}

impl CredentialIssuer {
    /// Creates a new CredentialIssuer instance
    ///
    /// # Arguments
    /// * `store` - Durable credential storage
    /// * `registry` - Optional external revocation registry, notified best-effort
    /// * `subjects` - Subject schemas accepted for issuance
    /// * `settings` - Validity windows, id prefix and renewal policy
    pub fn new(
        store: Arc<dyn CredentialStore>,
        registry: Option<Arc<dyn RevocationRegistry>>,
        subjects: Arc<SubjectRegistry>,
        settings: Settings,
    ) -> Self {
        CredentialIssuer {
            store,
            registry,
            subjects,
            settings,
        }
    }

    /// Issues a credential of subtype `subtype_tag` for `subject`, signed by
    /// the issuer's authentication key.
    ///
    /// # Errors
    /// - `DocumentError::KeyMismatch` if `signer` is not the key behind the
    ///   issuer document's authentication method
    /// - `SubjectError::UnknownCredentialType` for an unregistered subtype
    /// - `ExternalCollaboratorError::Store` if the credential cannot be persisted
    pub async fn issue(
        &self,
        issuer: &DIDDocument,
        subject: CredentialSubject,
        signer: &dyn CredentialSigner,
        subtype_tag: &str,
    ) -> Result<VerifiableCredential, LifecycleError> {
        let method = issuer.authentication_method()?;
        if method.public_key()? != signer.verifying_key() {
            return Err(DocumentError::KeyMismatch(method.id.clone()).into());
        }

        let schema = self.subjects.resolve_subject_type(subtype_tag)?;
        let credential_subject = self.subjects.convert(subtype_tag, &subject)?;

        let number = self
            .store
            .allocate_id()
            .await
            .map_err(ExternalCollaboratorError::Store)?;
        let issued_at = now();
        let expiration = add_months(issued_at, self.settings.issuance_validity_years * 12)?;

        let mut vc = VerifiableCredential {
            context: vec![
                CONTEXT_CREDENTIALS_V1.to_string(),
                CONTEXT_SECP256K1_2019.to_string(),
            ],
            id: format!("{}{}", self.settings.credential_id_base, number),
            vc_type: vec![CREDENTIAL_TYPE.to_string(), subtype_tag.to_string()],
            subtype: subtype_tag.to_string(),
            issuer: issuer.id.clone(),
            issuance_date: format_date(&issued_at, true),
            expiration_date: format_date(&expiration, true),
            description: schema.description.to_string(),
            credential_subject,
            proof: VCProof {
                proof_type: PROOF_TYPE.to_string(),
                created: format_date(&issued_at, true),
                verification_method: method.id.clone(),
                proof_purpose: PROOF_PURPOSE.to_string(),
                jws_signature: String::new(),
            },
            revoked: false,
        };
        let message = canonical::encode(&vc)?;
        vc.proof.jws_signature = signer.sign(&message)?;

        self.store
            .save_credential(&vc)
            .await
            .map_err(ExternalCollaboratorError::Store)?;
        info!("issued {} credential {} by {}", subtype_tag, vc.id, vc.issuer);
        Ok(vc)
    }

    pub async fn issue_wifi_access(
        &self,
        issuer: &DIDDocument,
        info: WifiAccessInfo,
        signer: &dyn CredentialSigner,
    ) -> Result<VerifiableCredential, LifecycleError> {
        self.issue(issuer, CredentialSubject::typed(info), signer, WifiAccessInfo::TYPE_TAG)
            .await
    }

    pub async fn issue_mining_license(
        &self,
        issuer: &DIDDocument,
        info: MiningLicenseInfo,
        signer: &dyn CredentialSigner,
    ) -> Result<VerifiableCredential, LifecycleError> {
        self.issue(issuer, CredentialSubject::typed(info), signer, MiningLicenseInfo::TYPE_TAG)
            .await
    }

    pub async fn issue_identity(
        &self,
        issuer: &DIDDocument,
        info: SubjectInfo,
        signer: &dyn CredentialSigner,
    ) -> Result<VerifiableCredential, LifecycleError> {
        self.issue(issuer, CredentialSubject::typed(info), signer, SubjectInfo::TYPE_TAG)
            .await
    }

    /// Extends `vc` by the renewal window and re-signs it.
    ///
    /// The new expiration is the *current* expiration plus
    /// `renewal_validity_months`, keeping its UTC offset, so repeated
    /// renewals stack. The old proof is replaced together with the date.
    ///
    /// # Errors
    /// - `LifecycleError::Revoked` if the credential is revoked
    /// - `LifecycleError::InvalidProof` if its current proof does not verify
    ///   against `signer`
    /// - `LifecycleError::ExpiredBeyondRenewal` if it has expired and
    ///   `allow_expired_renewal` is off
    pub async fn renew(
        &self,
        vc: &mut VerifiableCredential,
        signer: &dyn CredentialSigner,
    ) -> Result<(), LifecycleError> {
        if vc.revoked {
            return Err(LifecycleError::Revoked(vc.id.clone()));
        }

        let mut renewed = vc.clone();
        self.subjects.convert_credential(&mut renewed)?;
        if !verify_vc_secp256k1(&renewed, &signer.verifying_key())? {
            return Err(LifecycleError::InvalidProof(vc.id.clone()));
        }

        let expiration = parse_date(&renewed.expiration_date)?;
        if !self.settings.allow_expired_renewal && expiration < Utc::now() {
            return Err(LifecycleError::ExpiredBeyondRenewal {
                id: vc.id.clone(),
                expired_at: renewed.expiration_date.clone(),
            });
        }
        let extended = add_months(expiration, self.settings.renewal_validity_months)?;
        renewed.expiration_date = format_date(&extended, renewed.expiration_date.ends_with('Z'));

        renewed.proof.created = format_date(&now(), true);
        renewed.proof.jws_signature = String::new();
        let message = canonical::encode(&renewed)?;
        renewed.proof.jws_signature = signer.sign(&message)?;

        self.store
            .save_credential(&renewed)
            .await
            .map_err(ExternalCollaboratorError::Store)?;
        info!("renewed credential {} until {}", renewed.id, renewed.expiration_date);
        *vc = renewed;
        Ok(())
    }

    /// Marks `vc` revoked and persists the flag. The proof is not touched.
    ///
    /// Once the flag is durable, the external registry (if any) is notified
    /// with the credential digest. A notification failure is returned in
    /// [`RevocationReceipt::registry_warning`] and does not undo the revocation.
    pub async fn revoke(
        &self,
        vc: &mut VerifiableCredential,
    ) -> Result<RevocationReceipt, LifecycleError> {
        if vc.revoked {
            return Err(LifecycleError::Revoked(vc.id.clone()));
        }
        let digest = credential_digest(vc)?;

        let mut revoked = vc.clone();
        revoked.revoked = true;
        self.store
            .save_credential(&revoked)
            .await
            .map_err(ExternalCollaboratorError::Store)?;
        *vc = revoked;
        info!("revoked credential {}", vc.id);

        let registry_warning = match &self.registry {
            Some(registry) => match registry.register_revocation(digest).await {
                Ok(()) => None,
                Err(e) => {
                    warn!("revocation registry not notified for {}: {:#}", vc.id, e);
                    Some(ExternalCollaboratorError::Registry(e))
                }
            },
            None => None,
        };

        Ok(RevocationReceipt {
            credential_id: vc.id.clone(),
            digest,
            registry_warning,
        })
    }

    /// Loads a stored credential and renews it.
    pub async fn renew_by_id(
        &self,
        id: &str,
        signer: &dyn CredentialSigner,
    ) -> Result<VerifiableCredential, LifecycleError> {
        let mut vc = self.load(id).await?;
        self.renew(&mut vc, signer).await?;
        Ok(vc)
    }

    /// Loads a stored credential and revokes it.
    pub async fn revoke_by_id(
        &self,
        id: &str,
    ) -> Result<(VerifiableCredential, RevocationReceipt), LifecycleError> {
        let mut vc = self.load(id).await?;
        let receipt = self.revoke(&mut vc).await?;
        Ok((vc, receipt))
    }

    /// Verifies `vp` (nonce first) and revokes the stored record of its
    /// first credential.
    // TODO: let the caller pick which embedded credential to revoke once
    // multi-credential revocation requests are defined.
    pub async fn revoke_presented(
        &self,
        verifier: &Verifier,
        vp: &VerifiablePresentation,
        client_key: &str,
    ) -> Result<(VerifiableCredential, RevocationReceipt), LifecycleError> {
        let mut vc = self.first_presented(verifier, vp, client_key).await?;
        let receipt = self.revoke(&mut vc).await?;
        Ok((vc, receipt))
    }

    /// Verifies `vp` (nonce first) and renews the stored record of its
    /// first credential.
    pub async fn renew_presented(
        &self,
        verifier: &Verifier,
        vp: &VerifiablePresentation,
        client_key: &str,
        signer: &dyn CredentialSigner,
    ) -> Result<VerifiableCredential, LifecycleError> {
        let mut vc = self.first_presented(verifier, vp, client_key).await?;
        self.renew(&mut vc, signer).await?;
        Ok(vc)
    }

    /// Verifies `vp` and returns the stored record of its first credential.
    ///
    /// The presented copy only proves possession. The lifecycle change is
    /// applied to the stored record, so a stale copy can neither undo a
    /// revocation nor roll back a renewal.
    async fn first_presented(
        &self,
        verifier: &Verifier,
        vp: &VerifiablePresentation,
        client_key: &str,
    ) -> Result<VerifiableCredential, LifecycleError> {
        if !verifier.verify_presentation(vp, client_key).await? {
            return Err(LifecycleError::PresentationRejected);
        }
        let mut presented = vp
            .verifiable_credential
            .first()
            .cloned()
            .ok_or(LifecycleError::EmptyPresentation)?;
        self.subjects.convert_credential(&mut presented)?;

        let stored = self.load(&presented.id).await?;
        if stored.issuer != presented.issuer
            || stored.credential_subject != presented.credential_subject
        {
            warn!("presented credential {} does not match the stored record", presented.id);
            return Err(LifecycleError::CredentialMismatch(presented.id));
        }
        Ok(stored)
    }

    async fn load(&self, id: &str) -> Result<VerifiableCredential, LifecycleError> {
        let mut vc = self
            .store
            .load_credential(id)
            .await
            .map_err(ExternalCollaboratorError::Store)?;
        self.subjects.convert_credential(&mut vc)?;
        Ok(vc)
    }
}

/// SHA-256 of the credential's canonical bytes.
pub fn credential_digest(vc: &VerifiableCredential) -> Result<[u8; 32], LifecycleError> {
    Ok(hash_data(&canonical::encode(vc)?))
}

fn parse_date(value: &str) -> Result<DateTime<FixedOffset>, LifecycleError> {
    DateTime::parse_from_rfc3339(value).map_err(|e| LifecycleError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Calendar-month addition; a day past the end of the target month clamps
/// to its last day.
fn add_months(
    date: DateTime<FixedOffset>,
    months: u32,
) -> Result<DateTime<FixedOffset>, LifecycleError> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LifecycleError::InvalidDate {
            value: date.to_rfc3339(),
            reason: format!("adding {} months overflows", months),
        })
}

fn format_date(date: &DateTime<FixedOffset>, use_z: bool) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, use_z)
}

/// Current time at whole-second precision.
fn now() -> DateTime<FixedOffset> {
    Utc::now().trunc_subsecs(0).fixed_offset()
}
