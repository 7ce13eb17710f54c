// src/lib.rs

//! # MetaBlox Credentials - Trust Engine
//!
//! Issues, renews, revokes and verifies W3C-style verifiable credentials
//! signed with secp256k1 keys, and verifies nonce-bound presentations of
//! those credentials.
//!
//! ## Architecture Overview
//! 1. **Models**: DID documents, credentials, presentations and typed subjects
//! 2. **Utils**: Canonical encoding and key/hash helpers
//! 3. **Wallet**: Key management and compact JWS signatures
//! 4. **Services**: Subject registry, lifecycle, nonces, holder and verifier
//! 5. **Contracts / Storage**: Seams for DID resolution, revocation
//!    registries and credential persistence
//!
//! ## Environment Variables
//! All settings are optional; see [`settings::Settings`].
//! - `METABLOX_CREDENTIAL_ID_BASE`: Prefix for issued credential ids
//! - `METABLOX_ISSUANCE_VALIDITY_YEARS`: Validity of a fresh credential (default: 10)
//! - `METABLOX_RENEWAL_VALIDITY_MONTHS`: Extension applied per renewal (default: 12)
//! - `METABLOX_ALLOW_EXPIRED_RENEWAL`: Whether expired credentials may be renewed (default: true)
//! - `METABLOX_NONCE_TTL_SECS`: Lifetime of a presentation nonce (default: 300)

pub mod contracts; // DID resolution and revocation registry seams
pub mod error;
pub mod models; // Data structures
pub mod services; // Lifecycle and verification logic
pub mod settings;
pub mod storage; // Credential persistence
pub mod utils; // Helper functions
pub mod wallet; // Cryptographic key operations

pub use error::{
    DocumentError, EncodingError, ExternalCollaboratorError, LifecycleError, PresentationError,
    RegistrationError, ResolveError, SignatureError, SubjectError, VerificationError,
};
pub use services::credential_issuer::{CredentialIssuer, RevocationReceipt};
pub use services::holder::Holder;
pub use services::verifier::Verifier;
pub use settings::Settings;
