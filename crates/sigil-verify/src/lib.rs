//! Offline verification of Sigstore bundles
//!
//! Given a signed artifact bundle and trust material, decides whether the
//! bundle is authentic, produced by an authorized signer, and witnessed
//! by trusted transparency and timestamping authorities at a time when
//! all signing material was valid. Verification is offline: everything
//! needed is embedded in the bundle or the trust material.
//!
//! # Example
//!
//! ```no_run
//! use sigil_trust::{TrustMaterial, TrustedRoot};
//! use sigil_types::Bundle;
//! use sigil_verify::{CertificateIdentity, Verifier};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let root = TrustedRoot::from_json(&std::fs::read_to_string("trusted_root.json")?)?;
//! let verifier = Verifier::new(TrustMaterial::from_trusted_root(&root)?);
//!
//! let bundle = Bundle::from_json(&std::fs::read_to_string("artifact.sigstore.json")?)?;
//! let artifact = std::fs::read("artifact.txt")?;
//!
//! let policy = CertificateIdentity::new("dev@example.com")
//!     .with_issuer("https://accounts.google.com");
//!
//! verifier.verify(Some(&artifact), &bundle, Some(&policy))?;
//! # Ok(())
//! # }
//! ```

mod body;
mod chain;
mod entity;
pub mod error;
pub mod policy;
mod sct;
mod timestamp;
mod tlog;
mod verifier;

// Re-export the workspace crates callers interact with.
pub use sigil_crypto as crypto;
pub use sigil_merkle as merkle;
pub use sigil_rekor as rekor;
pub use sigil_trust as trust;
pub use sigil_tsa as tsa;
pub use sigil_types as types;

pub use error::{Result, VerifyError};
pub use policy::{CertificateIdentity, ExtensionRequirement};
pub use timestamp::{TimestampSource, VerifiedTimestamp};
pub use verifier::{Verifier, VerifierConfig};

use sigil_trust::TrustMaterial;
use sigil_types::Bundle;

/// One-shot verification with default thresholds.
pub fn verify(
    artifact: Option<&[u8]>,
    bundle: &Bundle,
    policy: Option<&CertificateIdentity>,
    trust: &TrustMaterial,
) -> Result<()> {
    Verifier::new(trust.clone()).verify(artifact, bundle, policy)
}
