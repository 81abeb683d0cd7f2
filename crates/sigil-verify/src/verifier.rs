//! The verification pipeline
//!
//! Composes the independent proofs into the all-or-nothing decision:
//! signature over the content, witness timestamps, thresholds, key trust
//! at the established time, log body consistency, and finally the
//! caller's identity policy.

use crate::body::{verify_entry_bodies, EntityKeyMaterial};
use crate::chain::verify_certificate_chain;
use crate::entity::{EntityKey, SignedEntity};
use crate::error::{Result, VerifyError};
use crate::policy::CertificateIdentity;
use crate::sct::{issuer_spki, verify_scts};
use crate::timestamp::{verify_rfc3161_timestamps, TimestampSource, VerifiedTimestamp};
use crate::tlog::verify_tlog_entries;
use sigil_crypto::{constant_time_eq, digest, verify_signature, SigningScheme};
use sigil_trust::TrustMaterial;
use sigil_types::{Bundle, DerPublicKey, SignatureContent};
use x509_cert::der::Decode;
use x509_cert::Certificate;

/// Witness thresholds for verification
#[derive(Debug, Clone, Copy)]
pub struct VerifierConfig {
    /// Minimum count of valid transparency log entries
    pub tlog_threshold: usize,
    /// Minimum count of valid embedded SCTs (certificate bundles only)
    pub ctlog_threshold: usize,
    /// Minimum count of valid RFC 3161 timestamps
    pub tsa_threshold: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            tlog_threshold: 1,
            ctlog_threshold: 1,
            tsa_threshold: 0,
        }
    }
}

impl VerifierConfig {
    pub fn with_tlog_threshold(mut self, threshold: usize) -> Self {
        self.tlog_threshold = threshold;
        self
    }

    pub fn with_ctlog_threshold(mut self, threshold: usize) -> Self {
        self.ctlog_threshold = threshold;
        self
    }

    pub fn with_tsa_threshold(mut self, threshold: usize) -> Self {
        self.tsa_threshold = threshold;
        self
    }
}

/// A bundle verifier bound to trust material.
///
/// Verification is pure and synchronous; a `Verifier` is immutable and
/// can be shared across threads freely.
pub struct Verifier {
    trust: TrustMaterial,
    config: VerifierConfig,
}

impl Verifier {
    /// Create a verifier with default thresholds
    pub fn new(trust: TrustMaterial) -> Self {
        Self {
            trust,
            config: VerifierConfig::default(),
        }
    }

    /// Create a verifier with explicit thresholds
    pub fn with_config(trust: TrustMaterial, config: VerifierConfig) -> Self {
        Self { trust, config }
    }

    /// Verify a bundle.
    ///
    /// `artifact` carries the signed artifact bytes; message-signature
    /// bundles require them, DSSE bundles ignore them. `policy`, when
    /// supplied, constrains the signing certificate's identity.
    ///
    /// Returns unit on success; the error identifies the first proof
    /// that failed.
    pub fn verify(
        &self,
        artifact: Option<&[u8]>,
        bundle: &Bundle,
        policy: Option<&CertificateIdentity>,
    ) -> Result<()> {
        // (1) Normalize.
        let entity = SignedEntity::from_bundle(bundle)?;

        // (2) Verify the signature over the signature content.
        let (spki, scheme, cert_der) = self.resolve_key(&entity)?;
        self.verify_content_signature(&entity, artifact, &spki, scheme)?;

        // (3) Collect witness timestamps.
        let tlog = verify_tlog_entries(entity.version, entity.tlog_entries, &self.trust)?;
        let tsa_timestamps = verify_rfc3161_timestamps(
            entity.rfc3161_timestamps,
            entity.signature.as_bytes(),
            &self.trust,
        )?;

        // (4) Thresholds per witness kind.
        if tlog.valid_entries < self.config.tlog_threshold {
            return Err(VerifyError::Timestamp(format!(
                "{} valid transparency log entries, threshold is {}",
                tlog.valid_entries, self.config.tlog_threshold
            )));
        }
        if tsa_timestamps.len() < self.config.tsa_threshold {
            return Err(VerifyError::Timestamp(format!(
                "{} valid RFC 3161 timestamps, threshold is {}",
                tsa_timestamps.len(),
                self.config.tsa_threshold
            )));
        }

        // (5) Key trust at the earliest verified time.
        let mut timestamps: Vec<VerifiedTimestamp> = tlog.timestamps;
        timestamps.extend(tsa_timestamps);
        let check_time = timestamps
            .iter()
            .map(|t| t.time)
            .min()
            .ok_or_else(|| {
                VerifyError::Timestamp("no verified source of signing time".to_string())
            })?;

        match &entity.key {
            EntityKey::Certificate {
                leaf,
                intermediates,
                info,
            } => {
                // Every verified timestamp must fall inside the leaf's
                // validity window.
                for ts in &timestamps {
                    let secs = ts.time.timestamp();
                    if secs < info.not_before || secs >= info.not_after {
                        return Err(VerifyError::Certificate(format!(
                            "verified timestamp {} ({:?}) is outside the certificate validity window",
                            ts.time, ts.source
                        )));
                    }
                }

                verify_certificate_chain(leaf, intermediates, &self.trust, check_time)?;

                if self.config.ctlog_threshold > 0 {
                    let issuer =
                        issuer_spki(leaf.as_bytes(), intermediates, &self.trust, check_time)?;
                    verify_scts(
                        leaf.as_bytes(),
                        &issuer,
                        &self.trust,
                        self.config.ctlog_threshold,
                    )?;
                }
            }
            EntityKey::PublicKey { hint } => {
                let key = self
                    .trust
                    .public_key(hint)
                    .map_err(|e| VerifyError::PublicKey(e.to_string()))?;
                if !key.valid_for.contains(check_time) {
                    return Err(VerifyError::PublicKey(format!(
                        "key for hint {} is not valid at {}",
                        hint, check_time
                    )));
                }
            }
        }

        // (6) The log must have witnessed exactly this content.
        let key_material = EntityKeyMaterial {
            cert_der,
            spki_der: spki.as_bytes().to_vec(),
        };
        verify_entry_bodies(&entity, &key_material, artifact)?;

        // (7) Identity policy.
        if let Some(policy) = policy {
            let EntityKey::Certificate { leaf, .. } = &entity.key else {
                return Err(VerifyError::UntrustedSigner(
                    "identity policy requires a certificate-signed bundle".to_string(),
                ));
            };
            let cert = Certificate::from_der(leaf.as_bytes())
                .map_err(|e| VerifyError::Certificate(e.to_string()))?;
            policy.verify(&cert)?;
        }

        tracing::debug!(
            tlog_entries = tlog.valid_entries,
            tsa_timestamps = timestamps
                .iter()
                .filter(|t| t.source == TimestampSource::TimestampAuthority)
                .count(),
            "bundle verified"
        );
        Ok(())
    }

    /// Resolve the signing key for the entity: the certificate's SPKI, or
    /// the trusted key registered under the bundle's hint.
    fn resolve_key(
        &self,
        entity: &SignedEntity<'_>,
    ) -> Result<(DerPublicKey, SigningScheme, Option<Vec<u8>>)> {
        match &entity.key {
            EntityKey::Certificate { leaf, info, .. } => Ok((
                info.public_key.clone(),
                info.signing_scheme,
                Some(leaf.as_bytes().to_vec()),
            )),
            EntityKey::PublicKey { hint } => {
                let key = self
                    .trust
                    .public_key(hint)
                    .map_err(|e| VerifyError::PublicKey(e.to_string()))?;
                Ok((key.key.clone(), key.scheme, None))
            }
        }
    }

    fn verify_content_signature(
        &self,
        entity: &SignedEntity<'_>,
        artifact: Option<&[u8]>,
        spki: &DerPublicKey,
        scheme: SigningScheme,
    ) -> Result<()> {
        match entity.content {
            SignatureContent::MessageSignature(msg) => {
                let artifact = artifact.ok_or_else(|| {
                    VerifyError::Signature("no data for message signature".to_string())
                })?;

                if let Some(md) = &msg.message_digest {
                    let computed = digest(md.algorithm, artifact);
                    if !constant_time_eq(&computed, md.digest.as_slice()) {
                        return Err(VerifyError::Signature(
                            "artifact does not match the bundle's message digest".to_string(),
                        ));
                    }
                }

                verify_signature(spki, artifact, msg.signature.as_bytes(), scheme)
                    .map_err(|e| VerifyError::Signature(e.to_string()))
            }
            SignatureContent::DsseEnvelope(envelope) => {
                let pae = envelope.pae();
                verify_signature(spki, &pae, entity.signature.as_bytes(), scheme)
                    .map_err(|e| VerifyError::Signature(e.to_string()))
            }
        }
    }
}
