//! Bundle normalization
//!
//! Turns a parsed bundle into the internal `SignedEntity`: the signing
//! key, the signature, the exact bytes it covers, and the witness
//! evidence, with the version-independent shape the pipeline works on.

use crate::error::{Result, VerifyError};
use sigil_crypto::{parse_certificate_info, CertificateInfo};
use sigil_types::{
    Bundle, BundleVersion, DerCertificate, Rfc3161Timestamp, SignatureBytes, SignatureContent,
    TransparencyLogEntry, VerificationMaterialContent,
};

/// The key a bundle was signed under
pub(crate) enum EntityKey<'a> {
    /// A signing certificate, plus any intermediates the bundle carries
    Certificate {
        leaf: &'a DerCertificate,
        intermediates: Vec<&'a DerCertificate>,
        info: CertificateInfo,
    },
    /// A hint into the caller's trusted key index
    PublicKey { hint: &'a str },
}

/// Normalized view of a bundle
pub(crate) struct SignedEntity<'a> {
    pub key: EntityKey<'a>,
    /// The signature the pipeline verifies (for DSSE, the first one)
    pub signature: &'a SignatureBytes,
    pub content: &'a SignatureContent,
    pub tlog_entries: &'a [TransparencyLogEntry],
    pub rfc3161_timestamps: &'a [Rfc3161Timestamp],
    pub version: BundleVersion,
}

impl<'a> SignedEntity<'a> {
    pub fn from_bundle(bundle: &'a Bundle) -> Result<Self> {
        let version = bundle
            .version()
            .map_err(|e| VerifyError::Signature(format!("unsupported bundle: {}", e)))?;

        let key = match &bundle.verification_material.content {
            VerificationMaterialContent::Certificate(cert) => {
                let info = parse_certificate_info(cert.raw_bytes.as_bytes())
                    .map_err(|e| VerifyError::Certificate(e.to_string()))?;
                EntityKey::Certificate {
                    leaf: &cert.raw_bytes,
                    intermediates: Vec::new(),
                    info,
                }
            }
            VerificationMaterialContent::X509CertificateChain { certificates } => {
                let leaf = certificates.first().ok_or_else(|| {
                    VerifyError::Certificate("empty certificate chain".to_string())
                })?;
                let info = parse_certificate_info(leaf.raw_bytes.as_bytes())
                    .map_err(|e| VerifyError::Certificate(e.to_string()))?;
                EntityKey::Certificate {
                    leaf: &leaf.raw_bytes,
                    intermediates: certificates[1..].iter().map(|c| &c.raw_bytes).collect(),
                    info,
                }
            }
            VerificationMaterialContent::PublicKey { hint } => EntityKey::PublicKey {
                hint: hint.as_str(),
            },
        };

        let signature = match &bundle.content {
            SignatureContent::MessageSignature(msg) => &msg.signature,
            SignatureContent::DsseEnvelope(envelope) => {
                // Only the first signature participates in verification;
                // the rest are checked against the log body's count later.
                &envelope
                    .signatures
                    .first()
                    .ok_or_else(|| {
                        VerifyError::Signature("no signature in DSSE envelope".to_string())
                    })?
                    .sig
            }
        };

        Ok(SignedEntity {
            key,
            signature,
            content: &bundle.content,
            tlog_entries: &bundle.verification_material.tlog_entries,
            rfc3161_timestamps: &bundle
                .verification_material
                .timestamp_verification_data
                .rfc3161_timestamps,
            version,
        })
    }
}
