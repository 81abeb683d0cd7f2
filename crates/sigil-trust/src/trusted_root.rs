//! TrustedRoot wire format
//!
//! The protobuf-JSON form of `dev.sigstore.trustroot.v1.TrustedRoot`
//! (`application/vnd.dev.sigstore.trustedroot+json;version=0.1`). This
//! module only mirrors the wire shape; `material` turns it into the
//! indexed view the verifier consumes.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sigil_types::{DerCertificate, DerPublicKey, HashAlgorithm, LogId};

/// A trusted root: every authority the verifier may rely on
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedRoot {
    /// Media type of the trusted root document
    pub media_type: String,

    /// Transparency logs
    #[serde(default)]
    pub tlogs: Vec<TransparencyLog>,

    /// Certificate authorities
    #[serde(default)]
    pub certificate_authorities: Vec<CertificateAuthority>,

    /// Certificate Transparency logs
    #[serde(default)]
    pub ctlogs: Vec<TransparencyLog>,

    /// RFC 3161 timestamping authorities
    #[serde(default)]
    pub timestamp_authorities: Vec<TimestampAuthority>,
}

/// A transparency or CT log entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLog {
    /// Base URL of the log
    #[serde(default)]
    pub base_url: String,

    /// Hash algorithm the log uses
    pub hash_algorithm: HashAlgorithm,

    /// Public key material
    pub public_key: PublicKey,

    /// Log ID (SHA-256 of the public key)
    pub log_id: LogId,
}

/// A certificate authority entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    /// Subject information
    #[serde(default)]
    pub subject: CertificateSubject,

    /// URI of the CA
    #[serde(default)]
    pub uri: String,

    /// Certificate chain, leaf/intermediates first, root last
    pub cert_chain: CertChain,

    /// Validity period
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// A timestamping authority entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampAuthority {
    /// Subject information
    #[serde(default)]
    pub subject: CertificateSubject,

    /// URI of the TSA
    #[serde(default)]
    pub uri: Option<String>,

    /// Certificate chain, signing certificate first, root last
    pub cert_chain: CertChain,

    /// Validity period
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// Public key information
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    /// DER-encoded SPKI bytes
    pub raw_bytes: DerPublicKey,

    /// Key algorithm, e.g. "PKIX_ECDSA_P256_SHA_256"
    pub key_details: String,

    /// Validity period for this key
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// Distinguished-name fragments for an authority
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSubject {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub common_name: Option<String>,
}

/// Certificate chain
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertChain {
    pub certificates: Vec<CertificateEntry>,
}

/// One certificate in a chain
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntry {
    pub raw_bytes: DerCertificate,
}

/// Validity period with RFC 3339 endpoints
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityPeriod {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl TrustedRoot {
    /// Parse a trusted root from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
