//! Sigstore bundle wire format
//!
//! The bundle is the signed-artifact envelope the verifier consumes. It
//! carries the signature, the verification material (certificate chain,
//! single certificate, or public key hint), transparency log entries, and
//! optional RFC 3161 timestamps.

use crate::checkpoint::SignedNote;
use crate::dsse::DsseEnvelope;
use crate::encoding::{
    string_i64, string_u64, CanonicalizedBody, DerCertificate, LogKeyId, Sha256Hash,
    SignatureBytes, SignedTimestamp, TimestampToken,
};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Bundle schema versions, derived from the media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BundleVersion {
    /// version=0.1
    V0_1,
    /// version=0.2
    V0_2,
    /// version=0.3
    V0_3,
}

impl BundleVersion {
    /// The canonical media type string for this version
    pub fn media_type(&self) -> &'static str {
        match self {
            BundleVersion::V0_1 => "application/vnd.dev.sigstore.bundle+json;version=0.1",
            BundleVersion::V0_2 => "application/vnd.dev.sigstore.bundle+json;version=0.2",
            BundleVersion::V0_3 => "application/vnd.dev.sigstore.bundle.v0.3+json",
        }
    }
}

impl FromStr for BundleVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "application/vnd.dev.sigstore.bundle+json;version=0.1" => Ok(BundleVersion::V0_1),
            "application/vnd.dev.sigstore.bundle+json;version=0.2" => Ok(BundleVersion::V0_2),
            // Both spellings of v0.3 occur in the wild.
            "application/vnd.dev.sigstore.bundle.v0.3+json"
            | "application/vnd.dev.sigstore.bundle+json;version=0.3" => Ok(BundleVersion::V0_3),
            _ => Err(Error::InvalidMediaType(s.to_string())),
        }
    }
}

/// The top-level bundle envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Media type identifying the bundle version
    pub media_type: String,
    /// Key material and witness evidence
    pub verification_material: VerificationMaterial,
    /// The signed content
    #[serde(flatten)]
    pub content: SignatureContent,
}

impl Bundle {
    /// Parse a bundle from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Json)
    }

    /// Serialize the bundle to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Json)
    }

    /// Serialize the bundle to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Json)
    }

    /// Get the schema version from the media type
    pub fn version(&self) -> Result<BundleVersion> {
        BundleVersion::from_str(&self.media_type)
    }

    /// The signing (leaf) certificate, if the bundle carries one
    pub fn signing_certificate(&self) -> Option<&DerCertificate> {
        match &self.verification_material.content {
            VerificationMaterialContent::Certificate(cert) => Some(&cert.raw_bytes),
            VerificationMaterialContent::X509CertificateChain { certificates } => {
                certificates.first().map(|c| &c.raw_bytes)
            }
            VerificationMaterialContent::PublicKey { .. } => None,
        }
    }

    /// Whether any tlog entry carries an inclusion proof
    pub fn has_inclusion_proof(&self) -> bool {
        self.verification_material
            .tlog_entries
            .iter()
            .any(|e| e.inclusion_proof.is_some())
    }

    /// Whether any tlog entry carries an inclusion promise (SET)
    pub fn has_inclusion_promise(&self) -> bool {
        self.verification_material
            .tlog_entries
            .iter()
            .any(|e| e.inclusion_promise.is_some())
    }
}

/// The signed content: a raw message signature or a DSSE envelope.
///
/// The JSON field name (`messageSignature` / `dsseEnvelope`) selects the
/// variant; exactly one must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureContent {
    /// A detached signature over the artifact
    MessageSignature(MessageSignature),
    /// A DSSE envelope
    DsseEnvelope(DsseEnvelope),
}

/// A detached signature over the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSignature {
    /// Digest of the artifact, used to cross-check supplied artifact bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_digest: Option<MessageDigest>,
    /// The signature bytes
    pub signature: SignatureBytes,
}

/// Artifact digest with its algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDigest {
    pub algorithm: HashAlgorithm,
    pub digest: Sha256Hash,
}

/// Key material plus witness evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMaterial {
    /// Certificate, certificate chain, or public key hint
    #[serde(flatten)]
    pub content: VerificationMaterialContent,
    /// Transparency log entries
    #[serde(default)]
    pub tlog_entries: Vec<TransparencyLogEntry>,
    /// RFC 3161 timestamps
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub timestamp_verification_data: TimestampVerificationData,
}

/// The key-material variant.
///
/// The JSON field name selects the variant: `certificate` (v0.3),
/// `x509CertificateChain` (v0.1/v0.2, leaf first), or `publicKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationMaterialContent {
    /// Single leaf certificate (v0.3)
    Certificate(CertificateContent),
    /// Leaf-first certificate chain (v0.1/v0.2)
    X509CertificateChain {
        certificates: Vec<X509Certificate>,
    },
    /// Opaque hint into the caller's trusted key index
    PublicKey {
        hint: String,
    },
}

/// Certificate content for v0.3 bundles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateContent {
    pub raw_bytes: DerCertificate,
}

/// One certificate in a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Certificate {
    pub raw_bytes: DerCertificate,
}

/// A transparency log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLogEntry {
    /// Index of the entry in the log
    #[serde(with = "string_u64")]
    pub log_index: u64,
    /// Identifies which log holds the entry
    pub log_id: LogId,
    /// Kind and version of the entry body
    pub kind_version: KindVersion,
    /// Unix timestamp at which the log integrated the entry. Newer log
    /// shards omit this; it then defaults to 0.
    #[serde(default, with = "string_i64", skip_serializing_if = "is_zero")]
    pub integrated_time: i64,
    /// Signed Entry Timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusion_promise: Option<InclusionPromise>,
    /// Merkle inclusion proof
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusion_proof: Option<InclusionProof>,
    /// RFC 8785 canonicalized entry body
    pub canonicalized_body: CanonicalizedBody,
}

/// Log identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogId {
    /// Base64 of SHA-256 over the log's public key
    pub key_id: LogKeyId,
}

/// Entry kind and body version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindVersion {
    /// Entry kind, e.g. "hashedrekord"
    pub kind: String,
    /// Body version, e.g. "0.0.1"
    pub version: String,
}

/// Signed Entry Timestamp: the log's promise of inclusion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionPromise {
    pub signed_entry_timestamp: SignedTimestamp,
}

/// Merkle audit path from the entry to a signed checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    /// Index of the entry within the tree the proof was produced against
    #[serde(with = "string_u64")]
    pub log_index: u64,
    /// Expected root hash
    pub root_hash: Sha256Hash,
    /// Tree size the proof was produced against
    #[serde(with = "string_u64")]
    pub tree_size: u64,
    /// Sibling hashes, leaf to root
    pub hashes: Vec<Sha256Hash>,
    /// Signed checkpoint committing to the root hash
    #[serde(default, skip_serializing_if = "CheckpointData::is_empty")]
    pub checkpoint: CheckpointData,
}

/// The checkpoint envelope text inside an inclusion proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointData {
    #[serde(default)]
    pub envelope: String,
}

impl CheckpointData {
    /// Parse the envelope as a signed note
    pub fn parse(&self) -> Result<SignedNote> {
        SignedNote::from_text(&self.envelope)
    }

    pub fn is_empty(&self) -> bool {
        self.envelope.is_empty()
    }
}

/// RFC 3161 timestamp container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimestampVerificationData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rfc3161_timestamps: Vec<Rfc3161Timestamp>,
}

/// A single RFC 3161 timestamp token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfc3161Timestamp {
    /// DER-encoded TimeStampResp or timeStampToken
    pub signed_timestamp: TimestampToken,
}

fn default_media_type() -> String {
    BundleVersion::V0_1.media_type().to_string()
}

// Hand-rolled Deserialize so bundles without a mediaType (early cosign
// output) default to v0.1 instead of failing.
impl<'de> Deserialize<'de> for Bundle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct BundleHelper {
            #[serde(default = "default_media_type")]
            media_type: String,
            verification_material: VerificationMaterial,
            #[serde(flatten)]
            content: SignatureContent,
        }

        let helper = BundleHelper::deserialize(deserializer)?;
        Ok(Bundle {
            media_type: helper.media_type,
            verification_material: helper.verification_material,
            content: helper.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_parsing() {
        assert_eq!(
            BundleVersion::from_str("application/vnd.dev.sigstore.bundle+json;version=0.1")
                .unwrap(),
            BundleVersion::V0_1
        );
        assert_eq!(
            BundleVersion::from_str("application/vnd.dev.sigstore.bundle+json;version=0.2")
                .unwrap(),
            BundleVersion::V0_2
        );
        assert_eq!(
            BundleVersion::from_str("application/vnd.dev.sigstore.bundle.v0.3+json").unwrap(),
            BundleVersion::V0_3
        );
        assert_eq!(
            BundleVersion::from_str("application/vnd.dev.sigstore.bundle+json;version=0.3")
                .unwrap(),
            BundleVersion::V0_3
        );
        assert!(BundleVersion::from_str("application/json").is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(BundleVersion::V0_1 < BundleVersion::V0_2);
        assert!(BundleVersion::V0_2 < BundleVersion::V0_3);
    }

    const V01_BUNDLE: &str = r#"{
        "mediaType": "application/vnd.dev.sigstore.bundle+json;version=0.1",
        "verificationMaterial": {
            "publicKey": {"hint": "my-key"},
            "tlogEntries": [{
                "logIndex": "9007199254740993",
                "logId": {"keyId": "wNI9atQGlz+VWfO6LRygH4QUfY/8W4RFwiT5i5WRgB0="},
                "kindVersion": {"kind": "hashedrekord", "version": "0.0.1"},
                "integratedTime": "1689177396",
                "inclusionPromise": {"signedEntryTimestamp": "c2V0LXNpZ25hdHVyZQ=="},
                "canonicalizedBody": "eyJ0ZXN0Ijp0cnVlfQ=="
            }]
        },
        "messageSignature": {
            "messageDigest": {
                "algorithm": "SHA2_256",
                "digest": "uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
            },
            "signature": "c2lnbmF0dXJl"
        }
    }"#;

    #[test]
    fn test_v01_bundle_roundtrip() {
        let bundle = Bundle::from_json(V01_BUNDLE).unwrap();
        assert_eq!(bundle.version().unwrap(), BundleVersion::V0_1);
        assert!(bundle.has_inclusion_promise());
        assert!(!bundle.has_inclusion_proof());
        assert!(bundle.signing_certificate().is_none());

        let entry = &bundle.verification_material.tlog_entries[0];
        // Above 2^53: the string encoding must preserve it exactly.
        assert_eq!(entry.log_index, 9007199254740993);
        assert_eq!(entry.integrated_time, 1689177396);

        let json = bundle.to_json().unwrap();
        let reparsed = Bundle::from_json(&json).unwrap();
        assert_eq!(bundle, reparsed);
    }

    #[test]
    fn test_missing_media_type_defaults_to_v01() {
        let json = r#"{
            "verificationMaterial": {"publicKey": {"hint": "k"}, "tlogEntries": []},
            "messageSignature": {"signature": "c2ln"}
        }"#;
        let bundle = Bundle::from_json(json).unwrap();
        assert_eq!(bundle.version().unwrap(), BundleVersion::V0_1);
    }

    #[test]
    fn test_exactly_one_content_variant() {
        // Neither messageSignature nor dsseEnvelope present.
        let json = r#"{
            "mediaType": "application/vnd.dev.sigstore.bundle+json;version=0.1",
            "verificationMaterial": {"publicKey": {"hint": "k"}, "tlogEntries": []}
        }"#;
        assert!(Bundle::from_json(json).is_err());
    }
}
