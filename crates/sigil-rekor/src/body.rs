//! Entry body structures for the supported kinds
//!
//! Supported combinations:
//!
//! | kind         | version | content                                        |
//! |--------------|---------|------------------------------------------------|
//! | hashedrekord | 0.0.1   | artifact hash, signature, PEM public key       |
//! | intoto       | 0.0.2   | DSSE envelope (double-encoded), payload hash   |
//! | dsse         | 0.0.1   | payload hash, envelope hash, signatures        |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sigil_types::{
    CanonicalizedBody, DerCertificate, DerPublicKey, PayloadBytes, PemContent, SignatureBytes,
};

/// A parsed entry body of a supported kind
#[derive(Debug, Clone)]
pub enum EntryBody {
    /// hashedrekord 0.0.1
    HashedRekordV001(HashedRekordV001Body),
    /// intoto 0.0.2
    IntotoV002(IntotoV002Body),
    /// dsse 0.0.1
    DsseV001(DsseV001Body),
}

impl EntryBody {
    /// Parse a canonicalized body, dispatching on the entry's declared
    /// kind and version and checking that the body agrees.
    pub fn parse(body: &CanonicalizedBody, kind: &str, version: &str) -> Result<Self> {
        let body_str = std::str::from_utf8(body.as_bytes())
            .map_err(|e| Error::InvalidBody(format!("body is not UTF-8: {}", e)))?;

        let parsed = match (kind, version) {
            ("hashedrekord", "0.0.1") => {
                let body: HashedRekordV001Body = serde_json::from_str(body_str).map_err(|e| {
                    Error::InvalidBody(format!("hashedrekord v0.0.1 body: {}", e))
                })?;
                EntryBody::HashedRekordV001(body)
            }
            ("intoto", "0.0.2") => {
                let body: IntotoV002Body = serde_json::from_str(body_str)
                    .map_err(|e| Error::InvalidBody(format!("intoto v0.0.2 body: {}", e)))?;
                EntryBody::IntotoV002(body)
            }
            ("dsse", "0.0.1") => {
                let body: DsseV001Body = serde_json::from_str(body_str)
                    .map_err(|e| Error::InvalidBody(format!("dsse v0.0.1 body: {}", e)))?;
                EntryBody::DsseV001(body)
            }
            _ => {
                return Err(Error::UnsupportedKind {
                    kind: kind.to_string(),
                    version: version.to_string(),
                })
            }
        };

        let (body_kind, body_version) = parsed.kind_version();
        if body_kind != kind || body_version != version {
            return Err(Error::KindVersionMismatch {
                kind: kind.to_string(),
                version: version.to_string(),
                body_kind: body_kind.to_string(),
                body_version: body_version.to_string(),
            });
        }

        Ok(parsed)
    }

    /// The kind and apiVersion the body itself declares
    pub fn kind_version(&self) -> (&str, &str) {
        match self {
            EntryBody::HashedRekordV001(b) => (&b.kind, &b.api_version),
            EntryBody::IntotoV002(b) => (&b.kind, &b.api_version),
            EntryBody::DsseV001(b) => (&b.kind, &b.api_version),
        }
    }
}

/// Hash reference used throughout entry bodies: algorithm name plus a
/// hex-encoded digest value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashValue {
    pub algorithm: String,
    pub value: String,
}

// ============================================================================
// hashedrekord 0.0.1
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedRekordV001Body {
    pub api_version: String,
    pub kind: String,
    pub spec: HashedRekordV001Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedRekordV001Spec {
    pub data: HashedRekordV001Data,
    pub signature: HashedRekordV001Signature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedRekordV001Data {
    pub hash: HashValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedRekordV001Signature {
    pub content: SignatureBytes,
    pub public_key: PublicKeyContent,
}

/// Base64-wrapped PEM key material as it appears in hashedrekord bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyContent {
    pub content: PemContent,
}

impl PublicKeyContent {
    fn pem_str(&self) -> Result<String> {
        String::from_utf8(self.content.as_bytes().to_vec())
            .map_err(|e| Error::InvalidBody(format!("PEM not valid UTF-8: {}", e)))
    }

    /// Decode the PEM as a certificate, yielding its DER bytes
    pub fn to_certificate(&self) -> Result<DerCertificate> {
        DerCertificate::from_pem(&self.pem_str()?)
            .map_err(|e| Error::InvalidBody(format!("failed to parse certificate PEM: {}", e)))
    }

    /// Decode the PEM as a public key, yielding its SPKI DER bytes
    pub fn to_public_key(&self) -> Result<DerPublicKey> {
        DerPublicKey::from_pem(&self.pem_str()?)
            .map_err(|e| Error::InvalidBody(format!("failed to parse public key PEM: {}", e)))
    }
}

// ============================================================================
// intoto 0.0.2
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntotoV002Body {
    pub api_version: String,
    pub kind: String,
    pub spec: IntotoV002Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntotoV002Spec {
    pub content: IntotoV002Content,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntotoV002Content {
    pub envelope: IntotoEnvelope,
    /// Hash over the whole envelope (not reproducible from the bundle;
    /// present in the body but unused)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashValue>,
    pub payload_hash: HashValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntotoEnvelope {
    pub payload_type: String,
    /// Envelope payload. Rekor double-base64-encodes this: decoding the
    /// wire string once yields the payload's own base64 text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadBytes>,
    pub signatures: Vec<IntotoSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntotoSignature {
    /// Signature bytes, double-base64-encoded like the payload
    pub sig: SignatureBytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PemContent>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyid: String,
}

// ============================================================================
// dsse 0.0.1
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseV001Body {
    pub api_version: String,
    pub kind: String,
    pub spec: DsseV001Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseV001Spec {
    pub envelope_hash: HashValue,
    pub payload_hash: HashValue,
    pub signatures: Vec<DsseV001Signature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsseV001Signature {
    pub signature: SignatureBytes,
    /// Base64-wrapped PEM of the signing certificate or public key
    pub verifier: PemContent,
}

impl DsseV001Signature {
    fn pem_str(&self) -> Result<String> {
        String::from_utf8(self.verifier.as_bytes().to_vec())
            .map_err(|e| Error::InvalidBody(format!("PEM not valid UTF-8: {}", e)))
    }

    /// Decode the verifier as a certificate
    pub fn to_certificate(&self) -> Result<DerCertificate> {
        DerCertificate::from_pem(&self.pem_str()?)
            .map_err(|e| Error::InvalidBody(format!("failed to parse verifier PEM: {}", e)))
    }

    /// Decode the verifier as a public key
    pub fn to_public_key(&self) -> Result<DerPublicKey> {
        DerPublicKey::from_pem(&self.pem_str()?)
            .map_err(|e| Error::InvalidBody(format!("failed to parse verifier PEM: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_from_json(json: &str) -> CanonicalizedBody {
        CanonicalizedBody::from_bytes(json.as_bytes())
    }

    const HASHEDREKORD_V001: &str = r#"{
        "apiVersion": "0.0.1",
        "kind": "hashedrekord",
        "spec": {
            "data": {
                "hash": {
                    "algorithm": "sha256",
                    "value": "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
                }
            },
            "signature": {
                "content": "c2lnbmF0dXJl",
                "publicKey": {"content": "cHVibGlja2V5"}
            }
        }
    }"#;

    #[test]
    fn test_parse_hashedrekord_v001() {
        let body = EntryBody::parse(&body_from_json(HASHEDREKORD_V001), "hashedrekord", "0.0.1")
            .unwrap();
        let EntryBody::HashedRekordV001(rekord) = body else {
            panic!("wrong variant");
        };
        assert_eq!(rekord.spec.data.hash.algorithm, "sha256");
        assert_eq!(rekord.spec.signature.content.as_bytes(), b"signature");
    }

    #[test]
    fn test_kind_version_mismatch() {
        let result = EntryBody::parse(&body_from_json(HASHEDREKORD_V001), "hashedrekord", "0.0.2");
        assert!(matches!(result, Err(Error::UnsupportedKind { .. })));

        // Entry metadata claims dsse but the body says hashedrekord.
        let dsse_claiming = HASHEDREKORD_V001.replace("\"kind\": \"hashedrekord\"", "\"kind\": \"dsse\"");
        let result = EntryBody::parse(&body_from_json(&dsse_claiming), "hashedrekord", "0.0.1");
        assert!(matches!(result, Err(Error::KindVersionMismatch { .. })));
    }

    #[test]
    fn test_parse_dsse_v001() {
        let json = r#"{
            "apiVersion": "0.0.1",
            "kind": "dsse",
            "spec": {
                "envelopeHash": {"algorithm": "sha256", "value": "aa"},
                "payloadHash": {"algorithm": "sha256", "value": "bb"},
                "signatures": [{"signature": "c2ln", "verifier": "dmVyaWZpZXI="}]
            }
        }"#;
        let body = EntryBody::parse(&body_from_json(json), "dsse", "0.0.1").unwrap();
        let EntryBody::DsseV001(dsse) = body else {
            panic!("wrong variant");
        };
        assert_eq!(dsse.spec.signatures.len(), 1);
        assert_eq!(dsse.spec.payload_hash.value, "bb");
    }

    #[test]
    fn test_parse_intoto_v002() {
        let json = r#"{
            "apiVersion": "0.0.2",
            "kind": "intoto",
            "spec": {
                "content": {
                    "envelope": {
                        "payloadType": "application/vnd.in-toto+json",
                        "payload": "cGF5bG9hZA==",
                        "signatures": [{"sig": "c2ln", "publicKey": "a2V5"}]
                    },
                    "payloadHash": {"algorithm": "sha256", "value": "cc"}
                }
            }
        }"#;
        let body = EntryBody::parse(&body_from_json(json), "intoto", "0.0.2").unwrap();
        let EntryBody::IntotoV002(intoto) = body else {
            panic!("wrong variant");
        };
        assert_eq!(
            intoto.spec.content.envelope.payload_type,
            "application/vnd.in-toto+json"
        );
        assert_eq!(intoto.spec.content.envelope.signatures.len(), 1);
    }

    #[test]
    fn test_invalid_json_body() {
        let result = EntryBody::parse(
            &CanonicalizedBody::from_bytes(b"not json"),
            "hashedrekord",
            "0.0.1",
        );
        assert!(matches!(result, Err(Error::InvalidBody(_))));
    }
}
