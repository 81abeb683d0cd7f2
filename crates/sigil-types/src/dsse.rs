//! Dead Simple Signing Envelope (DSSE) types
//!
//! DSSE signs `payload_type || payload` through the Pre-Authentication
//! Encoding (PAE). Specification: https://github.com/secure-systems-lab/dsse

use crate::encoding::{PayloadBytes, SignatureBytes};
use serde::{Deserialize, Serialize};

/// A DSSE envelope containing a signed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseEnvelope {
    /// Type URI of the payload
    pub payload_type: String,
    /// Payload bytes (base64 on the wire)
    pub payload: PayloadBytes,
    /// Signatures over the PAE
    pub signatures: Vec<DsseSignature>,
}

/// A signature in a DSSE envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseSignature {
    /// Key ID hint (optional)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyid: String,
    /// Signature bytes
    pub sig: SignatureBytes,
}

impl DsseEnvelope {
    /// Compute the Pre-Authentication Encoding for this envelope.
    ///
    /// This is the exact byte sequence the signatures cover.
    pub fn pae(&self) -> Vec<u8> {
        pae(&self.payload_type, self.payload.as_bytes())
    }
}

/// Compute the Pre-Authentication Encoding.
///
/// Format: `DSSEv1 <len(type)> <type> <len(payload)> <payload>` where the
/// lengths are the decimal byte counts.
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(payload_type.len() + payload.len() + 32);
    result.extend_from_slice(b"DSSEv1 ");
    result.extend_from_slice(payload_type.len().to_string().as_bytes());
    result.push(b' ');
    result.extend_from_slice(payload_type.as_bytes());
    result.push(b' ');
    result.extend_from_slice(payload.len().to_string().as_bytes());
    result.push(b' ');
    result.extend_from_slice(payload);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pae_dsse_spec_vector() {
        let result = pae("http://example.com/HelloWorld", b"hello world");
        assert_eq!(
            result,
            b"DSSEv1 29 http://example.com/HelloWorld 11 hello world"
        );
    }

    #[test]
    fn test_pae_in_toto() {
        let result = pae("application/vnd.in-toto+json", b"payload");
        assert_eq!(result, b"DSSEv1 28 application/vnd.in-toto+json 7 payload");
    }

    #[test]
    fn test_envelope_serde() {
        let envelope = DsseEnvelope {
            payload_type: "application/vnd.in-toto+json".to_string(),
            payload: PayloadBytes::from_bytes(b"{\"_type\":\"test\"}"),
            signatures: vec![DsseSignature {
                keyid: String::new(),
                sig: SignatureBytes::from_bytes(b"sig"),
            }],
        };

        let json = serde_json::to_string(&envelope).unwrap();
        // Empty keyid is omitted on the wire.
        assert!(!json.contains("keyid"));
        let parsed: DsseEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(envelope, parsed);
    }
}
