//! Signature verification using aws-lc-rs

use crate::error::{Error, Result};
use aws_lc_rs::signature::{
    UnparsedPublicKey, ECDSA_P256_SHA256_ASN1, ECDSA_P256_SHA384_ASN1, ECDSA_P384_SHA384_ASN1,
    ED25519, RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
    RSA_PSS_2048_8192_SHA256, RSA_PSS_2048_8192_SHA384, RSA_PSS_2048_8192_SHA512,
};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;
use sigil_types::DerPublicKey;
use spki::der::Decode;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

/// Supported signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    /// ECDSA P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA P-256 with SHA-384
    EcdsaP256Sha384,
    /// ECDSA P-384 with SHA-384
    EcdsaP384Sha384,
    /// Ed25519
    Ed25519,
    /// RSA PSS with SHA-256
    RsaPssSha256,
    /// RSA PSS with SHA-384
    RsaPssSha384,
    /// RSA PSS with SHA-512
    RsaPssSha512,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
}

impl SigningScheme {
    /// Human-readable scheme name
    pub fn name(&self) -> &'static str {
        match self {
            SigningScheme::EcdsaP256Sha256 => "ECDSA_P256_SHA256",
            SigningScheme::EcdsaP256Sha384 => "ECDSA_P256_SHA384",
            SigningScheme::EcdsaP384Sha384 => "ECDSA_P384_SHA384",
            SigningScheme::Ed25519 => "ED25519",
            SigningScheme::RsaPssSha256 => "RSA_PSS_SHA256",
            SigningScheme::RsaPssSha384 => "RSA_PSS_SHA384",
            SigningScheme::RsaPssSha512 => "RSA_PSS_SHA512",
            SigningScheme::RsaPkcs1Sha256 => "RSA_PKCS1_SHA256",
            SigningScheme::RsaPkcs1Sha384 => "RSA_PKCS1_SHA384",
            SigningScheme::RsaPkcs1Sha512 => "RSA_PKCS1_SHA512",
        }
    }

    /// Map a protobuf-specs `key_details` string (as it appears in trust
    /// roots) to a scheme.
    pub fn from_key_details(details: &str) -> Result<Self> {
        match details {
            "PKIX_ECDSA_P256_SHA_256" => Ok(SigningScheme::EcdsaP256Sha256),
            "PKIX_ECDSA_P384_SHA_384" => Ok(SigningScheme::EcdsaP384Sha384),
            "PKIX_ED25519" | "PKIX_ED25519_PH" => Ok(SigningScheme::Ed25519),
            "PKIX_RSA_PKCS1V15_2048_SHA256"
            | "PKIX_RSA_PKCS1V15_3072_SHA256"
            | "PKIX_RSA_PKCS1V15_4096_SHA256" => Ok(SigningScheme::RsaPkcs1Sha256),
            "PKIX_RSA_PSS_2048_SHA256" | "PKIX_RSA_PSS_3072_SHA256"
            | "PKIX_RSA_PSS_4096_SHA256" => Ok(SigningScheme::RsaPssSha256),
            other => Err(Error::UnsupportedAlgorithm(format!(
                "unknown key details: {}",
                other
            ))),
        }
    }
}

/// A parsed public key ready for verification
pub struct VerificationKey {
    /// Raw key bytes extracted from the SPKI BIT STRING
    bytes: Vec<u8>,
    /// The scheme to verify with
    scheme: SigningScheme,
}

impl VerificationKey {
    /// Create a verification key from a DER-encoded SPKI public key.
    ///
    /// aws-lc-rs wants the raw key bytes (EC point, Ed25519 key, or PKCS#1
    /// RSAPublicKey), so the SPKI wrapper is stripped here.
    pub fn from_spki(key: &DerPublicKey, scheme: SigningScheme) -> Result<Self> {
        let spki = SubjectPublicKeyInfoOwned::from_der(key.as_bytes())
            .map_err(|e| Error::InvalidKey(format!("invalid SPKI: {}", e)))?;

        let raw_bytes = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| Error::InvalidKey("SPKI key has unused bits".to_string()))?
            .to_vec();

        Ok(Self {
            bytes: raw_bytes,
            scheme,
        })
    }

    /// The scheme this key verifies with
    pub fn scheme(&self) -> SigningScheme {
        self.scheme
    }

    /// Verify a signature over data
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let algorithm: &'static dyn aws_lc_rs::signature::VerificationAlgorithm = match self.scheme {
            SigningScheme::EcdsaP256Sha256 => &ECDSA_P256_SHA256_ASN1,
            SigningScheme::EcdsaP256Sha384 => &ECDSA_P256_SHA384_ASN1,
            SigningScheme::EcdsaP384Sha384 => &ECDSA_P384_SHA384_ASN1,
            SigningScheme::Ed25519 => &ED25519,
            SigningScheme::RsaPssSha256 => &RSA_PSS_2048_8192_SHA256,
            SigningScheme::RsaPssSha384 => &RSA_PSS_2048_8192_SHA384,
            SigningScheme::RsaPssSha512 => &RSA_PSS_2048_8192_SHA512,
            SigningScheme::RsaPkcs1Sha256 => &RSA_PKCS1_2048_8192_SHA256,
            SigningScheme::RsaPkcs1Sha384 => &RSA_PKCS1_2048_8192_SHA384,
            SigningScheme::RsaPkcs1Sha512 => &RSA_PKCS1_2048_8192_SHA512,
        };

        UnparsedPublicKey::new(algorithm, &self.bytes)
            .verify(data, signature)
            .map_err(|_| {
                Error::Verification(format!("{} signature invalid", self.scheme.name()))
            })
    }
}

/// Determine the signature scheme from a key's SPKI algorithm identifier.
pub fn detect_scheme(key: &DerPublicKey) -> Result<SigningScheme> {
    let spki = SubjectPublicKeyInfoOwned::from_der(key.as_bytes())
        .map_err(|e| Error::InvalidKey(format!("invalid SPKI: {}", e)))?;
    scheme_for_spki(&spki)
}

pub(crate) fn scheme_for_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<SigningScheme> {
    let alg_oid = spki.algorithm.oid;

    if alg_oid == ID_EC_PUBLIC_KEY {
        let params = spki.algorithm.parameters.as_ref().ok_or_else(|| {
            Error::InvalidKey("EC key missing curve parameters".to_string())
        })?;
        // The parameter value holds the raw curve OID bytes.
        let curve_oid = ObjectIdentifier::from_bytes(params.value())
            .map_err(|e| Error::InvalidKey(format!("failed to parse EC curve OID: {}", e)))?;

        if curve_oid == SECP_256_R_1 {
            Ok(SigningScheme::EcdsaP256Sha256)
        } else if curve_oid == SECP_384_R_1 {
            Ok(SigningScheme::EcdsaP384Sha384)
        } else {
            Err(Error::UnsupportedAlgorithm(format!(
                "unsupported EC curve: {}",
                curve_oid
            )))
        }
    } else if alg_oid == RSA_ENCRYPTION {
        // Padding is not recorded in the SPKI; PKCS#1 v1.5 / SHA-256 is
        // what the ecosystem emits.
        Ok(SigningScheme::RsaPkcs1Sha256)
    } else if alg_oid == ID_ED_25519 {
        Ok(SigningScheme::Ed25519)
    } else {
        Err(Error::UnsupportedAlgorithm(format!(
            "unsupported public key algorithm: {}",
            alg_oid
        )))
    }
}

/// Verify a signature with an explicit scheme.
pub fn verify_signature(
    public_key: &DerPublicKey,
    data: &[u8],
    signature: &[u8],
    scheme: SigningScheme,
) -> Result<()> {
    VerificationKey::from_spki(public_key, scheme)?.verify(data, signature)
}

/// Verify a signature, deriving the scheme from the key's SPKI.
///
/// Used for checkpoint signatures, where the note format does not declare
/// an algorithm.
pub fn verify_signature_auto(
    public_key: &DerPublicKey,
    data: &[u8],
    signature: &[u8],
) -> Result<()> {
    let scheme = detect_scheme(public_key)?;
    verify_signature(public_key, data, signature, scheme)
}

// SPKI headers for the two key types whose raw form shows up outside of
// certificates (checkpoint keys, caller-supplied trust keys).
const P256_SPKI_HEADER: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08,
    0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];
const ED25519_SPKI_HEADER: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Wrap an uncompressed P-256 point (65 bytes, 0x04-prefixed) in an SPKI.
pub fn p256_spki_from_point(point: &[u8]) -> Result<DerPublicKey> {
    if point.len() != 65 || point[0] != 0x04 {
        return Err(Error::InvalidKey(
            "expected a 65-byte uncompressed P-256 point".to_string(),
        ));
    }
    let mut der = Vec::with_capacity(91);
    der.extend_from_slice(&P256_SPKI_HEADER);
    der.extend_from_slice(point);
    Ok(DerPublicKey::new(der))
}

/// Wrap a raw 32-byte Ed25519 public key in an SPKI.
pub fn ed25519_spki_from_raw(key: &[u8]) -> Result<DerPublicKey> {
    if key.len() != 32 {
        return Err(Error::InvalidKey(
            "expected a 32-byte Ed25519 public key".to_string(),
        ));
    }
    let mut der = Vec::with_capacity(44);
    der.extend_from_slice(&ED25519_SPKI_HEADER);
    der.extend_from_slice(key);
    Ok(DerPublicKey::new(der))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{
        EcdsaKeyPair, Ed25519KeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
    };

    #[test]
    fn test_verify_ecdsa_p256() {
        let kp = EcdsaKeyPair::generate(&ECDSA_P256_SHA256_ASN1_SIGNING).unwrap();
        let rng = SystemRandom::new();
        let data = b"test data";
        let sig = kp.sign(&rng, data).unwrap();

        let pubkey = p256_spki_from_point(kp.public_key().as_ref()).unwrap();
        let vk = VerificationKey::from_spki(&pubkey, SigningScheme::EcdsaP256Sha256).unwrap();
        assert!(vk.verify(data, sig.as_ref()).is_ok());
    }

    #[test]
    fn test_verify_flipped_byte_fails() {
        let kp = EcdsaKeyPair::generate(&ECDSA_P256_SHA256_ASN1_SIGNING).unwrap();
        let rng = SystemRandom::new();
        let data = b"test data";
        let sig = kp.sign(&rng, data).unwrap();

        let mut tampered = data.to_vec();
        tampered[0] ^= 0x01;

        let pubkey = p256_spki_from_point(kp.public_key().as_ref()).unwrap();
        let vk = VerificationKey::from_spki(&pubkey, SigningScheme::EcdsaP256Sha256).unwrap();
        assert!(vk.verify(&tampered, sig.as_ref()).is_err());
    }

    #[test]
    fn test_verify_ed25519_auto() {
        let kp = Ed25519KeyPair::generate().unwrap();
        let data = b"checkpoint body\n";
        let sig = kp.sign(data);

        let pubkey = ed25519_spki_from_raw(kp.public_key().as_ref()).unwrap();
        assert_eq!(detect_scheme(&pubkey).unwrap(), SigningScheme::Ed25519);
        assert!(verify_signature_auto(&pubkey, data, sig.as_ref()).is_ok());
        assert!(verify_signature_auto(&pubkey, b"other data", sig.as_ref()).is_err());
    }

    #[test]
    fn test_detect_scheme_p256() {
        let kp = EcdsaKeyPair::generate(&ECDSA_P256_SHA256_ASN1_SIGNING).unwrap();
        let pubkey = p256_spki_from_point(kp.public_key().as_ref()).unwrap();
        assert_eq!(
            detect_scheme(&pubkey).unwrap(),
            SigningScheme::EcdsaP256Sha256
        );
    }

    #[test]
    fn test_key_details_mapping() {
        assert_eq!(
            SigningScheme::from_key_details("PKIX_ECDSA_P256_SHA_256").unwrap(),
            SigningScheme::EcdsaP256Sha256
        );
        assert_eq!(
            SigningScheme::from_key_details("PKIX_ED25519").unwrap(),
            SigningScheme::Ed25519
        );
        assert!(SigningScheme::from_key_details("LMS_SHA256").is_err());
    }

    #[test]
    fn test_invalid_spki_rejected() {
        let bogus = DerPublicKey::from_bytes(b"not a key");
        assert!(matches!(
            VerificationKey::from_spki(&bogus, SigningScheme::EcdsaP256Sha256),
            Err(Error::InvalidKey(_))
        ));
    }
}
