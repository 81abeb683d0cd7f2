//! Cryptographic primitives for the sigil verifier
//!
//! Digests, signature verification, and X.509 parsing, with aws-lc-rs as
//! the cryptographic backend.

pub mod error;
pub mod hash;
pub mod verify;
pub mod x509;

pub use error::{Error, Result};
pub use hash::{constant_time_eq, digest, sha256, sha384, sha512};
pub use verify::{
    detect_scheme, ed25519_spki_from_raw, p256_spki_from_point, verify_signature,
    verify_signature_auto, SigningScheme, VerificationKey,
};
pub use x509::{
    decode_extension_string, extract_fulcio_issuer, extract_sans, parse_certificate_info,
    CertificateInfo,
};
