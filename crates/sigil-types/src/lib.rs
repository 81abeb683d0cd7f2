//! Core data model for Sigstore bundle verification
//!
//! This crate defines the bundle wire format, the DSSE envelope, checkpoint
//! (signed note) parsing, and the encoding newtypes shared by the rest of
//! the workspace.

pub mod bundle;
pub mod checkpoint;
pub mod dsse;
pub mod encoding;
pub mod error;
pub mod hash;

pub use bundle::{
    Bundle, BundleVersion, CheckpointData, InclusionPromise, InclusionProof, KindVersion, LogId,
    MessageDigest, MessageSignature, Rfc3161Timestamp, SignatureContent, TimestampVerificationData,
    TransparencyLogEntry, VerificationMaterial, VerificationMaterialContent,
};
pub use checkpoint::{Checkpoint, NoteSignature, SignedNote};
pub use dsse::{pae, DsseEnvelope, DsseSignature};
pub use encoding::{
    string_i64, string_u64, CanonicalizedBody, DerCertificate, DerPublicKey, KeyHint, LogKeyId,
    PayloadBytes, PemContent, Sha256Hash, SignatureBytes, SignedTimestamp, TimestampToken,
};
pub use error::{Error, Result};
pub use hash::HashAlgorithm;
