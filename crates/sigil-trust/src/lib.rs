//! Trust material for the sigil verifier
//!
//! Parses the protobuf-JSON `TrustedRoot` wire form and builds an indexed,
//! time-filtered view over the authorities it describes: transparency
//! logs, CT logs, certificate authorities, timestamping authorities, and
//! caller-supplied public keys.

pub mod error;
pub mod material;
pub mod trusted_root;

pub use error::{Error, Result};
pub use material::{
    CertAuthority, CtLogAuthority, TLogAuthority, TrustMaterial, TrustedPublicKey, TsaAuthority,
    ValidityWindow,
};
pub use trusted_root::TrustedRoot;
