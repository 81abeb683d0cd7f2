//! RFC 3161 timestamp verification
//!
//! Parses TimeStampResp / timeStampToken structures and verifies them
//! against a trusted timestamping authority: message imprint, CMS
//! signature over the signed attributes, and signer chain validation.

pub mod asn1;
pub mod error;
pub mod verify;

pub use asn1::{Accuracy, AlgorithmIdentifier, Asn1MessageImprint, EssCertIdV2, PkiStatus,
    PkiStatusInfo, SigningCertificateV2, TimeStampReq, TimeStampResp, TstInfo};
pub use error::{Error, Result};
pub use verify::{verify_timestamp_response, TimestampResult, VerifyOpts};
