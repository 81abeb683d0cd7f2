//! ASN.1 structures for the RFC 3161 Time-Stamp Protocol
//!
//! Also defines the ESS SigningCertificateV2 attribute (RFC 5035) used to
//! bind the timestamp signature to its signing certificate.

use const_oid::ObjectIdentifier;
use der::{
    asn1::{BitString, GeneralizedTime, Int, OctetString},
    Any, Decode, Encode, Sequence,
};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::Extensions;

/// id-ct-TSTInfo: 1.2.840.113549.1.9.16.1.4
pub const OID_TST_INFO: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.16.1.4");

/// id-aa-signingCertificateV2: 1.2.840.113549.1.9.16.2.47
pub const OID_SIGNING_CERTIFICATE_V2: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.16.2.47");

/// id-signingTime: 1.2.840.113549.1.9.5
pub const OID_SIGNING_TIME: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.5");

/// Algorithm identifier with optional parameters
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    #[asn1(optional = "true")]
    pub parameters: Option<Any>,
}

impl AlgorithmIdentifier {
    /// SHA-256 identifier
    pub fn sha256() -> Self {
        Self {
            algorithm: const_oid::db::rfc5912::ID_SHA_256,
            parameters: None,
        }
    }
}

/// Message imprint: the hash of the data being timestamped.
/// RFC 3161 §2.4.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct Asn1MessageImprint {
    pub hash_algorithm: AlgorithmIdentifier,
    pub hashed_message: OctetString,
}

impl Asn1MessageImprint {
    pub fn new(algorithm: AlgorithmIdentifier, digest: Vec<u8>) -> der::Result<Self> {
        Ok(Self {
            hash_algorithm: algorithm,
            hashed_message: OctetString::new(digest)?,
        })
    }
}

/// Time-stamp request. RFC 3161 §2.4.1.
///
/// The verifier never issues requests; this is the request/response
/// interface shape for callers that do.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct TimeStampReq {
    pub version: u8,
    pub message_imprint: Asn1MessageImprint,
    #[asn1(optional = "true")]
    pub req_policy: Option<ObjectIdentifier>,
    #[asn1(optional = "true")]
    pub nonce: Option<Int>,
    #[asn1(default = "default_false")]
    pub cert_req: bool,
}

fn default_false() -> bool {
    false
}

/// PKI status values. RFC 3161 §2.4.2
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum PkiStatus {
    Granted = 0,
    GrantedWithMods = 1,
    Rejection = 2,
    Waiting = 3,
    RevocationWarning = 4,
    RevocationNotification = 5,
}

/// PKI status info. RFC 3161 §2.4.2
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct PkiStatusInfo {
    pub status: u8,
    #[asn1(optional = "true")]
    pub status_string: Option<Any>,
    #[asn1(optional = "true")]
    pub fail_info: Option<BitString>,
}

impl PkiStatusInfo {
    /// Whether the status indicates a granted timestamp
    pub fn is_success(&self) -> bool {
        self.status == PkiStatus::Granted as u8 || self.status == PkiStatus::GrantedWithMods as u8
    }
}

/// Accuracy of the timestamp. RFC 3161 §2.4.2
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct Accuracy {
    #[asn1(optional = "true")]
    pub seconds: Option<u64>,
    #[asn1(context_specific = "0", optional = "true")]
    pub millis: Option<u16>,
    #[asn1(context_specific = "1", optional = "true")]
    pub micros: Option<u16>,
}

/// TSTInfo: the timestamp token payload. RFC 3161 §2.4.2
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct TstInfo {
    pub version: u8,
    pub policy: ObjectIdentifier,
    pub message_imprint: Asn1MessageImprint,
    pub serial_number: Int,
    pub gen_time: GeneralizedTime,
    #[asn1(optional = "true")]
    pub accuracy: Option<Accuracy>,
    #[asn1(default = "default_false")]
    pub ordering: bool,
    #[asn1(optional = "true")]
    pub nonce: Option<Int>,
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT")]
    pub tsa: Option<GeneralName>,
    #[asn1(context_specific = "1", optional = "true", tag_mode = "IMPLICIT")]
    pub extensions: Option<Extensions>,
}

/// Time-stamp response. RFC 3161 §2.4.2
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct TimeStampResp {
    pub status: PkiStatusInfo,
    /// CMS ContentInfo carrying the SignedData
    #[asn1(optional = "true")]
    pub time_stamp_token: Option<Any>,
}

/// ESSCertIDv2: identifies a certificate by hash. RFC 5035 §4
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EssCertIdV2 {
    /// Defaults to SHA-256 when absent
    #[asn1(optional = "true")]
    pub hash_algorithm: Option<AlgorithmIdentifier>,
    pub cert_hash: OctetString,
    #[asn1(optional = "true")]
    pub issuer_serial: Option<Any>,
}

/// SigningCertificateV2 signed attribute. RFC 5035 §3
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SigningCertificateV2 {
    pub certs: Vec<EssCertIdV2>,
    #[asn1(optional = "true")]
    pub policies: Option<Any>,
}
