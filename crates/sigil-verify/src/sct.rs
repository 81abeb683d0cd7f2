//! Signed Certificate Timestamp verification
//!
//! SCTs embedded in the signing certificate prove it was submitted to a
//! Certificate Transparency log. Each SCT is checked against the trusted
//! CT log whose id matches; the count of valid SCTs must reach the
//! configured threshold.

use crate::error::{Result, VerifyError};
use chrono::DateTime;
use const_oid::db::rfc6962::CT_PRECERT_SCTS;
use sigil_crypto::{verify_signature, SigningScheme};
use sigil_trust::TrustMaterial;
use tls_codec::{SerializeBytes, TlsByteVecU16, TlsByteVecU24, TlsSerializeBytes, TlsSize};
use x509_cert::{
    der::{Decode, Encode},
    ext::pkix::{sct::Version, SignedCertificateTimestamp, SignedCertificateTimestampList},
    Certificate,
};

// TLS SignatureAndHashAlgorithm values (RFC 5246)
const ECDSA_SHA256: u16 = 0x0403;
const ECDSA_SHA384: u16 = 0x0503;
const RSA_PKCS1_SHA256: u16 = 0x0401;
const RSA_PKCS1_SHA384: u16 = 0x0501;
const RSA_PKCS1_SHA512: u16 = 0x0601;

/// SignatureType from RFC 6962
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u8)]
enum SignatureType {
    CertificateTimestamp = 0,
    #[allow(unused)]
    TreeHash = 1,
}

/// LogEntryType from RFC 6962
#[derive(PartialEq, Debug)]
#[repr(u16)]
enum LogEntryType {
    X509Entry = 0,
    PrecertEntry = 1,
}

/// PreCert structure for precertificate entries
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct PreCert {
    /// SHA-256 of the issuer's SubjectPublicKeyInfo
    issuer_key_hash: [u8; 32],
    /// TBSCertificate with the SCT extension removed
    tbs_certificate: TlsByteVecU24,
}

/// The entry the log signed
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u16)]
enum SignedEntry {
    #[allow(unused)]
    #[tls_codec(discriminant = "LogEntryType::X509Entry")]
    X509Entry(TlsByteVecU24),
    #[tls_codec(discriminant = "LogEntryType::PrecertEntry")]
    PrecertEntry(PreCert),
}

/// The digitally-signed structure covered by an SCT signature
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct DigitallySigned {
    version: Version,
    signature_type: SignatureType,
    timestamp: u64,
    signed_entry: SignedEntry,
    extensions: TlsByteVecU16,
}

impl DigitallySigned {
    /// Reconstruct the signed structure for an SCT embedded in `cert`.
    ///
    /// The precertificate TBS is the certificate's TBS with the SCT list
    /// extension removed.
    fn from_embedded_sct(
        cert: &Certificate,
        sct: &SignedCertificateTimestamp,
        issuer_key_hash: [u8; 32],
    ) -> Result<Self> {
        let mut tbs_precert = cert.tbs_certificate.clone();
        tbs_precert.extensions = tbs_precert.extensions.map(|exts| {
            exts.iter()
                .filter(|ext| ext.extn_id != CT_PRECERT_SCTS)
                .cloned()
                .collect()
        });

        let mut tbs_precert_der = Vec::new();
        tbs_precert
            .encode_to_vec(&mut tbs_precert_der)
            .map_err(|e| VerifyError::Certificate(format!("failed to encode precert TBS: {}", e)))?;

        Ok(DigitallySigned {
            version: match sct.version {
                Version::V1 => Version::V1,
            },
            signature_type: SignatureType::CertificateTimestamp,
            timestamp: sct.timestamp,
            signed_entry: SignedEntry::PrecertEntry(PreCert {
                issuer_key_hash,
                tbs_certificate: tbs_precert_der.as_slice().into(),
            }),
            extensions: sct.extensions.clone(),
        })
    }
}

fn scheme_for_tls_alg(sig_alg: u16) -> Result<SigningScheme> {
    match sig_alg {
        ECDSA_SHA256 => Ok(SigningScheme::EcdsaP256Sha256),
        ECDSA_SHA384 => Ok(SigningScheme::EcdsaP384Sha384),
        RSA_PKCS1_SHA256 => Ok(SigningScheme::RsaPkcs1Sha256),
        RSA_PKCS1_SHA384 => Ok(SigningScheme::RsaPkcs1Sha384),
        RSA_PKCS1_SHA512 => Ok(SigningScheme::RsaPkcs1Sha512),
        other => Err(VerifyError::Certificate(format!(
            "unsupported SCT signature algorithm: 0x{:04x}",
            other
        ))),
    }
}

/// Verify the SCTs embedded in `cert_der`, requiring at least `threshold`
/// of them to check out against trusted CT logs.
pub(crate) fn verify_scts(
    cert_der: &[u8],
    issuer_spki_der: &[u8],
    trust: &TrustMaterial,
    threshold: usize,
) -> Result<()> {
    if threshold == 0 {
        return Ok(());
    }

    let cert = Certificate::from_der(cert_der)
        .map_err(|e| VerifyError::Certificate(format!("failed to parse certificate: {}", e)))?;

    let scts: SignedCertificateTimestampList = match cert.tbs_certificate.get() {
        Ok(Some((_, ext))) => ext,
        _ => {
            return Err(VerifyError::Certificate(
                "certificate has no SCT extension".to_string(),
            ))
        }
    };
    let serialized = scts
        .parse_timestamps()
        .map_err(|e| VerifyError::Certificate(format!("failed to parse SCT list: {:?}", e)))?;

    let issuer_key_hash = sigil_crypto::sha256(issuer_spki_der);

    let mut valid = 0usize;
    for serialized_sct in &serialized {
        let sct = serialized_sct
            .parse_timestamp()
            .map_err(|e| VerifyError::Certificate(format!("failed to parse SCT: {:?}", e)))?;

        // Match the SCT to a CT log trusted at the SCT's own timestamp.
        let at = DateTime::from_timestamp_millis(sct.timestamp as i64);
        let Some(authority) = trust.ctlog_for(&sct.log_id.key_id, at) else {
            tracing::debug!("SCT log id not among trusted CT logs, skipping");
            continue;
        };

        let digitally_signed = DigitallySigned::from_embedded_sct(&cert, &sct, issuer_key_hash)?;
        let signed_data = digitally_signed.tls_serialize().map_err(|e| {
            VerifyError::Certificate(format!("failed to serialize SCT data: {}", e))
        })?;

        let alg_bytes = sct.signature.algorithm.tls_serialize().map_err(|e| {
            VerifyError::Certificate(format!("failed to serialize signature algorithm: {}", e))
        })?;
        let scheme = scheme_for_tls_alg(u16::from_be_bytes([alg_bytes[0], alg_bytes[1]]))?;

        let signature: Vec<u8> = sct.signature.signature.clone().into_vec();
        if verify_signature(&authority.public_key, &signed_data, &signature, scheme).is_ok() {
            valid += 1;
        }
    }

    if valid < threshold {
        return Err(VerifyError::Certificate(format!(
            "{} valid SCT(s), threshold is {}",
            valid, threshold
        )));
    }

    tracing::debug!(valid, "SCT threshold met");
    Ok(())
}

/// Find the issuer's SPKI for SCT verification: from the bundle's chain
/// when it carries the issuer, otherwise from the trusted CA whose
/// subject matches the leaf's issuer.
pub(crate) fn issuer_spki(
    leaf_der: &[u8],
    bundle_intermediates: &[&sigil_types::DerCertificate],
    trust: &TrustMaterial,
    check_time: DateTime<chrono::Utc>,
) -> Result<Vec<u8>> {
    if let Some(issuer) = bundle_intermediates.first() {
        let issuer_cert = Certificate::from_der(issuer.as_bytes()).map_err(|e| {
            VerifyError::Certificate(format!("failed to parse issuer certificate: {}", e))
        })?;
        return issuer_cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| VerifyError::Certificate(format!("failed to encode issuer SPKI: {}", e)));
    }

    let leaf = Certificate::from_der(leaf_der)
        .map_err(|e| VerifyError::Certificate(format!("failed to parse certificate: {}", e)))?;
    let issuer_name = leaf.tbs_certificate.issuer;

    for ca in trust.cert_authorities_at(check_time) {
        for der in &ca.chain {
            let Ok(candidate) = Certificate::from_der(der) else {
                continue;
            };
            if candidate.tbs_certificate.subject == issuer_name {
                return candidate
                    .tbs_certificate
                    .subject_public_key_info
                    .to_der()
                    .map_err(|e| {
                        VerifyError::Certificate(format!("failed to encode issuer SPKI: {}", e))
                    });
            }
        }
    }

    Err(VerifyError::Certificate(
        "could not locate the issuer certificate for SCT verification".to_string(),
    ))
}
