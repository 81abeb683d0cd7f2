//! X.509 certificate parsing for signing certificates
//!
//! Extracts the identity material the verifier needs from a leaf
//! certificate: subject alternative names, the Fulcio-issued OIDC issuer,
//! the validity window, and the public key with its signature scheme.

use crate::error::{Error, Result};
use crate::verify::{scheme_for_spki, SigningScheme};
use const_oid::ObjectIdentifier;
use sigil_types::DerPublicKey;
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::Certificate;

/// Fulcio OIDC issuer extension: 1.3.6.1.4.1.57264.1.1
const FULCIO_ISSUER_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.1");

/// Sigstore OtherName SAN type: 1.3.6.1.4.1.57264.1.7
const OTHERNAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.7");

/// Information extracted from a signing certificate
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    /// Subject alternative names in string form, in certificate order
    pub sans: Vec<String>,
    /// OIDC issuer from the Fulcio issuer extension
    pub issuer: Option<String>,
    /// Not valid before (Unix timestamp, inclusive)
    pub not_before: i64,
    /// Not valid after (Unix timestamp, exclusive upper bound of the
    /// window used for timestamp checks)
    pub not_after: i64,
    /// Public key as SPKI DER
    pub public_key: DerPublicKey,
    /// Scheme derived from the public key algorithm
    pub signing_scheme: SigningScheme,
}

/// Parse certificate information from a DER-encoded certificate
pub fn parse_certificate_info(cert_der: &[u8]) -> Result<CertificateInfo> {
    let cert = Certificate::from_der(cert_der)
        .map_err(|e| Error::InvalidCertificate(format!("failed to parse certificate: {}", e)))?;

    let not_before = cert
        .tbs_certificate
        .validity
        .not_before
        .to_unix_duration()
        .as_secs() as i64;
    let not_after = cert
        .tbs_certificate
        .validity
        .not_after
        .to_unix_duration()
        .as_secs() as i64;

    let spki = &cert.tbs_certificate.subject_public_key_info;
    let public_key_der = spki
        .to_der()
        .map_err(|e| Error::InvalidCertificate(format!("failed to encode SPKI: {}", e)))?;
    let signing_scheme = scheme_for_spki(spki)?;

    let sans = extract_sans(&cert)?;
    let issuer = extract_fulcio_issuer(&cert)?;

    Ok(CertificateInfo {
        sans,
        issuer,
        not_before,
        not_after,
        public_key: DerPublicKey::new(public_key_der),
        signing_scheme,
    })
}

/// Extract all subject alternative names in string form.
///
/// Covers RFC822 names, URIs, DNS names, and the Sigstore OtherName type.
pub fn extract_sans(cert: &Certificate) -> Result<Vec<String>> {
    let san_opt: Option<(bool, SubjectAltName)> = cert
        .tbs_certificate
        .get()
        .map_err(|e| Error::InvalidCertificate(format!("failed to get SAN extension: {}", e)))?;

    let Some((_critical, san)) = san_opt else {
        return Ok(Vec::new());
    };

    let mut names = Vec::new();
    for name in san.0.iter() {
        match name {
            GeneralName::Rfc822Name(email) => names.push(email.to_string()),
            GeneralName::UniformResourceIdentifier(uri) => names.push(uri.to_string()),
            GeneralName::DnsName(dns) => names.push(dns.to_string()),
            GeneralName::OtherName(other) if other.type_id == OTHERNAME_OID => {
                if let Ok(s) = std::str::from_utf8(other.value.value()) {
                    names.push(s.to_string());
                }
            }
            _ => continue,
        }
    }

    Ok(names)
}

/// Extract the OIDC issuer from the Fulcio issuer extension.
pub fn extract_fulcio_issuer(cert: &Certificate) -> Result<Option<String>> {
    let Some(extensions) = &cert.tbs_certificate.extensions else {
        return Ok(None);
    };

    for ext in extensions.iter() {
        if ext.extn_id == FULCIO_ISSUER_OID {
            return Ok(Some(decode_extension_string(ext.extn_value.as_bytes())));
        }
    }

    Ok(None)
}

/// Decode a Fulcio extension value.
///
/// The v2 extension family DER-encodes a UTF8String; v1 extensions carry
/// the raw string bytes.
pub fn decode_extension_string(value_bytes: &[u8]) -> String {
    if let Ok(utf8_str) = x509_cert::der::asn1::Utf8StringRef::from_der(value_bytes) {
        return utf8_str.to_string();
    }
    String::from_utf8_lossy(value_bytes).into_owned()
}
