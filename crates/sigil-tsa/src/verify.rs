//! RFC 3161 timestamp verification
//!
//! Full verification of a timestamp token: message imprint, CMS signed
//! attributes (content type, message digest, signing time, ESS
//! SigningCertificateV2), the signature itself, and the signer chain.

use crate::asn1::{
    EssCertIdV2, SigningCertificateV2, TimeStampResp, TstInfo, OID_SIGNING_CERTIFICATE_V2,
    OID_SIGNING_TIME, OID_TST_INFO,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::{SignedData, SignerIdentifier};
use const_oid::db::rfc5280::ID_KP_TIME_STAMPING;
use const_oid::db::rfc5912::{ID_SHA_256, ID_SHA_384, ID_SHA_512, SECP_256_R_1, SECP_384_R_1};
use const_oid::db::rfc6268::{ID_CONTENT_TYPE, ID_MESSAGE_DIGEST};
use const_oid::ObjectIdentifier;
use rustls_pki_types::{CertificateDer, UnixTime};
use webpki::{anchor_from_trusted_cert, EndEntityCert, KeyUsage, ALL_VERIFICATION_ALGS};
use x509_cert::der::asn1::OctetStringRef;
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;

/// id-signedData: 1.2.840.113549.1.7.2
const ID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

/// Trust inputs for timestamp verification
#[derive(Debug, Clone, Default)]
pub struct VerifyOpts {
    /// Trust anchors for the signer chain
    pub roots: Vec<CertificateDer<'static>>,
    /// Additional intermediates beyond those embedded in the token
    pub intermediates: Vec<CertificateDer<'static>>,
    /// TSA signing certificates, for tokens that do not embed theirs
    pub tsa_certificates: Vec<CertificateDer<'static>>,
    /// Authority validity window: the timestamp itself must fall inside
    pub tsa_valid_for: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl VerifyOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roots(mut self, roots: Vec<CertificateDer<'static>>) -> Self {
        self.roots = roots;
        self
    }

    pub fn with_intermediates(mut self, intermediates: Vec<CertificateDer<'static>>) -> Self {
        self.intermediates = intermediates;
        self
    }

    pub fn with_tsa_certificates(mut self, certs: Vec<CertificateDer<'static>>) -> Self {
        self.tsa_certificates = certs;
        self
    }

    pub fn with_tsa_validity(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.tsa_valid_for = Some((start, end));
        self
    }
}

/// Outcome of a successful timestamp verification
#[derive(Debug, Clone)]
pub struct TimestampResult {
    /// The genTime asserted by the TSA
    pub time: DateTime<Utc>,
}

/// Verify an RFC 3161 timestamp token over `signature_bytes`.
///
/// Accepts either a full TimeStampResp or a bare timeStampToken
/// (ContentInfo), both DER-encoded.
pub fn verify_timestamp_response(
    timestamp_token_bytes: &[u8],
    signature_bytes: &[u8],
    opts: &VerifyOpts,
) -> Result<TimestampResult> {
    let content_info = match TimeStampResp::from_der(timestamp_token_bytes) {
        Ok(resp) => {
            if !resp.status.is_success() {
                return Err(Error::NotGranted(resp.status.status));
            }
            let token = resp.time_stamp_token.ok_or_else(|| {
                Error::ParseError("TimeStampResp missing timeStampToken".to_string())
            })?;
            let bytes = token
                .to_der()
                .map_err(|e| Error::ParseError(format!("failed to re-encode token: {}", e)))?;
            ContentInfo::from_der(&bytes)
                .map_err(|e| Error::ParseError(format!("failed to decode ContentInfo: {}", e)))?
        }
        Err(_) => ContentInfo::from_der(timestamp_token_bytes)
            .map_err(|e| Error::ParseError(format!("failed to decode timeStampToken: {}", e)))?,
    };

    if content_info.content_type != ID_SIGNED_DATA {
        return Err(Error::ParseError(
            "ContentInfo content type is not SignedData".to_string(),
        ));
    }

    let signed_data_der = content_info
        .content
        .to_der()
        .map_err(|e| Error::ParseError(format!("failed to encode SignedData: {}", e)))?;
    let signed_data = SignedData::from_der(&signed_data_der)
        .map_err(|e| Error::ParseError(format!("failed to decode SignedData: {}", e)))?;

    if signed_data.encap_content_info.econtent_type != OID_TST_INFO {
        return Err(Error::ParseError(
            "encapsulated content type is not TSTInfo".to_string(),
        ));
    }

    let tst_info_der = signed_data
        .encap_content_info
        .econtent
        .as_ref()
        .ok_or(Error::NoTstInfo)?
        .value();
    let tst_info = TstInfo::from_der(tst_info_der)
        .map_err(|e| Error::ParseError(format!("failed to decode TSTInfo: {}", e)))?;

    verify_message_imprint(&tst_info, signature_bytes)?;

    let system_time = tst_info.gen_time.to_system_time();
    let unix = system_time
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|_| Error::ParseError("timestamp before epoch".to_string()))?;
    let timestamp = DateTime::from_timestamp(unix.as_secs() as i64, unix.subsec_nanos())
        .ok_or_else(|| Error::ParseError("invalid genTime in TSTInfo".to_string()))?;

    if let Some((start, end)) = opts.tsa_valid_for {
        if timestamp < start || timestamp >= end {
            return Err(Error::OutsideValidityPeriod);
        }
    }

    tracing::debug!(gen_time = %timestamp, "verifying CMS signature over TSTInfo");
    let signer_cert = verify_cms_signature(&signed_data, tst_info_der, opts)?;

    let embedded_certs = extract_certificates(&signed_data);
    validate_signer_chain(&signer_cert, timestamp, opts, &embedded_certs)?;
    tracing::debug!("TSA signer chain validated");

    Ok(TimestampResult { time: timestamp })
}

/// Check that the message imprint is the digest of the timestamped bytes.
fn verify_message_imprint(tst_info: &TstInfo, signature_bytes: &[u8]) -> Result<()> {
    use aws_lc_rs::digest::{digest, SHA256, SHA384, SHA512};

    let imprint = &tst_info.message_imprint;
    let alg = &imprint.hash_algorithm.algorithm;

    let computed = if alg == &ID_SHA_256 {
        digest(&SHA256, signature_bytes)
    } else if alg == &ID_SHA_384 {
        digest(&SHA384, signature_bytes)
    } else if alg == &ID_SHA_512 {
        digest(&SHA512, signature_bytes)
    } else {
        return Err(Error::ParseError(format!(
            "unsupported imprint hash algorithm: {}",
            alg
        )));
    };

    let expected = imprint.hashed_message.as_bytes();
    if aws_lc_rs::constant_time::verify_slices_are_equal(computed.as_ref(), expected).is_err() {
        return Err(Error::ImprintMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(computed.as_ref()),
        });
    }

    Ok(())
}

/// Re-encode signed attributes for signature verification.
///
/// RFC 5652: the attributes are stored under an IMPLICIT [0] tag but are
/// signed as a plain SET OF.
fn signed_attrs_der(attrs: &x509_cert::attr::Attributes) -> Result<Vec<u8>> {
    use x509_cert::der::asn1::SetOfVec;

    let attrs_vec: Vec<x509_cert::attr::Attribute> = attrs.iter().cloned().collect();
    let generic_set = SetOfVec::try_from(attrs_vec)
        .map_err(|e| Error::SignatureVerification(format!("failed to build SET OF: {}", e)))?;
    generic_set
        .to_der()
        .map_err(|e| Error::SignatureVerification(format!("failed to re-encode attributes: {}", e)))
}

/// Fetch the single value of an attribute as DER bytes.
fn attribute_value_der(attrs: &x509_cert::attr::Attributes, oid: ObjectIdentifier) -> Result<Vec<u8>> {
    let attr = attrs
        .iter()
        .find(|attr| attr.oid == oid)
        .ok_or_else(|| Error::SignedAttribute(format!("missing required attribute {}", oid)))?;

    if attr.values.len() != 1 {
        return Err(Error::SignedAttribute(format!(
            "attribute {} must have exactly one value",
            oid
        )));
    }
    attr.values
        .get(0)
        .ok_or_else(|| Error::SignedAttribute(format!("attribute {} has no value", oid)))?
        .to_der()
        .map_err(|e| Error::SignedAttribute(format!("failed to encode attribute value: {}", e)))
}

/// Verify the required signed attributes and the CMS signature, returning
/// the signer certificate.
fn verify_cms_signature(
    signed_data: &SignedData,
    tst_info_der: &[u8],
    opts: &VerifyOpts,
) -> Result<Certificate> {
    use aws_lc_rs::digest::{digest, SHA256, SHA384};

    let signer_info = signed_data
        .signer_infos
        .0
        .get(0)
        .ok_or_else(|| Error::SignatureVerification("no signer info found".to_string()))?;

    let mut all_certs = extract_certificates(signed_data);
    for tsa_cert in &opts.tsa_certificates {
        if let Ok(cert) = Certificate::from_der(tsa_cert.as_ref()) {
            all_certs.push(cert);
        }
    }

    let signer_cert = find_signer_certificate(&signer_info.sid, &all_certs)?;

    let signed_attrs = signer_info
        .signed_attrs
        .as_ref()
        .ok_or_else(|| Error::SignedAttribute("no signed attributes".to_string()))?;

    // contentType must name TSTInfo.
    let content_type_der = attribute_value_der(signed_attrs, ID_CONTENT_TYPE)?;
    let content_type = ObjectIdentifier::from_der(&content_type_der)
        .map_err(|e| Error::SignedAttribute(format!("bad contentType value: {}", e)))?;
    if content_type != OID_TST_INFO {
        return Err(Error::SignedAttribute(format!(
            "contentType is {}, expected TSTInfo",
            content_type
        )));
    }

    // messageDigest must equal the digest of the TSTInfo content.
    let message_digest_der = attribute_value_der(signed_attrs, ID_MESSAGE_DIGEST)?;
    let message_digest = OctetStringRef::from_der(&message_digest_der)
        .map_err(|e| Error::SignedAttribute(format!("bad messageDigest value: {}", e)))?;
    let content_hash = if signer_info.digest_alg.oid == ID_SHA_256 {
        digest(&SHA256, tst_info_der)
    } else if signer_info.digest_alg.oid == ID_SHA_384 {
        digest(&SHA384, tst_info_der)
    } else {
        return Err(Error::SignatureVerification(format!(
            "unsupported digest algorithm: {}",
            signer_info.digest_alg.oid
        )));
    };
    if aws_lc_rs::constant_time::verify_slices_are_equal(
        content_hash.as_ref(),
        message_digest.as_bytes(),
    )
    .is_err()
    {
        return Err(Error::SignedAttribute(
            "messageDigest does not match TSTInfo".to_string(),
        ));
    }

    // signingTime must be present.
    attribute_value_der(signed_attrs, OID_SIGNING_TIME)?;

    // signingCertificateV2 must bind the signer certificate by hash.
    let signing_cert_der = attribute_value_der(signed_attrs, OID_SIGNING_CERTIFICATE_V2)?;
    let signing_cert_attr = SigningCertificateV2::from_der(&signing_cert_der)
        .map_err(|e| Error::SignedAttribute(format!("bad signingCertificateV2: {}", e)))?;
    verify_ess_cert_id(&signing_cert_attr, &signer_cert)?;

    // Finally the signature itself, over the re-encoded attribute set.
    let signed_attrs_bytes = signed_attrs_der(signed_attrs)?;
    verify_ecdsa_signature(
        signer_info.signature.as_bytes(),
        &signed_attrs_bytes,
        &signer_cert,
        &signer_info.digest_alg.oid,
    )?;

    Ok(signer_cert)
}

/// Check the ESSCertIDv2 hash against the signer certificate.
fn verify_ess_cert_id(attr: &SigningCertificateV2, signer_cert: &Certificate) -> Result<()> {
    use aws_lc_rs::digest::{digest, SHA256, SHA384};

    let first: &EssCertIdV2 = attr
        .certs
        .first()
        .ok_or_else(|| Error::SignedAttribute("signingCertificateV2 lists no certs".to_string()))?;

    let cert_der = signer_cert
        .to_der()
        .map_err(|e| Error::SignedAttribute(format!("failed to encode signer cert: {}", e)))?;

    let hash_oid = first
        .hash_algorithm
        .as_ref()
        .map(|a| a.algorithm)
        .unwrap_or(ID_SHA_256);
    let computed = if hash_oid == ID_SHA_256 {
        digest(&SHA256, &cert_der)
    } else if hash_oid == ID_SHA_384 {
        digest(&SHA384, &cert_der)
    } else {
        return Err(Error::SignedAttribute(format!(
            "unsupported ESSCertIDv2 hash algorithm: {}",
            hash_oid
        )));
    };

    if aws_lc_rs::constant_time::verify_slices_are_equal(
        computed.as_ref(),
        first.cert_hash.as_bytes(),
    )
    .is_err()
    {
        return Err(Error::SignedAttribute(
            "signingCertificateV2 hash does not match signer certificate".to_string(),
        ));
    }

    Ok(())
}

/// Collect X.509 certificates embedded in the SignedData.
fn extract_certificates(signed_data: &SignedData) -> Vec<Certificate> {
    let mut certificates = Vec::new();
    if let Some(cert_set) = &signed_data.certificates {
        for cert_choice in cert_set.0.iter() {
            match cert_choice {
                CertificateChoices::Certificate(cert) => certificates.push(cert.clone()),
                CertificateChoices::Other(_) => {
                    tracing::debug!("skipping non-standard certificate choice");
                }
            }
        }
    }
    certificates
}

/// Locate the certificate matching the SignerIdentifier.
fn find_signer_certificate(
    signer_id: &SignerIdentifier,
    certificates: &[Certificate],
) -> Result<Certificate> {
    match signer_id {
        SignerIdentifier::IssuerAndSerialNumber(issuer_serial) => {
            for cert in certificates {
                if cert.tbs_certificate.issuer == issuer_serial.issuer
                    && cert.tbs_certificate.serial_number == issuer_serial.serial_number
                {
                    return Ok(cert.clone());
                }
            }
            Err(Error::SignatureVerification(
                "no certificate matches issuer and serial number".to_string(),
            ))
        }
        SignerIdentifier::SubjectKeyIdentifier(ski) => {
            for cert in certificates {
                let Some(extensions) = &cert.tbs_certificate.extensions else {
                    continue;
                };
                for ext in extensions.iter() {
                    if ext.extn_id == const_oid::db::rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER {
                        if let Ok(cert_ski) = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(
                            ext.extn_value.as_bytes(),
                        ) {
                            if &cert_ski == ski {
                                return Ok(cert.clone());
                            }
                        }
                    }
                }
            }
            Err(Error::SignatureVerification(
                "no certificate matches subject key identifier".to_string(),
            ))
        }
    }
}

/// Verify the ECDSA signature over the signed attributes.
fn verify_ecdsa_signature(
    signature: &[u8],
    message: &[u8],
    certificate: &Certificate,
    digest_alg_oid: &ObjectIdentifier,
) -> Result<()> {
    use aws_lc_rs::signature::{
        UnparsedPublicKey, ECDSA_P256_SHA256_ASN1, ECDSA_P384_SHA256_ASN1, ECDSA_P384_SHA384_ASN1,
    };

    let spki = &certificate.tbs_certificate.subject_public_key_info;
    let public_key_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| Error::SignatureVerification("invalid public key encoding".to_string()))?;

    if spki.algorithm.oid != const_oid::db::rfc5912::ID_EC_PUBLIC_KEY {
        return Err(Error::SignatureVerification(format!(
            "unsupported TSA key algorithm: {}",
            spki.algorithm.oid
        )));
    }

    let params = spki.algorithm.parameters.as_ref().ok_or_else(|| {
        Error::SignatureVerification("missing EC curve parameters".to_string())
    })?;
    let curve_oid = params
        .decode_as::<ObjectIdentifier>()
        .map_err(|e| Error::SignatureVerification(format!("failed to decode curve OID: {}", e)))?;

    let algorithm = match (&curve_oid, digest_alg_oid) {
        (&SECP_256_R_1, &ID_SHA_256) => &ECDSA_P256_SHA256_ASN1,
        (&SECP_384_R_1, &ID_SHA_256) => &ECDSA_P384_SHA256_ASN1,
        (&SECP_384_R_1, &ID_SHA_384) => &ECDSA_P384_SHA384_ASN1,
        _ => {
            return Err(Error::SignatureVerification(format!(
                "unsupported curve/digest combination: {} / {}",
                curve_oid, digest_alg_oid
            )))
        }
    };

    UnparsedPublicKey::new(algorithm, public_key_bytes)
        .verify(message, signature)
        .map_err(|_| Error::SignatureVerification("signature verification failed".to_string()))
}

/// Validate the signer chain to a trusted TSA root at the asserted time.
fn validate_signer_chain(
    signer_cert: &Certificate,
    timestamp: DateTime<Utc>,
    opts: &VerifyOpts,
    embedded_certs: &[Certificate],
) -> Result<()> {
    if opts.roots.is_empty() {
        return Err(Error::CertificateValidation(
            "no trusted TSA roots configured".to_string(),
        ));
    }

    let signer_cert_der = signer_cert
        .to_der()
        .map_err(|e| Error::CertificateValidation(format!("failed to encode signer cert: {}", e)))?;
    let signer_cert_der = CertificateDer::from(signer_cert_der);
    let end_entity = EndEntityCert::try_from(&signer_cert_der).map_err(|e| {
        Error::CertificateValidation(format!("failed to parse end-entity certificate: {}", e))
    })?;

    let trust_anchors: Vec<_> = opts
        .roots
        .iter()
        .map(|cert| {
            anchor_from_trusted_cert(cert)
                .map(|anchor| anchor.to_owned())
                .map_err(|e| {
                    Error::CertificateValidation(format!("failed to create trust anchor: {}", e))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut intermediates: Vec<CertificateDer<'static>> = Vec::new();
    for cert in embedded_certs {
        if cert == signer_cert {
            continue;
        }
        let der = cert.to_der().map_err(|e| {
            Error::CertificateValidation(format!("failed to encode embedded cert: {}", e))
        })?;
        intermediates.push(CertificateDer::from(der));
    }
    intermediates.extend(opts.intermediates.iter().cloned());

    let verification_time =
        UnixTime::since_unix_epoch(std::time::Duration::from_secs(timestamp.timestamp() as u64));

    end_entity
        .verify_for_usage(
            ALL_VERIFICATION_ALGS,
            &trust_anchors,
            &intermediates,
            verification_time,
            KeyUsage::required(ID_KP_TIME_STAMPING.as_bytes()),
            None,
            None,
        )
        .map_err(|e| Error::CertificateValidation(format!("chain validation failed: {}", e)))?;

    Ok(())
}
