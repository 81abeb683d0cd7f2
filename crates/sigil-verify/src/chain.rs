//! Certificate chain validation
//!
//! Builds a path from the bundle's leaf certificate to a trusted
//! certificate authority whose validity window contains the check time.
//! webpki enforces the per-certificate requirements along the path:
//! signatures, basic constraints, keyCertSign on intermediates, validity
//! windows, and the codeSigning EKU on the leaf.

use crate::error::{Result, VerifyError};
use chrono::{DateTime, Utc};
use const_oid::db::rfc5912::ID_KP_CODE_SIGNING;
use rustls_pki_types::{CertificateDer, UnixTime};
use sigil_trust::TrustMaterial;
use sigil_types::DerCertificate;
use webpki::{anchor_from_trusted_cert, EndEntityCert, KeyUsage, ALL_VERIFICATION_ALGS};

/// Longest acceptable chain (leaf plus intermediates)
const MAX_CHAIN_LENGTH: usize = 10;

pub(crate) fn verify_certificate_chain(
    leaf: &DerCertificate,
    bundle_intermediates: &[&DerCertificate],
    trust: &TrustMaterial,
    check_time: DateTime<Utc>,
) -> Result<()> {
    if 1 + bundle_intermediates.len() > MAX_CHAIN_LENGTH {
        return Err(VerifyError::Certificate(format!(
            "certificate chain of {} exceeds maximum length {}",
            1 + bundle_intermediates.len(),
            MAX_CHAIN_LENGTH
        )));
    }

    let authorities = trust.cert_authorities_at(check_time);
    if authorities.is_empty() {
        return Err(VerifyError::Certificate(
            "no certificate authority is valid at the check time".to_string(),
        ));
    }

    let trust_anchors: Vec<_> = authorities
        .iter()
        .filter_map(|ca| ca.root_der())
        .filter_map(|der| anchor_from_trusted_cert(&der).map(|a| a.to_owned()).ok())
        .collect();
    if trust_anchors.is_empty() {
        return Err(VerifyError::Certificate(
            "no usable trust anchors among the certificate authorities".to_string(),
        ));
    }

    // Intermediates from the bundle plus those published by the
    // authorities themselves.
    let mut intermediates: Vec<CertificateDer<'static>> = bundle_intermediates
        .iter()
        .map(|c| CertificateDer::from(c.as_bytes().to_vec()))
        .collect();
    for ca in &authorities {
        intermediates.extend(ca.intermediate_ders());
    }

    let leaf_der = CertificateDer::from(leaf.as_bytes());
    let end_entity = EndEntityCert::try_from(&leaf_der).map_err(|e| {
        VerifyError::Certificate(format!("failed to parse leaf certificate: {}", e))
    })?;

    let verification_time =
        UnixTime::since_unix_epoch(std::time::Duration::from_secs(check_time.timestamp() as u64));

    end_entity
        .verify_for_usage(
            ALL_VERIFICATION_ALGS,
            &trust_anchors,
            &intermediates,
            verification_time,
            KeyUsage::required(ID_KP_CODE_SIGNING.as_bytes()),
            None,
            None,
        )
        .map_err(|e| VerifyError::Certificate(format!("chain validation failed: {}", e)))?;

    tracing::debug!(at = %check_time, "certificate chain validated");
    Ok(())
}
