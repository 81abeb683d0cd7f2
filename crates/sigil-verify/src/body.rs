//! Log entry body consistency
//!
//! The canonicalized body of each transparency log entry must agree with
//! the bundle byte-for-byte: same signature, same key material (compared
//! as DER), and digests that match what the bundle content actually
//! hashes to. This is what stops a valid-looking entry for different
//! content being spliced into a bundle (CVE-2022-36056 and friends).

use crate::entity::SignedEntity;
use crate::error::{Result, VerifyError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sigil_crypto::{constant_time_eq, sha256};
use sigil_rekor::body::{DsseV001Body, EntryBody, HashedRekordV001Body, IntotoV002Body};
use sigil_rekor::Error as RekorError;
use sigil_types::{DsseEnvelope, SignatureContent, TransparencyLogEntry};

/// Key material resolved for the entity, for matching against what the
/// log witnessed.
pub(crate) struct EntityKeyMaterial {
    /// Leaf certificate DER, when the bundle carries a certificate
    pub cert_der: Option<Vec<u8>>,
    /// SPKI DER of the signing key (the certificate's, or the trusted key)
    pub spki_der: Vec<u8>,
}

pub(crate) fn verify_entry_bodies(
    entity: &SignedEntity<'_>,
    key_material: &EntityKeyMaterial,
    artifact: Option<&[u8]>,
) -> Result<()> {
    for entry in entity.tlog_entries {
        let body = EntryBody::parse(
            &entry.canonicalized_body,
            &entry.kind_version.kind,
            &entry.kind_version.version,
        )
        .map_err(|e| match e {
            RekorError::UnsupportedKind { kind, version } => VerifyError::TlogBody(format!(
                "unsupported entry kind/version: {}/{}",
                kind, version
            )),
            other => VerifyError::TlogBody(other.to_string()),
        })?;

        match (&body, entity.content) {
            (EntryBody::HashedRekordV001(body), SignatureContent::MessageSignature(msg)) => {
                verify_hashedrekord_v001(body, &msg.signature, key_material, artifact)?;
            }
            (EntryBody::IntotoV002(body), SignatureContent::DsseEnvelope(envelope)) => {
                verify_intoto_v002(body, envelope, key_material)?;
            }
            (EntryBody::DsseV001(body), SignatureContent::DsseEnvelope(envelope)) => {
                verify_dsse_v001(body, envelope, key_material)?;
            }
            _ => {
                return Err(VerifyError::TlogBody(format!(
                    "{} entry does not match the bundle's content type",
                    entry.kind_version.kind
                )));
            }
        }

        tracing::debug!(
            kind = %entry.kind_version.kind,
            log_index = entry.log_index,
            "log entry body matches bundle"
        );
    }

    Ok(())
}

/// Compare a body digest (hex, as the bodies carry them) against a
/// computed one, constant-time.
fn check_hex_digest(expected_hex: &str, computed: &[u8], what: &str) -> Result<()> {
    let expected = hex::decode(expected_hex)
        .map_err(|e| VerifyError::TlogBody(format!("invalid {} in entry body: {}", what, e)))?;
    if !constant_time_eq(&expected, computed) {
        return Err(VerifyError::TlogBody(format!(
            "{} in entry body does not match bundle content",
            what
        )));
    }
    Ok(())
}

/// Compare the key the log witnessed against the bundle's key material.
/// Certificates compare as certificate DER; bare keys as SPKI DER.
fn check_key_match(
    body_cert: Option<Vec<u8>>,
    body_spki: Option<Vec<u8>>,
    key_material: &EntityKeyMaterial,
) -> Result<()> {
    if let Some(body_cert) = body_cert {
        let Some(cert_der) = &key_material.cert_der else {
            return Err(VerifyError::TlogBody(
                "entry body embeds a certificate but the bundle has none".to_string(),
            ));
        };
        if body_cert != *cert_der {
            return Err(VerifyError::TlogBody(
                "certificate in entry body does not match the bundle".to_string(),
            ));
        }
        return Ok(());
    }

    if let Some(body_spki) = body_spki {
        if body_spki != key_material.spki_der {
            return Err(VerifyError::TlogBody(
                "public key in entry body does not match the bundle".to_string(),
            ));
        }
        return Ok(());
    }

    Err(VerifyError::TlogBody(
        "entry body carries no verifier key".to_string(),
    ))
}

fn verify_hashedrekord_v001(
    body: &HashedRekordV001Body,
    bundle_signature: &sigil_types::SignatureBytes,
    key_material: &EntityKeyMaterial,
    artifact: Option<&[u8]>,
) -> Result<()> {
    // Signature bytes must be identical.
    if body.spec.signature.content.as_bytes() != bundle_signature.as_bytes() {
        return Err(VerifyError::TlogBody(
            "signature in entry body does not match the bundle".to_string(),
        ));
    }

    // The embedded PEM may be a certificate or a bare key.
    let public_key = &body.spec.signature.public_key;
    let (body_cert, body_spki) = match public_key.to_certificate() {
        Ok(cert) => (Some(cert.into_bytes()), None),
        Err(_) => (
            None,
            Some(
                public_key
                    .to_public_key()
                    .map_err(|e| VerifyError::TlogBody(e.to_string()))?
                    .into_bytes(),
            ),
        ),
    };
    check_key_match(body_cert, body_spki, key_material)?;

    // The witnessed digest must be the digest of the artifact.
    let artifact = artifact.ok_or_else(|| {
        VerifyError::TlogBody("no artifact to check the entry digest against".to_string())
    })?;
    check_hex_digest(&body.spec.data.hash.value, &sha256(artifact), "artifact hash")
}

fn verify_intoto_v002(
    body: &IntotoV002Body,
    envelope: &DsseEnvelope,
    key_material: &EntityKeyMaterial,
) -> Result<()> {
    let content = &body.spec.content;

    // Payload hash covers the decoded payload bytes.
    check_hex_digest(
        &content.payload_hash.value,
        &sha256(envelope.payload.as_bytes()),
        "payload hash",
    )?;

    if content.envelope.signatures.len() != envelope.signatures.len() {
        return Err(VerifyError::TlogBody(format!(
            "signature count mismatch: bundle has {}, entry body has {}",
            envelope.signatures.len(),
            content.envelope.signatures.len()
        )));
    }

    // intoto bodies double-encode signatures and keys: the serde decode
    // yields base64 text, which decodes once more to the real bytes.
    for bundle_sig in &envelope.signatures {
        let mut found = false;
        for body_sig in &content.envelope.signatures {
            let sig_bytes = STANDARD
                .decode(body_sig.sig.as_bytes())
                .map_err(|e| VerifyError::TlogBody(format!("invalid signature in body: {}", e)))?;
            if sig_bytes != bundle_sig.sig.as_bytes() {
                continue;
            }

            if let Some(pem_b64) = &body_sig.public_key {
                let pem_text = STANDARD.decode(pem_b64.as_bytes()).map_err(|e| {
                    VerifyError::TlogBody(format!("invalid public key in body: {}", e))
                })?;
                let pem_str = String::from_utf8(pem_text).map_err(|e| {
                    VerifyError::TlogBody(format!("public key in body is not UTF-8: {}", e))
                })?;
                check_embedded_pem(&pem_str, key_material)?;
            }

            found = true;
            break;
        }
        if !found {
            return Err(VerifyError::TlogBody(
                "bundle signature not present in entry body".to_string(),
            ));
        }
    }

    Ok(())
}

fn verify_dsse_v001(
    body: &DsseV001Body,
    envelope: &DsseEnvelope,
    key_material: &EntityKeyMaterial,
) -> Result<()> {
    // Payload hash covers the decoded payload bytes.
    check_hex_digest(
        &body.spec.payload_hash.value,
        &sha256(envelope.payload.as_bytes()),
        "payload hash",
    )?;

    // Envelope hash covers the canonicalized envelope JSON.
    let canonical_envelope = serde_json_canonicalizer::to_vec(envelope)
        .map_err(|e| VerifyError::TlogBody(format!("envelope canonicalization failed: {}", e)))?;
    check_hex_digest(
        &body.spec.envelope_hash.value,
        &sha256(&canonical_envelope),
        "envelope hash",
    )?;

    if body.spec.signatures.len() != envelope.signatures.len() {
        return Err(VerifyError::TlogBody(format!(
            "signature count mismatch: bundle has {}, entry body has {}",
            envelope.signatures.len(),
            body.spec.signatures.len()
        )));
    }

    // Every bundle signature must appear in the body with matching
    // verifier key material.
    for bundle_sig in &envelope.signatures {
        let mut found = false;
        for body_sig in &body.spec.signatures {
            if body_sig.signature.as_bytes() != bundle_sig.sig.as_bytes() {
                continue;
            }
            let pem_text = String::from_utf8(body_sig.verifier.as_bytes().to_vec())
                .map_err(|e| VerifyError::TlogBody(format!("verifier is not UTF-8: {}", e)))?;
            check_embedded_pem(&pem_text, key_material)?;
            found = true;
            break;
        }
        if !found {
            return Err(VerifyError::TlogBody(
                "bundle signature not present in entry body".to_string(),
            ));
        }
    }

    Ok(())
}

/// Match a PEM block from an entry body (certificate or public key)
/// against the entity's key material.
fn check_embedded_pem(pem_str: &str, key_material: &EntityKeyMaterial) -> Result<()> {
    if let Ok(cert) = sigil_types::DerCertificate::from_pem(pem_str) {
        return check_key_match(Some(cert.into_bytes()), None, key_material);
    }
    let key = sigil_types::DerPublicKey::from_pem(pem_str)
        .map_err(|e| VerifyError::TlogBody(format!("unparseable verifier PEM: {}", e)))?;
    check_key_match(None, Some(key.into_bytes()), key_material)
}
