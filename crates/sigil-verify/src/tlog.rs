//! Transparency log entry verification
//!
//! Per entry: the Signed Entry Timestamp (inclusion promise), the Merkle
//! inclusion proof with its signed checkpoint, and the integrated-time
//! plausibility checks. Which witnesses are mandatory depends on the
//! bundle version; when both are present, both must pass.

use crate::error::{Result, VerifyError};
use crate::timestamp::{datetime_from_unix, TimestampSource, VerifiedTimestamp};
use serde::Serialize;
use sigil_crypto::verify_signature;
use sigil_merkle::{hash_leaf, verify_inclusion_proof};
use sigil_trust::TrustMaterial;
use sigil_types::{
    BundleVersion, InclusionProof, KeyHint, SignedNote, TransparencyLogEntry,
};
use std::collections::HashSet;

/// Tolerated clock skew when rejecting future integrated times
const CLOCK_SKEW_SECONDS: i64 = 60;

/// Outcome of verifying the tlog entries of a bundle
pub(crate) struct TlogSummary {
    /// Number of entries whose required witnesses all verified
    pub valid_entries: usize,
    /// Trustworthy integrated times (SET-backed)
    pub timestamps: Vec<VerifiedTimestamp>,
}

pub(crate) fn verify_tlog_entries(
    version: BundleVersion,
    entries: &[TransparencyLogEntry],
    trust: &TrustMaterial,
) -> Result<TlogSummary> {
    let mut seen: HashSet<(Vec<u8>, u64)> = HashSet::new();
    let mut summary = TlogSummary {
        valid_entries: 0,
        timestamps: Vec::new(),
    };

    for entry in entries {
        let log_id = entry
            .log_id
            .key_id
            .decode()
            .map_err(|e| VerifyError::Timestamp(format!("invalid log id: {}", e)))?;

        if !seen.insert((log_id.clone(), entry.log_index)) {
            return Err(VerifyError::Timestamp(format!(
                "duplicate log entry: index {} in log {}",
                entry.log_index, entry.log_id.key_id
            )));
        }

        // Version-specific witness requirements. v0.3 bundles SHOULD carry
        // both; anything present is verified regardless.
        if version == BundleVersion::V0_1 && entry.inclusion_promise.is_none() {
            return Err(VerifyError::InclusionPromise(
                "v0.1 bundle entry is missing its inclusion promise".to_string(),
            ));
        }
        if version >= BundleVersion::V0_2 && entry.inclusion_proof.is_none() {
            return Err(VerifyError::InclusionProof(format!(
                "{:?} bundle entry is missing its inclusion proof",
                version
            )));
        }

        if entry.inclusion_promise.is_some() {
            verify_set(entry, &log_id, trust)?;
        }
        if let Some(proof) = &entry.inclusion_proof {
            verify_inclusion(entry, proof, &log_id, trust)?;
        }

        summary.valid_entries += 1;

        // The integrated time is only log-attested when the entry carries
        // a SET over it, so only then does it count as a time witness.
        if entry.integrated_time > 0 && entry.inclusion_promise.is_some() {
            let time = datetime_from_unix(entry.integrated_time, "integrated time")?;
            let now = chrono::Utc::now();
            if entry.integrated_time > now.timestamp() + CLOCK_SKEW_SECONDS {
                return Err(VerifyError::Timestamp(format!(
                    "integrated time {} is in the future",
                    entry.integrated_time
                )));
            }
            summary.timestamps.push(VerifiedTimestamp {
                time,
                source: TimestampSource::TransparencyLog,
            });
        }
    }

    Ok(summary)
}

/// The canonical payload a log signs its SET over.
///
/// Serialized with RFC 8785 canonicalization: lexicographic key order and
/// compact separators, matching the log's own signing input.
#[derive(Serialize)]
struct SetPayload<'a> {
    body: String,
    #[serde(rename = "integratedTime")]
    integrated_time: i64,
    #[serde(rename = "logIndex")]
    log_index: u64,
    #[serde(rename = "logID")]
    log_id: &'a str,
}

/// Verify an entry's Signed Entry Timestamp.
fn verify_set(entry: &TransparencyLogEntry, log_id: &[u8], trust: &TrustMaterial) -> Result<()> {
    let promise = entry
        .inclusion_promise
        .as_ref()
        .ok_or_else(|| VerifyError::InclusionPromise("missing inclusion promise".to_string()))?;

    // The SET covers the integrated time; an entry without one has
    // nothing for the log to have signed.
    if entry.integrated_time <= 0 {
        return Err(VerifyError::InclusionPromise(
            "entry with inclusion promise has no integrated time".to_string(),
        ));
    }
    let integrated_at = datetime_from_unix(entry.integrated_time, "integrated time")
        .map_err(|e| VerifyError::InclusionPromise(e.to_string()))?;

    let authority = trust.tlog_for(log_id, Some(integrated_at)).ok_or_else(|| {
        VerifyError::InclusionPromise(format!(
            "no trusted log for id {} at the integrated time",
            entry.log_id.key_id
        ))
    })?;

    let log_id_hex = hex::encode(log_id);
    let payload = SetPayload {
        body: entry.canonicalized_body.to_base64(),
        integrated_time: entry.integrated_time,
        log_index: entry.log_index,
        log_id: &log_id_hex,
    };
    let canonical = serde_json_canonicalizer::to_vec(&payload)
        .map_err(|e| VerifyError::InclusionPromise(format!("canonicalization failed: {}", e)))?;

    verify_signature(
        &authority.public_key,
        &canonical,
        promise.signed_entry_timestamp.as_bytes(),
        authority.scheme,
    )
    .map_err(|e| VerifyError::InclusionPromise(format!("SET signature invalid: {}", e)))?;

    tracing::debug!(log_index = entry.log_index, "verified SET");
    Ok(())
}

/// Verify an entry's Merkle inclusion proof and its signed checkpoint.
fn verify_inclusion(
    entry: &TransparencyLogEntry,
    proof: &InclusionProof,
    log_id: &[u8],
    trust: &TrustMaterial,
) -> Result<()> {
    // Recompute the root from the entry body and the audit path.
    let leaf_hash = hash_leaf(entry.canonicalized_body.as_bytes());
    let proof_hashes: Vec<[u8; 32]> = proof.hashes.iter().map(|h| *h.as_bytes()).collect();
    verify_inclusion_proof(
        &leaf_hash,
        proof.log_index,
        proof.tree_size,
        &proof_hashes,
        proof.root_hash.as_bytes(),
    )
    .map_err(|e| VerifyError::InclusionProof(e.to_string()))?;

    // The checkpoint must commit to the same root.
    if proof.checkpoint.is_empty() {
        return Err(VerifyError::InclusionProof(
            "inclusion proof has no checkpoint".to_string(),
        ));
    }
    let note = SignedNote::from_text(&proof.checkpoint.envelope)
        .map_err(|e| VerifyError::InclusionProof(e.to_string()))?;

    if note.checkpoint.root_hash != proof.root_hash.as_slice() {
        return Err(VerifyError::InclusionProof(
            "checkpoint root hash does not match inclusion proof".to_string(),
        ));
    }

    // A trusted log must have signed the note: match by key hint, then
    // verify over the note body bytes.
    let integrated_at = if entry.integrated_time > 0 {
        datetime_from_unix(entry.integrated_time, "integrated time").ok()
    } else {
        None
    };

    let authority = trust.tlog_for(log_id, integrated_at).ok_or_else(|| {
        VerifyError::InclusionProof(format!(
            "no trusted log for id {}",
            entry.log_id.key_id
        ))
    })?;

    let hint = KeyHint::from_prefix(&authority.log_id)
        .map_err(|e| VerifyError::InclusionProof(e.to_string()))?;
    let signature = note.signature_for_hint(&hint).ok_or_else(|| {
        VerifyError::InclusionProof("no checkpoint signature matches a trusted log".to_string())
    })?;

    verify_signature(
        &authority.public_key,
        note.note_body.as_bytes(),
        &signature.signature,
        authority.scheme,
    )
    .map_err(|e| VerifyError::InclusionProof(format!("checkpoint signature invalid: {}", e)))?;

    tracing::debug!(log_index = entry.log_index, "verified inclusion proof");
    Ok(())
}
