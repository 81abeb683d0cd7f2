//! Timestamp witnesses
//!
//! Each independent attestation of signing time is a `VerifiedTimestamp`
//! tagged with its source kind, so the orchestrator can count sources
//! against their own thresholds.

use crate::error::{Result, VerifyError};
use chrono::{DateTime, Utc};
use sigil_trust::TrustMaterial;
use sigil_tsa::{verify_timestamp_response, VerifyOpts};
use sigil_types::Rfc3161Timestamp;

/// Where a verified timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    /// Integrated time from a transparency log entry
    TransparencyLog,
    /// RFC 3161 token from a timestamping authority
    TimestampAuthority,
}

/// A timestamp that survived verification
#[derive(Debug, Clone, Copy)]
pub struct VerifiedTimestamp {
    pub time: DateTime<Utc>,
    pub source: TimestampSource,
}

/// Verify every RFC 3161 token in the bundle against the trusted TSAs.
///
/// Each token must verify against some authority whose validity window
/// contains the asserted time; any failing token fails verification.
pub(crate) fn verify_rfc3161_timestamps(
    tokens: &[Rfc3161Timestamp],
    signature_bytes: &[u8],
    trust: &TrustMaterial,
) -> Result<Vec<VerifiedTimestamp>> {
    let mut verified = Vec::with_capacity(tokens.len());

    for token in tokens {
        let mut result = None;
        let mut last_error = "no timestamping authorities configured".to_string();

        for tsa in trust.tsa_authorities() {
            let mut opts = VerifyOpts::new();
            if let Some(root) = tsa.root_der() {
                opts = opts.with_roots(vec![root]);
            }
            opts = opts.with_intermediates(tsa.intermediate_ders());
            if let Some(leaf) = tsa.leaf_der() {
                opts = opts.with_tsa_certificates(vec![leaf]);
            }

            match verify_timestamp_response(token.signed_timestamp.as_bytes(), signature_bytes, &opts)
            {
                Ok(r) if tsa.valid_for.contains(r.time) => {
                    result = Some(r);
                    break;
                }
                Ok(r) => {
                    last_error = format!(
                        "timestamp {} outside the authority's validity window",
                        r.time
                    );
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        let result = result
            .ok_or_else(|| VerifyError::Timestamp(format!("RFC 3161 token: {}", last_error)))?;

        tracing::debug!(time = %result.time, "verified RFC 3161 timestamp");
        verified.push(VerifiedTimestamp {
            time: result.time,
            source: TimestampSource::TimestampAuthority,
        });
    }

    Ok(verified)
}

/// Convert a Unix timestamp into a `DateTime`, rejecting out-of-range
/// values instead of clamping them.
pub(crate) fn datetime_from_unix(secs: i64, context: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| VerifyError::Timestamp(format!("{}: invalid timestamp {}", context, secs)))
}
