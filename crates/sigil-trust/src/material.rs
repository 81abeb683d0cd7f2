//! Indexed trust material
//!
//! The verifier-facing view over a trusted root: authorities indexed by
//! log id with half-open validity windows, plus a hint-indexed table of
//! caller-supplied signing keys.

use crate::error::{Error, Result};
use crate::trusted_root::{TrustedRoot, ValidityPeriod};
use chrono::{DateTime, Utc};
use rustls_pki_types::CertificateDer;
use sigil_crypto::SigningScheme;
use sigil_types::DerPublicKey;
use std::collections::HashMap;

/// A half-open validity window `[start, end)`. A missing endpoint means
/// unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    /// Window covering all time
    pub fn always() -> Self {
        Self::default()
    }

    /// Window from `start` with no end
    pub fn starting(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Bounded window
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether `at` falls inside the window
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let after_start = self.start.map_or(true, |s| at >= s);
        let before_end = self.end.map_or(true, |e| at < e);
        after_start && before_end
    }

    fn from_wire(period: &Option<ValidityPeriod>) -> Result<Self> {
        let Some(period) = period else {
            return Ok(Self::always());
        };
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::InvalidValidityPeriod(format!("{}: {}", s, e)))
        };
        Ok(Self {
            start: period.start.as_deref().map(parse).transpose()?,
            end: period.end.as_deref().map(parse).transpose()?,
        })
    }
}

/// A trusted transparency log
#[derive(Debug, Clone)]
pub struct TLogAuthority {
    /// SHA-256 of the log's public key
    pub log_id: Vec<u8>,
    /// SPKI DER of the log's public key
    pub public_key: DerPublicKey,
    /// Scheme derived from the declared key details
    pub scheme: SigningScheme,
    pub valid_for: ValidityWindow,
}

/// A trusted Certificate Transparency log
#[derive(Debug, Clone)]
pub struct CtLogAuthority {
    /// SHA-256 of the log's public key
    pub log_id: Vec<u8>,
    pub public_key: DerPublicKey,
    pub scheme: SigningScheme,
    pub valid_for: ValidityWindow,
}

/// A trusted certificate authority
#[derive(Debug, Clone)]
pub struct CertAuthority {
    /// Chain as it appears in the trust root, root last
    pub chain: Vec<Vec<u8>>,
    pub valid_for: ValidityWindow,
}

impl CertAuthority {
    /// The root certificate of this authority's chain
    pub fn root_der(&self) -> Option<CertificateDer<'static>> {
        self.chain
            .last()
            .map(|der| CertificateDer::from(der.clone()))
    }

    /// Certificates between leaf and root
    pub fn intermediate_ders(&self) -> Vec<CertificateDer<'static>> {
        if self.chain.len() < 2 {
            return Vec::new();
        }
        self.chain[..self.chain.len() - 1]
            .iter()
            .map(|der| CertificateDer::from(der.clone()))
            .collect()
    }
}

/// A trusted timestamping authority
#[derive(Debug, Clone)]
pub struct TsaAuthority {
    /// Chain with the signing certificate first, root last
    pub chain: Vec<Vec<u8>>,
    pub valid_for: ValidityWindow,
}

impl TsaAuthority {
    pub fn leaf_der(&self) -> Option<CertificateDer<'static>> {
        self.chain
            .first()
            .map(|der| CertificateDer::from(der.clone()))
    }

    pub fn root_der(&self) -> Option<CertificateDer<'static>> {
        self.chain
            .last()
            .map(|der| CertificateDer::from(der.clone()))
    }

    pub fn intermediate_ders(&self) -> Vec<CertificateDer<'static>> {
        if self.chain.len() <= 2 {
            return Vec::new();
        }
        self.chain[1..self.chain.len() - 1]
            .iter()
            .map(|der| CertificateDer::from(der.clone()))
            .collect()
    }
}

/// A caller-registered signing key, addressed by hint
#[derive(Debug, Clone)]
pub struct TrustedPublicKey {
    /// SPKI DER of the key
    pub key: DerPublicKey,
    /// Scheme the key signs with
    pub scheme: SigningScheme,
    pub valid_for: ValidityWindow,
}

/// The complete set of authorities a verifier trusts
#[derive(Debug, Clone, Default)]
pub struct TrustMaterial {
    tlogs: Vec<TLogAuthority>,
    ctlogs: Vec<CtLogAuthority>,
    cert_authorities: Vec<CertAuthority>,
    tsa_authorities: Vec<TsaAuthority>,
    keys: HashMap<String, TrustedPublicKey>,
}

impl TrustMaterial {
    /// Build trust material from a parsed trusted root.
    pub fn from_trusted_root(root: &TrustedRoot) -> Result<Self> {
        let mut tlogs = Vec::new();
        for tlog in &root.tlogs {
            let log_id = tlog
                .log_id
                .key_id
                .decode()
                .map_err(|e| Error::InvalidLogId(e.to_string()))?;
            tlogs.push(TLogAuthority {
                log_id,
                public_key: tlog.public_key.raw_bytes.clone(),
                scheme: SigningScheme::from_key_details(&tlog.public_key.key_details)
                    .map_err(|e| Error::UnsupportedKeyDetails(e.to_string()))?,
                valid_for: ValidityWindow::from_wire(&tlog.public_key.valid_for)?,
            });
        }

        let mut ctlogs = Vec::new();
        for ctlog in &root.ctlogs {
            // Derive the id from the key itself; SCT matching depends on
            // it being exactly SHA-256 of the SPKI.
            let log_id = sigil_crypto::sha256(ctlog.public_key.raw_bytes.as_bytes()).to_vec();
            ctlogs.push(CtLogAuthority {
                log_id,
                public_key: ctlog.public_key.raw_bytes.clone(),
                scheme: SigningScheme::from_key_details(&ctlog.public_key.key_details)
                    .map_err(|e| Error::UnsupportedKeyDetails(e.to_string()))?,
                valid_for: ValidityWindow::from_wire(&ctlog.public_key.valid_for)?,
            });
        }

        let mut cert_authorities = Vec::new();
        for ca in &root.certificate_authorities {
            cert_authorities.push(CertAuthority {
                chain: ca
                    .cert_chain
                    .certificates
                    .iter()
                    .map(|c| c.raw_bytes.as_bytes().to_vec())
                    .collect(),
                valid_for: ValidityWindow::from_wire(&ca.valid_for)?,
            });
        }

        let mut tsa_authorities = Vec::new();
        for tsa in &root.timestamp_authorities {
            tsa_authorities.push(TsaAuthority {
                chain: tsa
                    .cert_chain
                    .certificates
                    .iter()
                    .map(|c| c.raw_bytes.as_bytes().to_vec())
                    .collect(),
                valid_for: ValidityWindow::from_wire(&tsa.valid_for)?,
            });
        }

        Ok(Self {
            tlogs,
            ctlogs,
            cert_authorities,
            tsa_authorities,
            keys: HashMap::new(),
        })
    }

    /// Register a signing key under a hint.
    pub fn with_key(mut self, hint: impl Into<String>, key: TrustedPublicKey) -> Self {
        self.keys.insert(hint.into(), key);
        self
    }

    /// Add a transparency log authority directly.
    pub fn with_tlog(mut self, tlog: TLogAuthority) -> Self {
        self.tlogs.push(tlog);
        self
    }

    /// Add a CT log authority directly.
    pub fn with_ctlog(mut self, ctlog: CtLogAuthority) -> Self {
        self.ctlogs.push(ctlog);
        self
    }

    /// Add a certificate authority directly.
    pub fn with_cert_authority(mut self, ca: CertAuthority) -> Self {
        self.cert_authorities.push(ca);
        self
    }

    /// Add a timestamping authority directly.
    pub fn with_tsa_authority(mut self, tsa: TsaAuthority) -> Self {
        self.tsa_authorities.push(tsa);
        self
    }

    /// Find the transparency log with the given id, optionally requiring
    /// its window to contain `at`.
    pub fn tlog_for(&self, log_id: &[u8], at: Option<DateTime<Utc>>) -> Option<&TLogAuthority> {
        self.tlogs
            .iter()
            .find(|t| t.log_id == log_id && at.map_or(true, |at| t.valid_for.contains(at)))
    }

    /// Find the CT log with the given id, optionally filtered by time.
    pub fn ctlog_for(&self, log_id: &[u8], at: Option<DateTime<Utc>>) -> Option<&CtLogAuthority> {
        self.ctlogs
            .iter()
            .find(|t| t.log_id == log_id && at.map_or(true, |at| t.valid_for.contains(at)))
    }

    /// Certificate authorities whose window contains `at`.
    pub fn cert_authorities_at(&self, at: DateTime<Utc>) -> Vec<&CertAuthority> {
        self.cert_authorities
            .iter()
            .filter(|ca| ca.valid_for.contains(at))
            .collect()
    }

    /// All timestamping authorities.
    pub fn tsa_authorities(&self) -> &[TsaAuthority] {
        &self.tsa_authorities
    }

    /// Look up a registered signing key by hint.
    pub fn public_key(&self, hint: &str) -> Result<&TrustedPublicKey> {
        self.keys
            .get(hint)
            .ok_or_else(|| Error::KeyNotFound(hint.to_string()))
    }

    /// Whether any CT logs are configured.
    pub fn has_ctlogs(&self) -> bool {
        !self.ctlogs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_window_contains() {
        let always = ValidityWindow::always();
        assert!(always.contains(at(0)));
        assert!(always.contains(at(2_000_000_000)));

        let bounded = ValidityWindow::between(at(100), at(200));
        assert!(!bounded.contains(at(99)));
        assert!(bounded.contains(at(100)));
        assert!(bounded.contains(at(199)));
        // Half-open: the end is excluded.
        assert!(!bounded.contains(at(200)));
    }

    #[test]
    fn test_from_trusted_root() {
        let root = TrustedRoot::from_json(crate::trusted_root::tests::SAMPLE_TRUSTED_ROOT).unwrap();
        let material = TrustMaterial::from_trusted_root(&root).unwrap();

        let log_id = root.tlogs[0].log_id.key_id.decode().unwrap();
        // Inside the key's window.
        assert!(material
            .tlog_for(&log_id, Some(at(1_700_000_000)))
            .is_some());
        // Before the window start (2021-01-12).
        assert!(material.tlog_for(&log_id, Some(at(1_000_000_000))).is_none());
        // Unknown id.
        assert!(material.tlog_for(b"nope", None).is_none());

        // CA window is bounded: 2021-03-07 .. 2022-12-31.
        assert_eq!(material.cert_authorities_at(at(1_640_000_000)).len(), 1);
        assert!(material.cert_authorities_at(at(1_700_000_000)).is_empty());
    }

    #[test]
    fn test_key_index() {
        let material = TrustMaterial::default().with_key(
            "my-key",
            TrustedPublicKey {
                key: DerPublicKey::from_bytes(b"key"),
                scheme: SigningScheme::EcdsaP256Sha256,
                valid_for: ValidityWindow::always(),
            },
        );
        assert!(material.public_key("my-key").is_ok());
        assert!(matches!(
            material.public_key("other"),
            Err(Error::KeyNotFound(_))
        ));
    }
}
