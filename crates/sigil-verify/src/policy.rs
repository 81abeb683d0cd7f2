//! Certificate identity policy
//!
//! A caller-supplied identity the signing certificate must match: a
//! subject alternative name (any SAN type, compared in string form) plus
//! any number of extension OID/value requirements.
//!
//! OID reference:
//! <https://github.com/sigstore/fulcio/blob/main/docs/oid-info.md>

use crate::error::{Result, VerifyError};
use const_oid::ObjectIdentifier;
use sigil_crypto::{decode_extension_string, extract_sans};
use x509_cert::Certificate;

macro_rules! oids {
    ($($(#[$meta:meta])* $name:ident = $value:literal),+ $(,)?) => {
        $($(#[$meta])* pub const $name: ObjectIdentifier = ObjectIdentifier::new_unwrap($value);)+
    };
}

oids! {
    /// OIDC issuer (v1, raw value)
    OIDC_ISSUER = "1.3.6.1.4.1.57264.1.1",
    /// GitHub workflow trigger (v1)
    GITHUB_WORKFLOW_TRIGGER = "1.3.6.1.4.1.57264.1.2",
    /// GitHub workflow SHA (v1)
    GITHUB_WORKFLOW_SHA = "1.3.6.1.4.1.57264.1.3",
    /// GitHub workflow name (v1)
    GITHUB_WORKFLOW_NAME = "1.3.6.1.4.1.57264.1.4",
    /// GitHub workflow repository (v1)
    GITHUB_WORKFLOW_REPOSITORY = "1.3.6.1.4.1.57264.1.5",
    /// GitHub workflow ref (v1)
    GITHUB_WORKFLOW_REF = "1.3.6.1.4.1.57264.1.6",
    /// OIDC issuer (v2, DER-encoded)
    ISSUER_V2 = "1.3.6.1.4.1.57264.1.8",
    /// Build signer URI
    BUILD_SIGNER_URI = "1.3.6.1.4.1.57264.1.9",
    /// Build signer digest
    BUILD_SIGNER_DIGEST = "1.3.6.1.4.1.57264.1.10",
    /// Runner environment
    RUNNER_ENVIRONMENT = "1.3.6.1.4.1.57264.1.11",
    /// Source repository URI
    SOURCE_REPOSITORY_URI = "1.3.6.1.4.1.57264.1.12",
    /// Source repository digest
    SOURCE_REPOSITORY_DIGEST = "1.3.6.1.4.1.57264.1.13",
    /// Source repository ref
    SOURCE_REPOSITORY_REF = "1.3.6.1.4.1.57264.1.14",
    /// Source repository identifier
    SOURCE_REPOSITORY_IDENTIFIER = "1.3.6.1.4.1.57264.1.15",
    /// Source repository owner URI
    SOURCE_REPOSITORY_OWNER_URI = "1.3.6.1.4.1.57264.1.16",
    /// Source repository owner identifier
    SOURCE_REPOSITORY_OWNER_IDENTIFIER = "1.3.6.1.4.1.57264.1.17",
    /// Build config URI
    BUILD_CONFIG_URI = "1.3.6.1.4.1.57264.1.18",
    /// Build config digest
    BUILD_CONFIG_DIGEST = "1.3.6.1.4.1.57264.1.19",
    /// Build trigger
    BUILD_TRIGGER = "1.3.6.1.4.1.57264.1.20",
    /// Run invocation URI
    RUN_INVOCATION_URI = "1.3.6.1.4.1.57264.1.21",
    /// Source repository visibility
    SOURCE_REPOSITORY_VISIBILITY = "1.3.6.1.4.1.57264.1.22",
}

/// A single extension requirement: the extension must be present with
/// exactly this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRequirement {
    pub oid: ObjectIdentifier,
    pub value: String,
}

/// The identity a signing certificate must present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateIdentity {
    /// Required subject alternative name, matched against the string form
    /// of every SAN in the certificate
    pub subject_alternative_name: String,
    /// Required extension values
    pub extensions: Vec<ExtensionRequirement>,
}

impl CertificateIdentity {
    /// Identity with no extension requirements
    pub fn new(san: impl Into<String>) -> Self {
        Self {
            subject_alternative_name: san.into(),
            extensions: Vec::new(),
        }
    }

    /// Require the OIDC issuer (v1) extension value
    pub fn with_issuer(self, issuer: impl Into<String>) -> Self {
        self.with_extension(OIDC_ISSUER, issuer)
    }

    /// Require an arbitrary extension value
    pub fn with_extension(mut self, oid: ObjectIdentifier, value: impl Into<String>) -> Self {
        self.extensions.push(ExtensionRequirement {
            oid,
            value: value.into(),
        });
        self
    }

    /// Check this identity against a parsed certificate.
    pub fn verify(&self, cert: &Certificate) -> Result<()> {
        let sans = extract_sans(cert).map_err(|e| VerifyError::Certificate(e.to_string()))?;
        self.check_sans(&sans)?;

        let observed: Vec<(ObjectIdentifier, String)> = cert
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|ext| {
                (
                    ext.extn_id,
                    decode_extension_string(ext.extn_value.as_bytes()),
                )
            })
            .collect();
        self.check_extensions(&observed)
    }

    fn check_sans(&self, sans: &[String]) -> Result<()> {
        if sans.iter().any(|san| san == &self.subject_alternative_name) {
            return Ok(());
        }
        Err(VerifyError::UntrustedSigner(format!(
            "no SAN matches {}; certificate carries: {}",
            self.subject_alternative_name,
            sans.join(", ")
        )))
    }

    fn check_extensions(&self, observed: &[(ObjectIdentifier, String)]) -> Result<()> {
        for required in &self.extensions {
            let found = observed.iter().find(|(oid, _)| oid == &required.oid);
            match found {
                Some((_, value)) if value == &required.value => {}
                Some((_, value)) => {
                    return Err(VerifyError::UntrustedSigner(format!(
                        "extension {} is {:?}, policy requires {:?}",
                        required.oid, value, required.value
                    )))
                }
                None => {
                    return Err(VerifyError::UntrustedSigner(format!(
                        "certificate is missing required extension {}",
                        required.oid
                    )))
                }
            }
        }
        Ok(())
    }
}
