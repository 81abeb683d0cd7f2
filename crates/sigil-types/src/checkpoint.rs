//! Checkpoint (signed note) parsing
//!
//! A checkpoint is a signed commitment to the state of a transparency log,
//! carried in the note format from golang.org/x/mod/sumdb/note:
//!
//! ```text
//! <origin>
//! <tree_size>
//! <root_hash_base64>
//! <optional extension lines>
//!
//! — <signer_name> <base64(key_hint || signature)>
//! ```
//!
//! The note body and the signature lines are separated by a single blank
//! line (the literal bytes `\n\n`). Signature lines begin with the Unicode
//! em dash (U+2014), not an ASCII hyphen, and each decoded signature is a
//! 4-byte key hint followed by the signature bytes.

use crate::encoding::KeyHint;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// The log state committed to by a checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Origin string identifying the log
    pub origin: String,
    /// Number of leaves in the tree
    pub tree_size: u64,
    /// Root hash of the Merkle tree
    pub root_hash: Vec<u8>,
    /// Extension lines after the root hash
    pub other_content: Vec<String>,
}

/// A single signature line from a signed note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSignature {
    /// Signer name following the em dash
    pub name: String,
    /// First 4 bytes of the decoded signature blob
    pub key_hint: KeyHint,
    /// Signature bytes after the key hint
    pub signature: Vec<u8>,
}

/// A parsed signed note: checkpoint body plus its signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedNote {
    /// The parsed checkpoint
    pub checkpoint: Checkpoint,
    /// The exact body text the signatures cover, including the trailing
    /// newline before the separator
    pub note_body: String,
    /// Signatures from the section after the separator
    pub signatures: Vec<NoteSignature>,
}

impl Checkpoint {
    /// Parse the checkpoint body lines: origin, tree size, root hash, then
    /// any extension lines. At least the first three must be present.
    pub fn from_text(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < 3 {
            return Err(Error::InvalidCheckpoint(format!(
                "checkpoint body needs at least 3 lines, got {}",
                lines.len()
            )));
        }

        let origin = lines[0].to_string();
        if origin.is_empty() {
            return Err(Error::InvalidCheckpoint("empty origin".to_string()));
        }

        let tree_size = lines[1]
            .parse::<u64>()
            .map_err(|_| Error::InvalidCheckpoint(format!("invalid tree size: {}", lines[1])))?;

        let root_hash = STANDARD
            .decode(lines[2])
            .map_err(|_| Error::InvalidCheckpoint("invalid root hash base64".to_string()))?;

        let other_content = lines[3..].iter().map(|l| l.to_string()).collect();

        Ok(Checkpoint {
            origin,
            tree_size,
            root_hash,
            other_content,
        })
    }

    /// Serialize back to the note body text (no signatures).
    pub fn to_signed_note_body(&self) -> String {
        let mut body = format!(
            "{}\n{}\n{}\n",
            self.origin,
            self.tree_size,
            STANDARD.encode(&self.root_hash)
        );
        for line in &self.other_content {
            body.push_str(line);
            body.push('\n');
        }
        body
    }
}

impl NoteSignature {
    /// Parse a signature line of the form `— <name> <base64>`.
    pub fn from_line(line: &str) -> Result<Self> {
        let rest = line.strip_prefix('\u{2014}').ok_or_else(|| {
            Error::InvalidCheckpoint("signature line must start with em dash (U+2014)".to_string())
        })?;

        let mut parts = rest.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| Error::InvalidCheckpoint("signature line missing name".to_string()))?
            .to_string();
        let sig_b64 = parts.next().ok_or_else(|| {
            Error::InvalidCheckpoint("signature line missing base64 blob".to_string())
        })?;
        if parts.next().is_some() {
            return Err(Error::InvalidCheckpoint(
                "trailing content on signature line".to_string(),
            ));
        }

        let decoded = STANDARD
            .decode(sig_b64)
            .map_err(|_| Error::InvalidCheckpoint("invalid signature base64".to_string()))?;

        // 4-byte key hint plus at least one signature byte.
        if decoded.len() < 5 {
            return Err(Error::InvalidCheckpoint(format!(
                "decoded signature too short: {} bytes",
                decoded.len()
            )));
        }

        Ok(NoteSignature {
            name,
            key_hint: KeyHint::from_prefix(&decoded[..4])?,
            signature: decoded[4..].to_vec(),
        })
    }
}

impl SignedNote {
    /// Parse a signed note from its text envelope.
    pub fn from_text(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split("\n\n").collect();
        if parts.len() < 2 {
            return Err(Error::InvalidCheckpoint(
                "missing blank line separator".to_string(),
            ));
        }
        if parts.len() > 2 {
            return Err(Error::InvalidCheckpoint(
                "multiple blank line separators".to_string(),
            ));
        }

        let checkpoint = Checkpoint::from_text(parts[0])?;

        let mut signatures = Vec::new();
        for line in parts[1].lines() {
            if line.is_empty() {
                continue;
            }
            signatures.push(NoteSignature::from_line(line)?);
        }
        if signatures.is_empty() {
            return Err(Error::InvalidCheckpoint("no signatures found".to_string()));
        }

        // The signed bytes include the newline before the separator.
        let note_body = format!("{}\n", parts[0]);

        Ok(SignedNote {
            checkpoint,
            note_body,
            signatures,
        })
    }

    /// Find a signature whose key hint matches.
    pub fn signature_for_hint(&self, hint: &KeyHint) -> Option<&NoteSignature> {
        self.signatures.iter().find(|sig| &sig.key_hint == hint)
    }
}
