// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Business logic for assembling, encoding and storing pay documents.
//!
//! Responsibilities:
//! - Generate the document identifier and capture the creation time once per build.
//! - Replace the optional PIN by its SHA-256 digest.
//! - Encode/decode the canonical JSON form and suggest a filename.
//! - Write the encoded bytes to the path picked by the user.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::logic::crypto::{Clock, CryptoProvider, SystemClock, SystemCrypto};
use crate::models::document::{
    ALG_NONE, FILE_EXTENSION, FORMAT_VERSION, Jti, Note, PayDocument, Payload, PinHash, TYPE_TAG,
    Timestamp,
};
use crate::models::fields::NormalizedFields;
use crate::utils::text::trim_form_text;

/// Number of random bytes behind a `jti`.
const JTI_BYTES: usize = 16;

/// Why bytes could not be read back as a pay document.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported pay document version {0}")]
    UnsupportedVersion(String),
    #[error("unsupported pay document type {0}")]
    UnsupportedType(String),
    #[error("unsupported signature algorithm {0}; only unsigned documents are understood")]
    UnsupportedAlgorithm(String),
    #[error("malformed pay document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Assembles pay documents from validated fields.
#[derive(Clone, Debug, Default)]
pub struct DocumentBuilder<C = SystemCrypto, K = SystemClock> {
    crypto: C,
    clock: K,
}

impl DocumentBuilder {
    /// Builder backed by OS randomness, `sha2` and the host clock.
    pub fn system() -> Self {
        Self::default()
    }
}

impl<C: CryptoProvider, K: Clock> DocumentBuilder<C, K> {
    pub fn new(crypto: C, clock: K) -> Self {
        Self { crypto, clock }
    }

    /// Fresh 128-bit identifier as 32 lowercase hex characters.
    pub fn new_identifier(&self) -> Result<Jti> {
        let bytes: [u8; JTI_BYTES] = self
            .crypto
            .random_bytes(JTI_BYTES)?
            .try_into()
            .map_err(|bytes: Vec<u8>| {
                anyhow::anyhow!(
                    "Random source returned {} bytes, expected {}",
                    bytes.len(),
                    JTI_BYTES
                )
            })?;
        Ok(Jti::from_bytes(&bytes))
    }

    /// Read the clock once and keep millisecond precision.
    pub fn capture_creation_time(&self) -> Result<Timestamp> {
        Timestamp::from_datetime(self.clock.now_utc()).context("Clock returned an unusable time")
    }

    /// SHA-256 of the trimmed secret.
    pub fn hash_secret(&self, secret: &str) -> PinHash {
        let digest = Zeroizing::new(self.crypto.sha256(trim_form_text(secret).as_bytes()));
        PinHash::from_digest(&digest)
    }

    /// Assemble a complete document from validated fields.
    ///
    /// The note is stored trimmed and only when non-blank. The secret is
    /// consumed and wiped once hashed; only its digest reaches the document.
    pub fn build(
        &self,
        fields: &NormalizedFields,
        raw_note: &str,
        raw_secret: Zeroizing<String>,
    ) -> Result<PayDocument> {
        let jti = self.new_identifier()?;
        let created_at = self.capture_creation_time()?;

        let note = Note::from_input(raw_note).context("Note cannot be stored")?;
        let pin_hash = if trim_form_text(&raw_secret).is_empty() {
            None
        } else {
            Some(self.hash_secret(&raw_secret))
        };
        drop(raw_secret);

        let payload = Payload::new(
            jti,
            fields.amount.clone(),
            fields.asset.clone(),
            fields.network.clone(),
            created_at,
        )
        .with_expiry(fields.exp)
        .with_note(note)
        .with_pin_hash(pin_hash);

        Ok(PayDocument::new(payload))
    }
}

/// Canonical compact JSON encoding.
///
/// Keys appear in declaration order and absent optional fields are omitted,
/// so decoding and re-encoding reproduces the same bytes.
pub fn encode(doc: &PayDocument) -> Result<Vec<u8>> {
    serde_json::to_vec(doc).context("Failed to encode pay document")
}

/// Parse and fully re-validate an encoded document.
pub fn decode(bytes: &[u8]) -> Result<PayDocument, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    check_header(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// Report unknown header values before payload errors.
///
/// Missing or mistyped header members fall through to the schema check.
fn check_header(value: &Value) -> Result<(), DecodeError> {
    let Some(header) = value.get("header") else {
        return Ok(());
    };

    if let Some(v) = header.get("v")
        && v.as_u64() != Some(u64::from(FORMAT_VERSION))
    {
        return Err(DecodeError::UnsupportedVersion(v.to_string()));
    }
    if let Some(typ) = header.get("typ").and_then(Value::as_str)
        && typ != TYPE_TAG
    {
        return Err(DecodeError::UnsupportedType(typ.to_string()));
    }
    if let Some(alg) = header.get("alg").and_then(Value::as_str)
        && alg != ALG_NONE
    {
        return Err(DecodeError::UnsupportedAlgorithm(alg.to_string()));
    }
    Ok(())
}

/// Advisory filename `{asset}-{amount}-{jti prefix}.pay`.
pub fn suggested_filename(doc: &PayDocument) -> String {
    let payload = doc.payload();
    format!(
        "{}-{}-{}.{}",
        payload.asset(),
        payload.amount(),
        payload.jti().prefix(),
        FILE_EXTENSION
    )
}

/// Force a specific extension onto a path when it is missing or different.
///
/// Keeps an existing matching extension (case-insensitive). A dotted amount
/// such as `12.50` in the stem is treated as an extension by `Path`, so the
/// target extension is appended instead of replacing it.
pub fn ensure_extension(path: PathBuf, extension: &str) -> PathBuf {
    let matches = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case(extension)
    );
    if matches {
        return path;
    }

    let mut raw = path.into_os_string();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

/// Write encoded document bytes to `output`.
///
/// Parent directories for `output` are created if missing.
pub fn write_document(output: &Path, bytes: &[u8]) -> Result<()> {
    // Ensure parent exists so the file can be written without IO errors.
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    fs::write(output, bytes)
        .with_context(|| format!("Failed to write pay document {:?}", output))?;
    Ok(())
}

/// Read and decode a pay document from disk.
pub fn read_document(path: &Path) -> Result<PayDocument> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read pay document {:?}", path))?;
    decode(&bytes).with_context(|| format!("Failed to open {:?}", path))
}
