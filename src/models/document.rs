// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! The pay document: fixed header plus a payload of validated field values.
//!
//! Every payload value is a newtype whose only constructors run the field
//! checks, and deserialization goes through the same constructors. A decoded
//! document is therefore exactly as valid as a freshly built one.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::fields::{Field, FieldError, SchemaError};
use crate::utils::datetime::{ISO_MILLIS, parse_iso_millis, truncate_to_millis};
use crate::utils::text::trim_form_text;

/// Current `header.v`. Bump on any breaking change to payload semantics.
pub const FORMAT_VERSION: u32 = 1;
/// Value of `header.typ`.
pub const TYPE_TAG: &str = "pay+json";
/// Value of `header.alg` for unsigned documents.
pub const ALG_NONE: &str = "none";
/// MIME type for encoded documents.
pub const MIME_TYPE: &str = "application/pay+json";
/// File extension for encoded documents (without dot).
pub const FILE_EXTENSION: &str = "pay";
/// Maximum note length in Unicode code points.
pub const MAX_NOTE_CHARS: usize = 2048;

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("amount pattern compiles"));
static ASSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2,10}$").expect("asset pattern compiles"));
static NETWORK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{2,64}$").expect("network pattern compiles"));

fn is_lower_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Declares a string newtype that serializes as a plain JSON string and is
/// checked by `$check` on every construction path.
macro_rules! checked_string {
    ($(#[$meta:meta])* $name:ident, $field:expr, $check:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate `raw` and wrap it.
            pub fn parse(raw: &str) -> Result<Self, FieldError> {
                let check: fn(&str) -> Result<(), FieldError> = $check;
                check(raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = SchemaError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                let check: fn(&str) -> Result<(), FieldError> = $check;
                check(&value).map_err(|error| SchemaError::new($field, error))?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

checked_string!(
    /// 128-bit random document identifier, 32 lowercase hex characters.
    Jti,
    Field::Jti,
    |raw| {
        if is_lower_hex(raw, 32) {
            Ok(())
        } else {
            Err(FieldError::InvalidFormat)
        }
    }
);

impl Jti {
    /// Hex-encode 16 random bytes.
    pub fn from_bytes(bytes: &[u8; 16]) -> Self {
        Self(hex::encode(bytes))
    }

    /// First eight hex characters, used in the suggested filename.
    pub fn prefix(&self) -> &str {
        // Construction guarantees 32 ASCII characters.
        &self.0[..8]
    }
}

checked_string!(
    /// Unsigned decimal quantity such as `12.50`.
    Amount,
    Field::Amount,
    |raw| {
        if AMOUNT_RE.is_match(raw) {
            Ok(())
        } else {
            Err(FieldError::InvalidFormat)
        }
    }
);

checked_string!(
    /// Uppercase alphanumeric ticker, 2-10 characters.
    Asset,
    Field::Asset,
    |raw| {
        if ASSET_RE.is_match(raw) {
            Ok(())
        } else {
            Err(FieldError::InvalidFormat)
        }
    }
);

checked_string!(
    /// Settlement network name, 2-64 characters of `[A-Za-z0-9-]`.
    Network,
    Field::Network,
    |raw| {
        if NETWORK_RE.is_match(raw) {
            Ok(())
        } else {
            Err(FieldError::InvalidFormat)
        }
    }
);

checked_string!(
    /// Trimmed, non-empty free text of at most 2048 code points.
    Note,
    Field::Note,
    |raw| {
        if raw.chars().count() > MAX_NOTE_CHARS {
            Err(FieldError::TooLong)
        } else if raw.is_empty() || trim_form_text(raw) != raw {
            Err(FieldError::InvalidFormat)
        } else {
            Ok(())
        }
    }
);

impl Note {
    /// Trim user input; blank input means "no note".
    pub fn from_input(raw: &str) -> Result<Option<Self>, FieldError> {
        let trimmed = trim_form_text(raw);
        if trimmed.is_empty() {
            return Ok(None);
        }
        Self::parse(trimmed).map(Some)
    }
}

checked_string!(
    /// SHA-256 digest of the PIN, 64 lowercase hex characters.
    PinHash,
    Field::PinHash,
    |raw| {
        if is_lower_hex(raw, 64) {
            Ok(())
        } else {
            Err(FieldError::InvalidFormat)
        }
    }
);

impl PinHash {
    /// Hex-encode a raw SHA-256 digest.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(hex::encode(digest))
    }
}

/// UTC instant stored with millisecond precision as `YYYY-MM-DDTHH:MM:SS.sssZ`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Truncate to milliseconds and convert to UTC.
    ///
    /// Years outside 0..=9999 have no four-digit representation and are
    /// rejected.
    pub fn from_datetime(value: OffsetDateTime) -> Result<Self, FieldError> {
        let utc = truncate_to_millis(value.to_offset(time::UtcOffset::UTC));
        if !(0..=9999).contains(&utc.year()) {
            return Err(FieldError::InvalidDate);
        }
        Ok(Self(utc))
    }

    pub fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }
}

impl TryFrom<String> for Timestamp {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parsed = parse_iso_millis(&value)
            .ok_or_else(|| format!("timestamp `{value}` is not YYYY-MM-DDTHH:MM:SS.sssZ"))?;
        Self::from_datetime(parsed).map_err(|err| format!("timestamp `{value}`: {err}"))
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.0.format(ISO_MILLIS).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// `header.typ`; only one tag exists in this revision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    #[default]
    #[serde(rename = "pay+json")]
    PayJson,
}

/// `header.alg`; signed variants may be added in later revisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "none")]
    None,
}

/// Fixed document header `{ v: 1, typ: "pay+json", alg: "none" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    #[serde(deserialize_with = "current_version")]
    v: u32,
    typ: TypeTag,
    alg: Algorithm,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            v: FORMAT_VERSION,
            typ: TypeTag::PayJson,
            alg: Algorithm::None,
        }
    }
}

impl Header {
    pub fn version(&self) -> u32 {
        self.v
    }

    pub fn typ(&self) -> TypeTag {
        self.typ
    }

    pub fn alg(&self) -> Algorithm {
        self.alg
    }
}

fn current_version<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = u32::deserialize(deserializer)?;
    if v != FORMAT_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported format version {v}, expected {FORMAT_VERSION}"
        )));
    }
    Ok(v)
}

/// Deserialize a present optional field; an explicit `null` is an error.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Transactional content of a pay document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Payload {
    jti: Jti,
    amount: Amount,
    asset: Asset,
    network: Network,
    created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    exp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    note: Option<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pin_hash: Option<PinHash>,
}

impl Payload {
    /// Payload with the required fields only.
    pub fn new(
        jti: Jti,
        amount: Amount,
        asset: Asset,
        network: Network,
        created_at: Timestamp,
    ) -> Self {
        Self {
            jti,
            amount,
            asset,
            network,
            created_at,
            exp: None,
            note: None,
            pin_hash: None,
        }
    }

    pub fn with_expiry(mut self, exp: Option<Timestamp>) -> Self {
        self.exp = exp;
        self
    }

    pub fn with_note(mut self, note: Option<Note>) -> Self {
        self.note = note;
        self
    }

    pub fn with_pin_hash(mut self, pin_hash: Option<PinHash>) -> Self {
        self.pin_hash = pin_hash;
        self
    }

    pub fn jti(&self) -> &Jti {
        &self.jti
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn exp(&self) -> Option<Timestamp> {
        self.exp
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    pub fn pin_hash(&self) -> Option<&PinHash> {
        self.pin_hash.as_ref()
    }

    /// Whether the document has an expiry at or before `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.exp.is_some_and(|exp| exp.as_datetime() <= now)
    }
}

/// Immutable pay document. Any change requires building a new one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayDocument {
    header: Header,
    payload: Payload,
}

impl PayDocument {
    pub fn new(payload: Payload) -> Self {
        Self {
            header: Header::default(),
            payload,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_payload() -> Payload {
        Payload::new(
            Jti::parse("00112233445566778899aabbccddeeff").unwrap(),
            Amount::parse("12.50").unwrap(),
            Asset::parse("USDC").unwrap(),
            Network::parse("ETH-mainnet").unwrap(),
            Timestamp::from_datetime(datetime!(2025-05-01 08:00:00.250 UTC)).unwrap(),
        )
    }

    #[test]
    fn jti_requires_32_lowercase_hex() {
        assert!(Jti::parse("00112233445566778899aabbccddeeff").is_ok());
        assert!(Jti::parse("00112233445566778899AABBCCDDEEFF").is_err());
        assert!(Jti::parse("0011").is_err());
        assert!(Jti::parse("00112233445566778899aabbccddeefg").is_err());
    }

    #[test]
    fn jti_prefix_is_first_eight_chars() {
        let jti = Jti::parse("deadbeef5566778899aabbccddeeff00").unwrap();
        assert_eq!(jti.prefix(), "deadbeef");
    }

    #[test]
    fn note_from_input_trims_and_drops_blank() {
        assert_eq!(Note::from_input("   \n\t"), Ok(None));
        let note = Note::from_input("  Samsung Monitor  ").unwrap().unwrap();
        assert_eq!(note.as_str(), "Samsung Monitor");
    }

    #[test]
    fn note_rejects_untrimmed_values_on_decode() {
        assert!(Note::try_from(" padded".to_string()).is_err());
        assert!(Note::try_from(String::new()).is_err());
    }

    #[test]
    fn note_keeps_next_line_character() {
        let note = Note::try_from("hi\u{0085}".to_string()).unwrap();
        assert_eq!(note.as_str(), "hi\u{0085}");
        assert_eq!(
            Note::from_input(" hi\u{0085} ").unwrap().map(|n| n.as_str().to_string()),
            Some("hi\u{0085}".to_string())
        );
        assert!(Note::try_from("\u{FEFF}hi".to_string()).is_err());
    }

    #[test]
    fn note_counts_code_points_not_bytes() {
        let note = "ü".repeat(MAX_NOTE_CHARS);
        assert!(Note::parse(&note).is_ok());
        let too_long = "ü".repeat(MAX_NOTE_CHARS + 1);
        assert_eq!(Note::parse(&too_long), Err(FieldError::TooLong));
    }

    #[test]
    fn pin_hash_from_digest_hex_encodes() {
        let hash = PinHash::from_digest(&[0xab; 32]);
        assert_eq!(hash.as_str(), "ab".repeat(32));
        assert!(PinHash::parse(&"ab".repeat(16)).is_err());
    }

    #[test]
    fn jti_from_bytes_is_valid() {
        let jti = Jti::from_bytes(&[0xff; 16]);
        assert_eq!(Jti::parse(jti.as_str()), Ok(jti));
    }

    #[test]
    fn timestamp_truncates_and_formats_with_millis() {
        let ts = Timestamp::from_datetime(datetime!(2025-05-01 10:00:00.250999 +02:00)).unwrap();
        assert_eq!(ts.to_string(), "2025-05-01T08:00:00.250Z");
    }

    #[test]
    fn schema_error_names_the_field() {
        let err = Asset::try_from("usdc".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "asset: invalid format");
    }

    #[test]
    fn payload_serializes_required_fields_only_when_optionals_absent() {
        let json = serde_json::to_value(sample_payload()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

        let mut expected = vec!["amount", "asset", "createdAt", "jti", "network"];
        expected.sort_unstable();
        let mut keys = keys;
        keys.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn payload_rejects_null_optional_fields() {
        let mut json = serde_json::to_value(sample_payload()).unwrap();
        json["note"] = serde_json::Value::Null;

        assert!(serde_json::from_value::<Payload>(json).is_err());
    }

    #[test]
    fn header_defaults_to_current_revision() {
        let json = serde_json::to_string(&Header::default()).unwrap();
        assert_eq!(json, r#"{"v":1,"typ":"pay+json","alg":"none"}"#);
    }

    #[test]
    fn header_rejects_other_versions_and_algorithms() {
        assert!(serde_json::from_str::<Header>(r#"{"v":2,"typ":"pay+json","alg":"none"}"#).is_err());
        assert!(serde_json::from_str::<Header>(r#"{"v":1,"typ":"pay+json","alg":"ES256"}"#).is_err());
        assert!(serde_json::from_str::<Header>(r#"{"v":1,"typ":"jwt","alg":"none"}"#).is_err());
    }

    #[test]
    fn expiry_check_is_inclusive_of_now() {
        let exp = Timestamp::from_datetime(datetime!(2025-05-02 00:00:00 UTC)).unwrap();
        let payload = sample_payload().with_expiry(Some(exp));

        assert!(!payload.is_expired_at(datetime!(2025-05-01 23:59:59 UTC)));
        assert!(payload.is_expired_at(datetime!(2025-05-02 00:00:00 UTC)));
        assert!(!sample_payload().is_expired_at(datetime!(2999-01-01 00:00:00 UTC)));
    }
}
