// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Field validation for pay documents.
//!
//! Each check looks at one raw value. [`validate_all`] runs all of them and
//! reports every failing field at once so the form can show all problems in
//! a single pass.

use time::OffsetDateTime;

use crate::models::document::{Amount, Asset, MAX_NOTE_CHARS, Network, Timestamp};
use crate::models::fields::{Field, FieldError, FieldErrors, NormalizedFields, RawFields};
use crate::utils::datetime::local_to_utc;

/// Accept `^[0-9]+(\.[0-9]+)?$` only.
pub fn validate_amount(raw: &str) -> Result<(), FieldError> {
    Amount::parse(raw).map(|_| ())
}

/// Accept `^[A-Z0-9]{2,10}$` only. Lowercase input is rejected, not folded.
pub fn validate_asset(raw: &str) -> Result<(), FieldError> {
    Asset::parse(raw).map(|_| ())
}

/// Accept `^[A-Za-z0-9-]{2,64}$` only.
pub fn validate_network(raw: &str) -> Result<(), FieldError> {
    Network::parse(raw).map(|_| ())
}

/// Limit the note to 2048 code points.
///
/// The limit applies to the raw value before trimming; surrounding
/// whitespace counts here even though it is not stored.
pub fn validate_note(raw: &str) -> Result<(), FieldError> {
    if raw.chars().count() > MAX_NOTE_CHARS {
        Err(FieldError::TooLong)
    } else {
        Ok(())
    }
}

/// Validate an optional local expiry against `now_utc`.
///
/// Empty input means "no expiry". Uses [`local_to_utc`] for the conversion.
pub fn validate_expiry(raw: &str, now_utc: OffsetDateTime) -> Result<Option<Timestamp>, FieldError> {
    validate_expiry_with(raw, now_utc, local_to_utc)
}

/// [`validate_expiry`] with an explicit local-to-UTC conversion.
///
/// The comparison runs at the stored millisecond precision, so an expiry that
/// would serialize equal to `now_utc` counts as not in the future.
pub fn validate_expiry_with<F>(
    raw: &str,
    now_utc: OffsetDateTime,
    convert: F,
) -> Result<Option<Timestamp>, FieldError>
where
    F: Fn(&str) -> Option<OffsetDateTime>,
{
    if raw.is_empty() {
        return Ok(None);
    }

    let converted = convert(raw).ok_or(FieldError::InvalidDate)?;
    let exp = Timestamp::from_datetime(converted)?;
    let now = Timestamp::from_datetime(now_utc).map_err(|_| FieldError::InvalidDate)?;

    if exp <= now {
        return Err(FieldError::NotInFuture);
    }
    Ok(Some(exp))
}

/// Run every field check and collect all failures.
pub fn validate_all(
    fields: &RawFields,
    now_utc: OffsetDateTime,
) -> Result<NormalizedFields, FieldErrors> {
    validate_all_with(fields, now_utc, local_to_utc)
}

/// [`validate_all`] with an explicit local-to-UTC conversion for the expiry.
pub fn validate_all_with<F>(
    fields: &RawFields,
    now_utc: OffsetDateTime,
    convert: F,
) -> Result<NormalizedFields, FieldErrors>
where
    F: Fn(&str) -> Option<OffsetDateTime>,
{
    let mut errors = FieldErrors::default();

    let amount = required(&fields.amount, Field::Amount, Amount::parse, &mut errors);
    let asset = required(&fields.asset, Field::Asset, Asset::parse, &mut errors);
    let network = required(&fields.network, Field::Network, Network::parse, &mut errors);

    let exp = match validate_expiry_with(&fields.expiry, now_utc, convert) {
        Ok(exp) => exp,
        Err(err) => {
            errors.insert(Field::Expiry, err);
            None
        }
    };

    if let Err(err) = validate_note(&fields.note) {
        errors.insert(Field::Note, err);
    }

    match (amount, asset, network) {
        (Some(amount), Some(asset), Some(network)) if errors.is_empty() => Ok(NormalizedFields {
            amount,
            asset,
            network,
            exp,
        }),
        _ => Err(errors),
    }
}

/// Empty input is its own rejection, independent of the pattern.
fn required<T>(
    raw: &str,
    field: Field,
    parse: fn(&str) -> Result<T, FieldError>,
    errors: &mut FieldErrors,
) -> Option<T> {
    if raw.is_empty() {
        errors.insert(field, FieldError::MissingRequired);
        return None;
    }
    match parse(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            errors.insert(field, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;
    use time::{Duration, PrimitiveDateTime};

    const NOW: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);

    /// Treat wall-clock input as UTC so expiry tests do not depend on the host zone.
    fn utc_wall_clock(raw: &str) -> Option<OffsetDateTime> {
        let fmt = time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        PrimitiveDateTime::parse(raw, fmt)
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    }

    fn raw(amount: &str, asset: &str, network: &str) -> RawFields {
        RawFields {
            amount: amount.into(),
            asset: asset.into(),
            network: network.into(),
            ..Default::default()
        }
    }

    #[test]
    fn amount_examples() {
        assert!(validate_amount("12.50").is_ok());
        assert!(validate_amount("0").is_ok());
        assert_eq!(validate_amount("12.50.1"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_amount("-5"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_amount("+5"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_amount(""), Err(FieldError::InvalidFormat));
        assert_eq!(validate_amount("1e5"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_amount("1,000"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_amount("12."), Err(FieldError::InvalidFormat));
        assert_eq!(validate_amount(".5"), Err(FieldError::InvalidFormat));
    }

    #[test]
    fn asset_examples() {
        assert!(validate_asset("USDC").is_ok());
        assert!(validate_asset("B2").is_ok());
        assert_eq!(validate_asset("usdc"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_asset("A"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_asset("ABCDEFGHIJK"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_asset("US-DC"), Err(FieldError::InvalidFormat));
    }

    #[test]
    fn network_examples() {
        assert!(validate_network("ETH-mainnet").is_ok());
        assert!(validate_network(&"a".repeat(64)).is_ok());
        assert_eq!(validate_network(&"a".repeat(65)), Err(FieldError::InvalidFormat));
        assert_eq!(validate_network("E"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_network("ETH mainnet"), Err(FieldError::InvalidFormat));
        assert_eq!(validate_network("ETH_mainnet"), Err(FieldError::InvalidFormat));
    }

    #[test]
    fn note_limit_is_checked_before_trimming() {
        assert!(validate_note(&"x".repeat(MAX_NOTE_CHARS)).is_ok());
        assert_eq!(
            validate_note(&"x".repeat(MAX_NOTE_CHARS + 1)),
            Err(FieldError::TooLong)
        );
        // Padding counts towards the limit even though it would be trimmed away.
        let padded = format!(" {} ", "x".repeat(MAX_NOTE_CHARS - 1));
        assert_eq!(validate_note(&padded), Err(FieldError::TooLong));
        // Whitespace-only input within the limit passes and is later dropped.
        assert!(validate_note("    ").is_ok());
    }

    #[test]
    fn expiry_empty_is_optional() {
        assert_eq!(validate_expiry_with("", NOW, utc_wall_clock), Ok(None));
        assert_eq!(validate_expiry("", NOW), Ok(None));
    }

    #[test]
    fn expiry_whitespace_only_is_invalid_date() {
        assert_eq!(
            validate_expiry_with("   ", NOW, utc_wall_clock),
            Err(FieldError::InvalidDate)
        );
        assert_eq!(validate_expiry(" ", NOW), Err(FieldError::InvalidDate));

        let mut fields = raw("12.50", "USDC", "ETH-mainnet");
        fields.expiry = " ".into();
        let errors = validate_all(&fields, NOW).unwrap_err();
        assert_eq!(errors.get(Field::Expiry), Some(FieldError::InvalidDate));
    }

    #[test]
    fn expiry_equal_or_past_is_not_in_future() {
        assert_eq!(
            validate_expiry_with("2025-06-01T12:00:00", NOW, utc_wall_clock),
            Err(FieldError::NotInFuture)
        );
        assert_eq!(
            validate_expiry_with("2025-06-01T11:59:59", NOW, utc_wall_clock),
            Err(FieldError::NotInFuture)
        );
    }

    #[test]
    fn expiry_one_second_later_is_accepted() {
        let exp = validate_expiry_with("2025-06-01T12:00:01", NOW, utc_wall_clock)
            .unwrap()
            .unwrap();
        assert_eq!(exp.as_datetime(), NOW + Duration::seconds(1));
    }

    #[test]
    fn expiry_within_same_millisecond_is_not_in_future() {
        let now = NOW + Duration::microseconds(10);
        let convert = |_: &str| Some(NOW + Duration::microseconds(500));
        assert_eq!(
            validate_expiry_with("x", now, convert),
            Err(FieldError::NotInFuture)
        );
    }

    #[test]
    fn expiry_unparseable_is_invalid_date() {
        assert_eq!(
            validate_expiry_with("next tuesday", NOW, utc_wall_clock),
            Err(FieldError::InvalidDate)
        );
        assert_eq!(
            validate_expiry_with("2025-13-01T00:00:00", NOW, utc_wall_clock),
            Err(FieldError::InvalidDate)
        );
    }

    #[test]
    fn expiry_uses_platform_conversion_by_default() {
        assert_eq!(
            validate_expiry("not a date", NOW),
            Err(FieldError::InvalidDate)
        );
        assert!(validate_expiry("2999-01-01T00:00", NOW).unwrap().is_some());
        assert_eq!(
            validate_expiry("2000-01-01T00:00", NOW),
            Err(FieldError::NotInFuture)
        );
    }

    #[test]
    fn validate_all_accepts_minimal_input() {
        let normalized = validate_all_with(&raw("12.50", "USDC", "ETH-mainnet"), NOW, utc_wall_clock)
            .unwrap();

        assert_eq!(normalized.amount.as_str(), "12.50");
        assert_eq!(normalized.asset.as_str(), "USDC");
        assert_eq!(normalized.network.as_str(), "ETH-mainnet");
        assert!(normalized.exp.is_none());
    }

    #[test]
    fn validate_all_reports_every_failing_field() {
        let fields = RawFields {
            amount: "12,50".into(),
            asset: "usdc".into(),
            network: "x".into(),
            expiry: "2020-01-01T00:00:00".into(),
            note: "n".repeat(MAX_NOTE_CHARS + 1),
        };

        let errors = validate_all_with(&fields, NOW, utc_wall_clock).unwrap_err();

        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get(Field::Amount), Some(FieldError::InvalidFormat));
        assert_eq!(errors.get(Field::Asset), Some(FieldError::InvalidFormat));
        assert_eq!(errors.get(Field::Network), Some(FieldError::InvalidFormat));
        assert_eq!(errors.get(Field::Expiry), Some(FieldError::NotInFuture));
        assert_eq!(errors.get(Field::Note), Some(FieldError::TooLong));
    }

    #[test]
    fn validate_all_reports_missing_required_fields() {
        let errors = validate_all_with(&RawFields::default(), NOW, utc_wall_clock).unwrap_err();

        assert_eq!(errors.len(), 3);
        for field in [Field::Amount, Field::Asset, Field::Network] {
            assert_eq!(errors.get(field), Some(FieldError::MissingRequired));
        }
    }

    #[test]
    fn validate_all_with_past_expiry_yields_expiry_key() {
        let mut fields = raw("12.50", "USDC", "ETH-mainnet");
        fields.expiry = "2025-05-31T12:00:00".into();

        let errors = validate_all_with(&fields, NOW, utc_wall_clock).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Field::Expiry));
    }

    #[test]
    fn validate_all_keeps_valid_expiry() {
        let mut fields = raw("1", "BTC", "BTC-mainnet");
        fields.expiry = "2025-06-02T12:00:00".into();

        let normalized = validate_all_with(&fields, NOW, utc_wall_clock).unwrap();

        assert_eq!(
            normalized.exp.map(|ts| ts.to_string()).as_deref(),
            Some("2025-06-02T12:00:00.000Z")
        );
    }

    proptest! {
        #[test]
        fn amount_pattern_strings_are_accepted(s in "[0-9]{1,12}(\\.[0-9]{1,8})?") {
            prop_assert!(validate_amount(&s).is_ok());
        }

        #[test]
        fn amounts_with_a_letter_are_rejected(
            head in "[0-9]{0,6}",
            letter in "[a-zA-Z]",
            tail in "[0-9]{0,6}",
        ) {
            let candidate = format!("{head}{letter}{tail}");
            prop_assert_eq!(validate_amount(&candidate), Err(FieldError::InvalidFormat));
        }

        #[test]
        fn signed_amounts_are_rejected(sign in "[+-]", digits in "[0-9]{1,8}") {
            let candidate = format!("{sign}{digits}");
            prop_assert_eq!(validate_amount(&candidate), Err(FieldError::InvalidFormat));
        }

        #[test]
        fn amounts_with_two_dots_are_rejected(a in "[0-9]{1,4}", b in "[0-9]{1,4}", c in "[0-9]{1,4}") {
            let candidate = format!("{a}.{b}.{c}");
            prop_assert_eq!(validate_amount(&candidate), Err(FieldError::InvalidFormat));
        }

        #[test]
        fn assets_of_valid_length_are_accepted(s in "[A-Z0-9]{2,10}") {
            prop_assert!(validate_asset(&s).is_ok());
        }

        #[test]
        fn assets_of_length_one_or_eleven_are_rejected(
            s in prop_oneof!["[A-Z0-9]{1}", "[A-Z0-9]{11}"],
        ) {
            prop_assert_eq!(validate_asset(&s), Err(FieldError::InvalidFormat));
        }

        #[test]
        fn assets_with_lowercase_are_rejected(head in "[A-Z0-9]{0,4}", lower in "[a-z]", tail in "[A-Z0-9]{1,4}") {
            let candidate = format!("{head}{lower}{tail}");
            prop_assert_eq!(validate_asset(&candidate), Err(FieldError::InvalidFormat));
        }

        #[test]
        fn expiry_is_accepted_exactly_when_later_than_now(offset_secs in -86_400i64..86_400i64) {
            let exp = NOW + Duration::seconds(offset_secs);
            let convert = move |_: &str| Some(exp);
            let result = validate_expiry_with("set", NOW, convert);

            if offset_secs > 0 {
                prop_assert!(matches!(result, Ok(Some(_))));
            } else {
                prop_assert_eq!(result, Err(FieldError::NotInFuture));
            }
        }
    }
}
