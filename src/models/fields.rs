// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Field keys, the validation error taxonomy, and raw/normalized field sets.

use std::collections::BTreeMap;
use std::fmt;

use super::document::{Amount, Asset, Network, Timestamp};

/// Payload keys of a pay document, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Jti,
    Amount,
    Asset,
    Network,
    CreatedAt,
    Expiry,
    Note,
    PinHash,
}

impl Field {
    /// Key used for this field in the JSON payload.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Jti => "jti",
            Field::Amount => "amount",
            Field::Asset => "asset",
            Field::Network => "network",
            Field::CreatedAt => "createdAt",
            Field::Expiry => "exp",
            Field::Note => "note",
            Field::PinHash => "pinHash",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a single field was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("invalid format")]
    InvalidFormat,
    #[error("too long")]
    TooLong,
    #[error("invalid date")]
    InvalidDate,
    #[error("not in the future")]
    NotInFuture,
    #[error("required")]
    MissingRequired,
}

/// User-facing guidance for a rejected form field.
///
/// The texts describe what the field accepts rather than what went wrong, so
/// they can sit directly under the input.
pub fn hint_for(field: Field, error: FieldError) -> &'static str {
    match (field, error) {
        (Field::Amount, FieldError::MissingRequired) => "Please enter an amount.",
        (Field::Amount, _) => "Digits and a single dot only, e.g. 12.50.",
        (Field::Asset, FieldError::MissingRequired) => "Please choose an asset.",
        (Field::Asset, _) => "2-10 uppercase letters or digits.",
        (Field::Network, FieldError::MissingRequired) => "Please choose a network.",
        (Field::Network, _) => "2-64 characters (A-Z, a-z, 0-9, -).",
        (Field::Note, _) => "At most 2048 characters.",
        (Field::Expiry, FieldError::NotInFuture) => "Expiry must lie in the future.",
        (Field::Expiry, _) => "Invalid date.",
        (_, FieldError::MissingRequired) => "Required.",
        _ => "Invalid value.",
    }
}

/// Error raised when a value cannot become part of a document.
///
/// Carries the payload field so decode failures name the offending key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {error}")]
pub struct SchemaError {
    pub field: Field,
    pub error: FieldError,
}

impl SchemaError {
    pub fn new(field: Field, error: FieldError) -> Self {
        Self { field, error }
    }
}

/// Every failing form field with its reason.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, FieldError>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: Field, error: FieldError) {
        self.errors.insert(field, error);
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.errors.iter().map(|(field, error)| (*field, *error))
    }

    /// One line per field, suitable for an error dialog.
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(field, error)| format!("{field}: {}", hint_for(field, error)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, error)| format!("{field}: {error}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

/// Candidate values exactly as typed or selected by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawFields {
    pub amount: String,
    pub asset: String,
    pub network: String,
    /// Local wall-clock expiry (`YYYY-MM-DDTHH:MM`), empty when unset.
    pub expiry: String,
    pub note: String,
}

/// Fields that passed validation and are ready for the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedFields {
    pub amount: Amount,
    pub asset: Asset,
    pub network: Network,
    pub exp: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_match_wire_names() {
        assert_eq!(Field::CreatedAt.key(), "createdAt");
        assert_eq!(Field::Expiry.key(), "exp");
        assert_eq!(Field::PinHash.key(), "pinHash");
    }

    #[test]
    fn field_errors_collect_in_wire_order() {
        let mut errors = FieldErrors::default();
        errors.insert(Field::Note, FieldError::TooLong);
        errors.insert(Field::Amount, FieldError::InvalidFormat);

        let order: Vec<Field> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(order, vec![Field::Amount, Field::Note]);
        assert_eq!(errors.to_string(), "amount: invalid format, note: too long");
    }

    #[test]
    fn summary_uses_field_hints() {
        let mut errors = FieldErrors::default();
        errors.insert(Field::Expiry, FieldError::NotInFuture);

        assert_eq!(errors.summary(), "exp: Expiry must lie in the future.");
    }

    #[test]
    fn missing_required_has_dedicated_hint() {
        assert_eq!(
            hint_for(Field::Amount, FieldError::MissingRequired),
            "Please enter an amount."
        );
        assert_ne!(
            hint_for(Field::Amount, FieldError::MissingRequired),
            hint_for(Field::Amount, FieldError::InvalidFormat)
        );
    }
}
