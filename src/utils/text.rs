// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Whitespace handling for free-text form input.
//!
//! Documents are exchanged with web producers that trim with the ECMAScript
//! whitespace set. That set differs from `char::is_whitespace`: it excludes
//! U+0085 (NEXT LINE) and includes U+FEFF (BYTE ORDER MARK).

/// ECMAScript `WhiteSpace` or `LineTerminator`.
pub fn is_form_whitespace(c: char) -> bool {
    match c {
        '\u{0085}' => false,
        '\u{FEFF}' => true,
        other => other.is_whitespace(),
    }
}

/// Trim both ends with [`is_form_whitespace`].
pub fn trim_form_text(raw: &str) -> &str {
    raw.trim_matches(is_form_whitespace)
}
