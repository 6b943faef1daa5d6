// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by UI and business logic.

pub mod datetime;
pub mod hash;
pub mod text;

/// Compute the SHA-256 hash of a file.
pub use hash::hash_file;
