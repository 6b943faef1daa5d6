// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Capabilities the builder needs from the outside world: randomness, hashing
//! and the current time. Production implementations live here; tests swap in
//! deterministic ones.

use anyhow::{Context, Result};
use rand::RngCore;
use rand::rngs::OsRng;
use time::OffsetDateTime;

use crate::utils::hash;

/// Source of random bytes and SHA-256 digests.
pub trait CryptoProvider {
    /// `len` bytes from a cryptographically secure source.
    ///
    /// Must never be derived from a predictable seed.
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>>;

    /// SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> [u8; 32];
}

/// Operating-system randomness and the `sha2` digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCrypto;

impl CryptoProvider for SystemCrypto {
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut buf)
            .context("Secure random source unavailable")?;
        Ok(buf)
    }

    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        hash::sha256(data)
    }
}

/// Source of the current UTC time.
pub trait Clock {
    fn now_utc(&self) -> OffsetDateTime;
}

/// Wall clock of the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
