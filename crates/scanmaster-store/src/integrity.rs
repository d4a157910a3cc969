// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stored-value integrity — SHA-256 checksums for corruption detection.

use scanmaster_core::error::{Result, ScanmasterError};
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Written alongside every blob so that a damaged or hand-edited value is
/// caught on read instead of being parsed.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Verify that `data` matches the expected SHA-256 hex digest.
///
/// Returns `Err(ScanmasterError::IntegrityMismatch)` with the expected and
/// actual values when it does not. Hex case is ignored.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<()> {
    let actual = hash_bytes(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(ScanmasterError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
