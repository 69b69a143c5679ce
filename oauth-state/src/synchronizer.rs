//! Single-use random values linking the OAuth `state` parameter to a device.

use std::fmt;

use rand::RngCore;
use subtle::ConstantTimeEq;

/// Number of random bytes in a synchronizer (128 bits).
pub const SYNCHRONIZER_BYTES: usize = 16;

/// A fresh, unguessable nonce. Sent cleartext as the OAuth `state` value and
/// embedded in the signed session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Synchronizer(String);

impl Synchronizer {
    /// Generate a new synchronizer from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut random_bytes = [0u8; SYNCHRONIZER_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);
        Self(hex::encode(random_bytes))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// Kept out of logs by default; the value is a bearer secret until consumed.
impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Synchronizer(..)")
    }
}

/// Compare two values without leaking where, or whether, they differ.
///
/// A length mismatch returns early; only the length is observable, never
/// the position of the first differing byte.
pub fn timing_safe_eq(expected: &[u8], actual: &[u8]) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    expected.ct_eq(actual).into()
}
