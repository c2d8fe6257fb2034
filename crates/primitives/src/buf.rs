use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 32-byte buf, useful for block hashes and state roots.  Rendered as 64
/// lowercase hex chars everywhere it crosses a boundary (wire, database,
/// logs).
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Hash256(#[serde(with = "hex::serde")] pub [u8; 32]);

impl Hash256 {
    /// The all-zeroes hash, denoting "no block" or "no parent".
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form, which is also the stored database form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(value: [u8; 32]) -> Self {
        Self(value)
    }
}

#[derive(Debug, Error)]
pub enum ParseBufError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("expected {0} bytes, got {1}")]
    WrongLength(usize, usize),
}

impl FromStr for Hash256 {
    type Err = ParseBufError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParseBufError::WrongLength(32, bytes.len()))?;
        Ok(Self(arr))
    }
}

/// Checks that a string is the hex form of a public key of the expected
/// byte length.  The gateway validates account queries with this before
/// issuing the request.
pub fn is_valid_pubkey_hex(s: &str, expected_len: usize) -> bool {
    match hex::decode(s) {
        Ok(bytes) => bytes.len() == expected_len,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BLS_PUBKEY_BYTES;

    #[test]
    fn test_zero_hash_roundtrip() {
        let z = Hash256::zero();
        assert!(z.is_zero());
        assert_eq!(z.to_hex(), "0".repeat(64));
        assert_eq!(z.to_hex().parse::<Hash256>().unwrap(), z);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("zz".repeat(32).parse::<Hash256>().is_err());
        assert!("ab".repeat(31).parse::<Hash256>().is_err());
        assert!("ab".repeat(32).parse::<Hash256>().is_ok());
    }

    #[test]
    fn test_serde_hex_form() {
        let h: Hash256 = serde_json::from_str(&format!("\"{}\"", "ab".repeat(32))).unwrap();
        assert_eq!(h.0[0], 0xab);
        assert_eq!(serde_json::to_string(&h).unwrap(), format!("\"{}\"", "ab".repeat(32)));
    }

    #[test]
    fn test_pubkey_validation() {
        let good = "b0".repeat(BLS_PUBKEY_BYTES);
        assert!(is_valid_pubkey_hex(&good, BLS_PUBKEY_BYTES));
        assert!(!is_valid_pubkey_hex(&good[2..], BLS_PUBKEY_BYTES));
        assert!(!is_valid_pubkey_hex("not hex", BLS_PUBKEY_BYTES));
    }
}
