use std::{fmt, str::FromStr};

use bounties_merkle_verify::hash;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must be 20 bytes of hex: {0}")]
    InvalidLength(String),
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

/// 20-byte EVM address. Displays as lowercase 0x-hex, which is the canonical
/// map-key form across the pipeline; `checksum()` produces the EIP-55
/// mixed-case form used in the multi-token claim files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 checksum encoding: a hex character is uppercased when the
    /// corresponding nibble of keccak256(lowercase_hex_ascii) is >= 8.
    pub fn checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = hash(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                digest[i / 2] >> 4
            } else {
                digest[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if stripped.len() != 40 {
            return Err(AddressParseError::InvalidLength(s.to_string()));
        }
        let bytes =
            hex::decode(stripped).map_err(|_| AddressParseError::InvalidHex(s.to_string()))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let addr: Address = "0xD533a949740bb3306d119CC777fa900bA034cd52"
            .parse()
            .unwrap();
        assert_eq!(
            addr.to_string(),
            "0xd533a949740bb3306d119cc777fa900ba034cd52"
        );
    }

    #[test]
    fn test_checksum_known_vectors() {
        // Test vectors from EIP-55
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let addr: Address = expected.parse().unwrap();
            assert_eq!(addr.checksum(), *expected);
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz33a949740bb3306d119cc777fa900ba034cd52"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let addr: Address = "0xd533a949740bb3306d119cc777fa900ba034cd52"
            .parse()
            .unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xd533a949740bb3306d119cc777fa900ba034cd52\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
