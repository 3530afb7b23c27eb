use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub const TOKEN_DECIMALS: u32 = 18;

/// Human-unit amounts below this are floating-point noise from the
/// allocation phase, not claims, and are floored to zero.
pub const DUST_THRESHOLD: f64 = 1e-8;

const WEI_PER_TOKEN: f64 = 1e18;

/// A fixed-point (18-decimal) token amount, the integer form that ends up in
/// Merkle leaves and on-chain. Allocation math runs on doubles; quantization
/// to `Amount` happens exactly once, at the leaf boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Quantize a human-unit amount. Applies the dust floor: anything below
    /// `DUST_THRESHOLD` becomes exactly zero so no dust leaves are emitted.
    pub fn from_tokens(value: f64) -> Amount {
        if !value.is_finite() || value < DUST_THRESHOLD {
            return Amount::ZERO;
        }
        Amount((value * WEI_PER_TOKEN).round() as u128)
    }

    /// Back to human units, used when folding a previous round's leaves into
    /// the current float accumulation.
    pub fn to_tokens(self) -> f64 {
        self.0 as f64 / WEI_PER_TOKEN
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Big-endian 32-byte word, as the claim contract packs a uint256.
    pub fn to_be_bytes32(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&self.0.to_be_bytes());
        out
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Previous-round files were written by a BigNumber-style serializer, so an
/// amount may arrive as a JSON number, a decimal string, a 0x-hex string or
/// a `{ "hex": "0x..." }` object. Accept all of them.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

fn parse_amount_str<E: de::Error>(s: &str) -> Result<Amount, E> {
    let trimmed = s.trim();
    let value = if let Some(hex_digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u128::from_str_radix(hex_digits, 16)
            .map_err(|_| E::custom(format!("invalid hex amount: {s}")))?
    } else {
        trimmed
            .parse::<u128>()
            .map_err(|_| E::custom(format!("invalid decimal amount: {s}")))?
    };
    Ok(Amount(value))
}

impl<'de> de::Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer, a decimal or hex string, or {\"hex\": ...}")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(v as u128))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Ok(Amount(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        parse_amount_str(v)
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Amount, A::Error> {
        let mut amount = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "hex" => {
                    let value: String = map.next_value()?;
                    amount = Some(parse_amount_str(&value)?);
                }
                _ => {
                    let _: de::IgnoredAny = map.next_value()?;
                }
            }
        }
        amount.ok_or_else(|| de::Error::missing_field("hex"))
    }
}
