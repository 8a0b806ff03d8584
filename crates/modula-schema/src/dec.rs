//! Deterministic fixed-point decimal used for split amounts and exchange rates.
//!
//! Values are stored as an arbitrary precision integer scaled by 10^18, so
//! arithmetic is exact and identical on every node. The canonical text form
//! drops trailing fractional zeros, which keeps hashes of equal values equal.

use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use dashu::integer::IBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use modula_error::{SchemaError, SchemaResult};

/// Number of fractional digits carried by every [`Dec`]
pub const PRECISION: usize = 18;

fn scale() -> IBig {
    IBig::from(10u64.pow(PRECISION as u32))
}

/// Fixed-point decimal with [`PRECISION`] fractional digits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dec(IBig);

impl Dec {
    pub fn zero() -> Self {
        Dec(IBig::ZERO)
    }

    /// Create a decimal from a whole number
    pub fn from_integer(value: i64) -> Self {
        Dec(IBig::from(value) * scale())
    }

    /// Parse the canonical or any padded text form, e.g. `"12"`, `"0.50"`, `"-3.25"`
    pub fn parse(text: &str) -> SchemaResult<Self> {
        let trimmed = text.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (integer_part, fractional_part) = match body.split_once('.') {
            Some((integer, fraction)) => {
                if fraction.is_empty() {
                    return Err(SchemaError::malformed_decimal(text));
                }
                (integer, fraction)
            }
            None => (body, ""),
        };

        if integer_part.is_empty()
            || !integer_part.bytes().all(|b| b.is_ascii_digit())
            || !fractional_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(SchemaError::malformed_decimal(text));
        }
        if fractional_part.len() > PRECISION {
            return Err(SchemaError::malformed_decimal(format!(
                "{} has more than {} fractional digits",
                text, PRECISION
            )));
        }

        let digits = format!("{}{:0<width$}", integer_part, fractional_part, width = PRECISION);
        let magnitude = IBig::from_str(&digits)
            .map_err(|e| SchemaError::malformed_decimal(format!("{}: {}", text, e)))?;

        Ok(Dec(if negative { -magnitude } else { magnitude }))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == IBig::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.0 > IBig::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < IBig::ZERO
    }

    /// Exact sum
    pub fn add(&self, other: &Dec) -> Dec {
        Dec(&self.0 + &other.0)
    }

    /// Exact difference
    pub fn sub(&self, other: &Dec) -> Dec {
        Dec(&self.0 - &other.0)
    }

    /// Product truncated toward zero at [`PRECISION`] digits
    pub fn mul(&self, other: &Dec) -> Dec {
        Dec((&self.0 * &other.0) / scale())
    }
}

impl Default for Dec {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialOrd for Dec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.is_negative();
        let magnitude = if negative { -self.0.clone() } else { self.0.clone() };
        let scale = scale();
        let integer = &magnitude / &scale;
        let fraction = &magnitude % &scale;
        let sign = if negative { "-" } else { "" };

        if fraction == IBig::ZERO {
            return write!(f, "{}{}", sign, integer);
        }

        let padded = format!("{:0>width$}", fraction.to_string(), width = PRECISION);
        write!(f, "{}{}.{}", sign, integer, padded.trim_end_matches('0'))
    }
}

impl FromStr for Dec {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dec::parse(s)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as Deserialize>::deserialize(deserializer)?;
        Dec::parse(&text).map_err(serde::de::Error::custom)
    }
}

// Canonical binary form is the canonical text form
impl BorshSerialize for Dec {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        BorshSerialize::serialize(&self.to_string(), writer)
    }
}

impl BorshDeserialize for Dec {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let text = String::deserialize_reader(reader)?;
        Dec::parse(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }
}
