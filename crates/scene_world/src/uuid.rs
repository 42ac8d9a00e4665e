//! Stable 64-bit identifiers.
//!
//! A [`Uuid`] is the only entity handle that survives serialisation. Live
//! [`Entity`](crate::Entity) handles are world-local and meaningless outside
//! the world that allocated them; a `Uuid` travels with the packed document
//! and is re-bound to a fresh live handle on instantiation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A stable 64-bit identifier, independent of any world's internal handles.
///
/// The zero value is reserved as [`Uuid::INVALID`]. Fresh identifiers come
/// from [`Uuid::generate`] and are never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uuid(u64);

impl Uuid {
    /// The null / invalid identifier sentinel.
    pub const INVALID: Uuid = Uuid(0);

    /// Generate a fresh random identifier. Guaranteed non-zero.
    #[must_use]
    pub fn generate() -> Self {
        loop {
            let (hi, _) = uuid::Uuid::new_v4().as_u64_pair();
            if hi != 0 {
                return Self(hi);
            }
        }
    }

    /// Create an identifier from a raw `u64` value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw `u64` value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) identifier.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Format as a decimal string.
    #[must_use]
    pub fn to_dec(self) -> String {
        self.0.to_string()
    }

    /// Parse a decimal string. Returns [`Uuid::INVALID`] on any malformed
    /// input rather than failing.
    #[must_use]
    pub fn from_dec(text: &str) -> Self {
        text.trim().parse().map(Self).unwrap_or(Self::INVALID)
    }

    /// Format as unprefixed uppercase hex without separators.
    ///
    /// Output is deliberately narrower than what [`Uuid::from_hex`] accepts:
    /// parsing tolerates `0x` prefixes and `-` separators for hand-edited
    /// documents, but the engine always writes the canonical bare form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:X}", self.0)
    }

    /// Parse a hex string. Accepts an optional `0x`/`0X` prefix and `-`
    /// separators, in any character case.
    ///
    /// Returns [`Uuid::INVALID`] on empty, over-length (more than 16 hex
    /// digits), or non-hex-digit input rather than failing.
    #[must_use]
    pub fn from_hex(text: &str) -> Self {
        let stripped = text.trim();
        let stripped = stripped
            .strip_prefix("0x")
            .or_else(|| stripped.strip_prefix("0X"))
            .unwrap_or(stripped);
        let digits: String = stripped.chars().filter(|&c| c != '-').collect();
        if digits.is_empty() || digits.len() > 16 {
            return Self::INVALID;
        }
        u64::from_str_radix(&digits, 16)
            .map(Self)
            .unwrap_or(Self::INVALID)
    }
}

impl std::fmt::Display for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl From<u64> for Uuid {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// Documents carry identifiers as hex strings, so the serde forms go through
// `to_hex` / `from_hex` rather than the raw integer.
impl Serialize for Uuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Uuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Malformed identifier text degrades to INVALID instead of failing
        // the surrounding document load.
        let text = String::deserialize(deserializer)?;
        Ok(Self::from_hex(&text))
    }
}
