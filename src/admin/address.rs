//! Account addresses
//!
//! An address is `0x` followed by exactly 40 hex digits. Hex digits are
//! case-insensitive: two addresses that differ only in case are the same
//! account, but the original spelling is kept for display.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use super::error::ValidationError;

const ADDRESS_PATTERN: &str = r"^0x[0-9a-fA-F]{40}$";

fn address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern is valid"))
}

/// True if `s` is `0x` followed by exactly 40 hex digits
pub fn is_valid_address(s: &str) -> bool {
    address_regex().is_match(s)
}

/// A validated account address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField("address"));
        }
        if !is_valid_address(trimmed) {
            return Err(ValidationError::InvalidAddress(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build an address from raw bytes (lowercase hex)
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        Self(format!("0x{}", hex))
    }

    /// Wrap a trusted literal without checking it
    ///
    /// Only for built-in seed data, some of which predates the format check.
    pub(crate) fn new_unchecked(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form, e.g. `0x742d...0bEb`
    pub fn short(&self) -> String {
        shorten(&self.0)
    }

    /// Case-insensitive substring match
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }

    /// The all-zero address
    pub fn zero() -> Self {
        Self::from_bytes([0u8; 20])
    }
}

/// Abbreviate any string to its first 6 and last 4 characters
pub fn shorten(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 10 {
        return s.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
