//! Money types for API boundary enforcement
//!
//! - `StrictDecimal`: Format-validated input type

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{self, MoneyError};

// ============================================================================
// StrictDecimal: Format-Validated Decimal at Serde Layer
// ============================================================================

/// Strict format Decimal - validates format during deserialization
///
/// Only JSON strings are accepted; JSON numbers would pass through binary
/// floating point first. Format rules are those of
/// [`money::parse_amount`]:
/// - Rejects `.5` (must be `0.5`)
/// - Rejects `5.` (must be `5.0` or `5`)
/// - Rejects empty strings, `+` prefixes and scientific notation
///
/// The sign is NOT checked here. A negative amount is well-formed and is
/// refused later by business validation with its own error kind.
#[derive(Debug, Clone, Copy)]
pub struct StrictDecimal(Decimal);

impl StrictDecimal {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl std::ops::Deref for StrictDecimal {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for StrictDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let s = String::deserialize(deserializer)?;
        match money::parse_amount(&s) {
            Ok(d) => Ok(StrictDecimal(d)),
            Err(MoneyError::Overflow) => Err(D::Error::custom("Amount out of range")),
            Err(MoneyError::InvalidFormat(reason)) => {
                Err(D::Error::custom(format!("Invalid amount: {}", reason)))
            }
        }
    }
}

impl Serialize for StrictDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
