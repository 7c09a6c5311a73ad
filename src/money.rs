//! Money Module
//!
//! Every monetary value in the ledger is a `rust_decimal::Decimal`; binary
//! floating point never touches an amount. All conversions between client
//! text and ledger values go through this module.
//!
//! ## Rules
//! 1. Parsing is strict about *format* (no `.5`, `5.`, exponents or `+`)
//!    but not about *sign*: a negative transfer amount is a business
//!    rejection (`NonPositiveAmount`), not a syntax error.
//! 2. Rounding happens exactly once, in [`normalize`], to
//!    [`CURRENCY_SCALE`] digits, half away from zero.
//! 3. Output is always rendered with exactly [`CURRENCY_SCALE`] digits.
//! 4. Amounts and balances stay strictly below [`AMOUNT_LIMIT`].
//!
//! ## Usage
//! ```rust
//! use transfer_ledger::money::{format_amount, normalize, parse_amount};
//!
//! let amount = normalize(parse_amount("30.005").unwrap());
//! assert_eq!(format_amount(amount), "30.01");
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

use crate::core_types::CURRENCY_SCALE;

/// Money parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Amount out of range")]
    Overflow,
}

/// Exclusive upper bound for every amount and balance (`10^26`).
///
/// Below this bound a value keeps its full [`CURRENCY_SCALE`] precision in
/// a 96-bit mantissa, the sum of two in-range values cannot overflow, and
/// it fits the `NUMERIC(30, 2)` columns.
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0xE400_0000, 0xDCC8_0CD2, 0x0052_B7D2, false, 0);

/// Whether `amount` is below [`AMOUNT_LIMIT`]. Negative values pass; sign
/// rules belong to the caller.
#[inline]
pub fn within_limit(amount: Decimal) -> bool {
    amount < AMOUNT_LIMIT
}

/// Parse a client-provided amount string into an exact decimal.
///
/// # Errors
/// * `InvalidFormat` - empty input, missing digits around the dot,
///   scientific notation, explicit `+`, or anything the decimal parser rejects
/// * `Overflow` - value does not fit in a 96-bit decimal mantissa
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let s = amount_str.trim();
    if s.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if s.starts_with('+') {
        return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
    }

    if s.contains('e') || s.contains('E') {
        return Err(MoneyError::InvalidFormat(
            "scientific notation not allowed".into(),
        ));
    }

    let unsigned = s.strip_prefix('-').unwrap_or(s);
    if unsigned.starts_with('.') {
        return Err(MoneyError::InvalidFormat(
            "missing leading zero (e.g., use 0.5 instead of .5)".into(),
        ));
    }
    if unsigned.ends_with('.') {
        return Err(MoneyError::InvalidFormat(
            "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
        ));
    }

    Decimal::from_str_exact(s).map_err(|e| match e {
        rust_decimal::Error::ExceedsMaximumPossibleValue
        | rust_decimal::Error::LessThanMinimumPossibleValue => MoneyError::Overflow,
        other => MoneyError::InvalidFormat(other.to_string()),
    })
}

/// Round to the ledger currency precision (half away from zero).
///
/// This is the only place the ledger rounds; debit, credit and the log
/// entry all use the value it returns.
#[inline]
pub fn normalize(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    // `-0.001` rounds to a negative zero; keep zero unsigned so it prints as "0.00"
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

/// Render an amount with exactly [`CURRENCY_SCALE`] fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    normalize(amount).to_string()
}

/// Serde adapter that writes amounts as fixed-scale strings (`"70.00"`).
pub mod as_string {
    use rust_decimal::Decimal;
    use serde::Serializer;

    pub fn serialize<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_amount(*amount))
    }
}
