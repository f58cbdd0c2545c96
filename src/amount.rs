//! Non-negative decimal amount owed by a debtor.
//!
//! Uses `rust_decimal` internally so that equality between a displayed amount
//! and a stored one is exact. Persisted as a JSON number with every digit
//! kept, which needs serde_json's `arbitrary_precision`.

use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// An amount due, always `>= 0`.
///
/// Values are normalized (trailing zeros stripped) so `50000`, `50000.0` and
/// `50,000` compare equal.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use debt_ledger::Amount;
///
/// let amount = Amount::from_str("50,000.50").unwrap();
/// assert_eq!(amount.to_string(), "50000.5");
/// assert!(Amount::from_str("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Creates an amount, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LedgerError::Validation(format!(
                "amount must not be negative, got {}",
                value
            )));
        }
        Ok(Amount(value.normalize()))
    }

    /// Returns `true` if nothing is owed.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns the underlying decimal.
    pub fn value(&self) -> Decimal {
        self.0
    }

}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses user input. Surrounding whitespace and thousands separators are
    /// ignored.
    fn from_str(s: &str) -> Result<Self> {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err(LedgerError::Validation("amount is empty".to_string()));
        }
        let decimal = Decimal::from_str(&cleaned)
            .map_err(|e| LedgerError::Validation(format!("invalid amount '{}': {}", s, e)))?;
        Amount::new(decimal)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    /// Written as a JSON number carrying the exact decimal digits.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Number::from_str(&self.0.to_string())
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts a JSON number or a numeric string.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => return Amount::from_str(&s).map_err(de::Error::custom),
            other => {
                return Err(de::Error::custom(format!(
                    "expected a non-negative number, got {}",
                    other
                )))
            }
        };
        let decimal = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|e| {
                <D::Error as de::Error>::custom(format!("invalid amount {}: {}", text, e))
            })?;
        Amount::new(decimal).map_err(de::Error::custom)
    }
}
