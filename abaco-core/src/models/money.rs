//! Fixed-point money.
//!
//! Amounts are [`Decimal`], never floating point, so repeated polls of the
//! same upstream value always compare equal.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Currency
// ============================================================================

/// ISO 4217 alphabetic currency code (three uppercase ASCII letters).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// Brazilian real, the upstream API's home currency.
    pub const BRL: Currency = Currency(*b"BRL");
    /// US dollar.
    pub const USD: Currency = Currency(*b"USD");

    /// Parses a currency code, accepting lowercase and surrounding whitespace.
    pub fn new(code: &str) -> Result<Self, CoreError> {
        let trimmed = code.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(CoreError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or("XXX")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::BRL
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.as_str())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.as_str().to_string()
    }
}

// ============================================================================
// Money
// ============================================================================

/// A decimal amount in a specific currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// The amount.
    pub amount: Decimal,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Creates a new amount.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}

/// Parses a decimal from its textual form.
///
/// Accepts plain (`"1234.56"`, `"-10"`) and scientific (`"1.5e3"`) notation.
/// Returns `None` for anything else, including empty strings.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_normalizes() {
        assert_eq!(Currency::new(" brl ").unwrap(), Currency::BRL);
        assert_eq!(Currency::new("usd").unwrap().as_str(), "USD");
    }

    #[test]
    fn test_currency_rejects_bad_codes() {
        assert!(Currency::new("").is_err());
        assert!(Currency::new("R$").is_err());
        assert!(Currency::new("EURO").is_err());
        assert!(Currency::new("U5D").is_err());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_decimal(" -10 "), Some(dec!(-10)));
        assert_eq!(parse_decimal("1.5e3"), Some(dec!(1500)));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(dec!(10.50), Currency::BRL);
        assert_eq!(money.to_string(), "BRL 10.50");
        assert!(!money.is_negative());
        assert!(Money::zero(Currency::USD).is_zero());
    }

    #[test]
    fn test_repeated_decimal_addition_is_exact() {
        let mut total = Decimal::ZERO;
        for _ in 0..10 {
            total += dec!(0.1);
        }
        assert_eq!(total, dec!(1.0));
    }
}
