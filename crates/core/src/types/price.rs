//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are non-negative amounts with two-decimal currency semantics. They
//! are parsed from the text a seller types after `-price=`, so the accepted
//! syntax is deliberately narrow: ASCII digits, optionally followed by a dot
//! and more digits.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not of the form `digits` or `digits.digits`.
    #[error("invalid price {0:?}: expected a number such as 12 or 12.50")]
    Malformed(String),
    /// The value is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The digits do not fit in a decimal.
    #[error("invalid price {0:?}: {1}")]
    OutOfRange(String, String),
}

/// A non-negative price, stored rounded to cents.
///
/// ## Examples
///
/// ```
/// use terminal_shop_core::Price;
///
/// let price = Price::parse("12.5").unwrap();
/// assert_eq!(price.to_string(), "$12.50");
///
/// assert!(Price::parse("abc").is_err());
/// assert!(Price::parse("-3").is_err());
/// assert!(Price::parse("1e5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Number of fractional digits kept for every price.
    pub const SCALE: u32 = 2;

    /// Currency symbol used when rendering prices.
    pub const SYMBOL: &'static str = "$";

    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an existing decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.round_dp_with_strategy(
            Self::SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        )))
    }

    /// Parse a price typed by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is not `digits` or `digits.digits` (a leading `-` is reported as negative)
    /// - Has more digits than a decimal can hold
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        if s.is_empty() {
            return Err(PriceError::Empty);
        }

        if let Some(rest) = s.strip_prefix('-')
            && is_plain_decimal(rest)
        {
            return Err(PriceError::Negative);
        }

        if !is_plain_decimal(s) {
            return Err(PriceError::Malformed(s.to_owned()));
        }

        let amount = Decimal::from_str(s)
            .map_err(|e| PriceError::OutOfRange(s.to_owned(), e.to_string()))?;
        Self::new(amount)
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", Self::SYMBOL, self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `digits` or `digits.digits`, ASCII only.
fn is_plain_decimal(s: &str) -> bool {
    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (s, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole) && fraction.is_none_or(all_digits)
}

#[cfg(feature = "postgres")]
impl ::sqlx::Type<::sqlx::Postgres> for Price {
    fn type_info() -> ::sqlx::postgres::PgTypeInfo {
        <Decimal as ::sqlx::Type<::sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for Price {
    fn decode(
        value: ::sqlx::postgres::PgValueRef<'r>,
    ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
        let amount = <Decimal as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Encode<'_, ::sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut ::sqlx::postgres::PgArgumentBuffer,
    ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <Decimal as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
