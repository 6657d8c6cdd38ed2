use std::{
    fmt,
    ops::{Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount in **integer minor units** (cents, paisa, ...).
///
/// Every monetary value of the ledger goes through this type. The
/// organization currency is a display label, so an amount carries none.
///
/// Stored amounts live in `1..=Money::MAX`. Negative values only show up in
/// aggregates (`net`, `current_balance`).
///
/// ```rust
/// use ledger::Money;
///
/// let amount: Money = "12,34".parse().unwrap();
/// assert_eq!(amount, Money::new(1234));
/// assert_eq!(amount.to_string(), "12.34");
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount a single transaction, obligation or settlement may
    /// carry: ten trillion in major units.
    ///
    /// Sums of capped amounts can still exceed `i64`; aggregates add with
    /// [`Money::checked_add`] and report [`EngineError::Overflow`].
    pub const MAX: Money = Money(1_000_000_000_000_000);

    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the sum leaves the `i64` range.
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checks that `self` can be stored as an amount: positive and at most
    /// [`Money::MAX`].
    pub fn storable(self, field: &'static str) -> Result<Money, EngineError> {
        if !self.is_positive() {
            return Err(EngineError::validation(field, format!("{field} must be > 0")));
        }
        if self > Self::MAX {
            return Err(EngineError::validation(
                field,
                format!("{field} must be at most {}", Self::MAX),
            ));
        }
        Ok(self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

/// Only applied to values in `0..=i64::MAX` (stored amounts, settled amounts
/// and non-negative per-kind totals), where the difference cannot overflow.
impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses `[+-]major[(.|,)minor]` with at most two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::validation("amount", reason.to_string());

        let input = s.trim();
        let (negative, digits) = match input.as_bytes().first() {
            Some(b'-') => (true, input[1..].trim_start()),
            Some(b'+') => (false, input[1..].trim_start()),
            _ => (false, input),
        };
        if digits.is_empty() {
            return Err(invalid("empty amount"));
        }

        let (major, fraction) = match digits.split_once(['.', ',']) {
            Some((major, fraction)) => (major, fraction),
            None => (digits, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if major.is_empty() || !all_digits(major) || !all_digits(fraction) {
            return Err(invalid("invalid amount"));
        }
        if fraction.len() > 2 {
            return Err(invalid("too many decimals"));
        }

        // Right-pad the fraction so "5" reads as 50 minor units.
        let cents = format!("{fraction:0<2}");
        let minor = major
            .parse::<i64>()
            .ok()
            .and_then(|major| major.checked_mul(100))
            .and_then(|minor| minor.checked_add(cents.parse::<i64>().unwrap_or(0)))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -minor } else { minor }))
    }
}
