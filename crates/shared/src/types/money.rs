//! Money type in integer minor currency units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a whole number of the smallest denomination (e.g. yen),
//! so addition and subtraction are exact and sums never drift.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A monetary amount in minor currency units.
///
/// Serialized as a bare JSON integer. Negative values only appear in derived
/// figures such as member balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a count of minor units.
    #[must_use]
    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Returns the amount as a count of minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Subtracts `other`, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(diff) => Some(Self(diff)),
            None => None,
        }
    }
}

impl From<i64> for Money {
    fn from(minor_units: i64) -> Self {
        Self(minor_units)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_new() {
        let money = Money::new(3000);
        assert_eq!(money.minor_units(), 3000);
        assert_eq!(Money::from(3000), money);
    }

    #[test]
    fn test_money_zero() {
        assert!(Money::ZERO.is_zero());
        assert_eq!(Money::default(), Money::ZERO);
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::ZERO.is_positive());
    }

    #[test]
    fn test_money_sign() {
        assert!(Money::new(10).is_positive());
        assert!(Money::new(-10).is_negative());
        assert_eq!(Money::new(-10).abs(), Money::new(10));
        assert_eq!(-Money::new(10), Money::new(-10));
    }

    #[test]
    fn test_money_arithmetic() {
        let mut money = Money::new(1000) + Money::new(500) - Money::new(200);
        assert_eq!(money, Money::new(1300));

        money += Money::new(7);
        money -= Money::new(300);
        assert_eq!(money, Money::new(1007));
    }

    #[test]
    fn test_money_checked() {
        assert_eq!(
            Money::new(1).checked_add(Money::new(2)),
            Some(Money::new(3))
        );
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);
        assert_eq!(Money::new(i64::MIN).checked_sub(Money::new(1)), None);
    }

    #[test]
    fn test_money_sum() {
        let amounts = [Money::new(34), Money::new(33), Money::new(33)];
        assert_eq!(amounts.iter().sum::<Money>(), Money::new(100));
        assert_eq!(amounts.into_iter().sum::<Money>(), Money::new(100));
    }

    #[test]
    fn test_money_serializes_as_integer() {
        let json = serde_json::to_string(&Money::new(-1000)).unwrap();
        assert_eq!(json, "-1000");

        let parsed: Money = serde_json::from_str("2500").unwrap();
        assert_eq!(parsed, Money::new(2500));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(-42).to_string(), "-42");
    }
}
