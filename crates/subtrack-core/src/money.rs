//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a budget tracker:                                                   │
//! │    9.99 × 4.33 = 43.256699999999995 → displayed as 43.26, stored as ?  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    999 cents × 433 / 100 = 4326 cents (rounded once, explicitly)       │
//! │    The rounding step is visible and deterministic                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use subtrack_core::money::Money;
//!
//! // Create from cents (preferred)
//! let amount = Money::from_cents(1099); // 10.99
//!
//! // Arithmetic operations
//! let total = amount + Money::from_cents(500); // 15.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::{MONTHS_PER_YEAR, WEEKS_PER_MONTH_HUNDREDTHS};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for the remaining-budget figure
///   (a user can be over budget)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde**: Serializes as a bare integer, so cache payloads
///   and HTTP bodies carry plain cent counts
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Subscription.amount ──► monthly_equivalent ──► BudgetSummary.total     │
/// │                                                                         │
/// │  monthly income ──► BudgetSummary.remaining (may go negative)           │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::money::Money;
    ///
    /// let amount = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(amount.cents(), 1099);
    /// ```
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use cents.
    /// Only the UI converts to a decimal for display.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::money::Money;
    ///
    /// let amount = Money::from_major_minor(10, 99); // 10.99
    /// assert_eq!(amount.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::money::Money;
    ///
    /// let zero = Money::zero();
    /// assert_eq!(zero.cents(), 0);
    /// assert!(zero.is_zero());
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Normalizes a weekly amount to its monthly equivalent (× 4.33).
    ///
    /// ## Rounding
    /// `cents × 433 / 100`, rounded half up via integer math. The factor
    /// 4.33 is the conventional average-weeks-per-month figure; the product
    /// is exact whenever `cents` is a multiple of 100, so round amounts like
    /// 10.00/week normalize to exactly 43.30/month.
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::money::Money;
    ///
    /// let weekly = Money::from_cents(1000); // 10.00/week
    /// assert_eq!(weekly.per_month_from_weekly().cents(), 4330);
    /// ```
    pub fn per_month_from_weekly(&self) -> Money {
        // i128 to prevent overflow on large amounts; +50 gives half-up rounding
        let monthly = (self.0 as i128 * WEEKS_PER_MONTH_HUNDREDTHS as i128 + 50) / 100;
        Money(monthly as i64)
    }

    /// Normalizes a yearly amount to its monthly equivalent (÷ 12).
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::money::Money;
    ///
    /// let yearly = Money::from_cents(12000); // 120.00/year
    /// assert_eq!(yearly.per_month_from_yearly().cents(), 1000);
    /// ```
    pub fn per_month_from_yearly(&self) -> Money {
        // +6 gives half-up rounding for the ÷12 division
        let monthly = (self.0 as i128 + (MONTHS_PER_YEAR as i128 / 2)) / MONTHS_PER_YEAR as i128;
        Money(monthly as i64)
    }

    /// Returns this value as a percentage of `whole` (for display only).
    ///
    /// Returns 0.0 when `whole` is zero - the remaining-percent figure is
    /// defined as 0 for a user with no recorded income.
    ///
    /// ## Example
    /// ```rust
    /// use subtrack_core::money::Money;
    ///
    /// let remaining = Money::from_cents(176_700);
    /// let income = Money::from_cents(250_000);
    /// assert!((remaining.percent_of(income) - 70.68).abs() < 0.001);
    /// ```
    pub fn percent_of(&self, whole: Money) -> f64 {
        if whole.is_zero() {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logging. Currency symbols and localization
/// belong to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Sum over an iterator of Money values.
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_round_trip() {
        let m = Money::from_cents(1099);
        assert_eq!(m.cents(), 1099);
        assert_eq!(m.major(), 10);
        assert_eq!(m.minor(), 99);
    }

    #[test]
    fn test_from_major_minor_negative() {
        let m = Money::from_major_minor(-5, 50);
        assert_eq!(m.cents(), -550);
    }

    #[test]
    fn test_weekly_normalization_exact() {
        // 10.00/week → 43.30/month, no rounding loss
        assert_eq!(Money::from_cents(1000).per_month_from_weekly().cents(), 4330);
    }

    #[test]
    fn test_weekly_normalization_rounds_half_up() {
        // 9.99 × 4.33 = 43.2567 → 43.26
        assert_eq!(Money::from_cents(999).per_month_from_weekly().cents(), 4326);
    }

    #[test]
    fn test_yearly_normalization() {
        assert_eq!(Money::from_cents(12000).per_month_from_yearly().cents(), 1000);
        // 100.00/year = 8.3333../month → 8.33
        assert_eq!(Money::from_cents(10000).per_month_from_yearly().cents(), 833);
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert_eq!(Money::from_cents(500).percent_of(Money::zero()), 0.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((b - a).cents(), -750);
        assert!((b - a).is_negative());

        let sum: Money = [a, b, Money::from_cents(1)].into_iter().sum();
        assert_eq!(sum.cents(), 1251);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_serde_transparent() {
        let m = Money::from_cents(2500);
        assert_eq!(serde_json::to_string(&m).unwrap(), "2500");
        let back: Money = serde_json::from_str("2500").unwrap();
        assert_eq!(back, m);
    }
}
