//! # Money Module
//!
//! Provides the `Money` type for every amount in the ledger.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Premium Rice: 50 × 45.99 in floating point                            │
//! │    = 2299.4999999999995  ❌ off by a fraction of a cent                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    50 × 4599 cents = 229950 cents = $2299.50  ✓ exact                  │
//! │                                                                         │
//! │  Order totals, paid amounts and outstanding balances are all sums      │
//! │  of these exact values, so statistics never drift.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopkeep_core::money::Money;
//!
//! let price = Money::from_major_minor(45, 99); // $45.99
//! let line = price.checked_mul(50).unwrap();   // $2299.50
//! assert_eq!(line.cents(), 229_950);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;
use crate::validation::parse_amount_input;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: outstanding balances go negative on overpayment,
///   and profit/loss goes negative when purchases exceed sales
/// - **Currency numbers on the wire**: serialized as `5545.41`, not as
///   cents. Reading rounds half-up to the cent and accepts integers
///   (`118` is $118.00)
/// - **Checked arithmetic** for anything driven by user input; the plain
///   operators are for amounts already known to be in range
///
/// ## Where Money Flows
/// ```text
/// Product.unit_price ──► CartLine.unit_price ──► OrderItem.total_price
///                                                       │
///                                   Σ ──► Order.subtotal ──► tax ──► total
///                                                                     │
///                              paid_amount ──► remaining_amount ◄─────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// let price = Money::from_cents(12000); // $120.00
    /// assert_eq!(price.cents(), 12000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    ///
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(45, 99).cents(), 4599);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounded half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * bps + 5000) / 10000`.
    /// The +5000 is the half-cent that makes the division round.
    ///
    /// ```rust
    /// use shopkeep_core::money::Money;
    /// use shopkeep_core::types::TaxRate;
    ///
    /// // Subtotal $4699.50 at 18% = $845.91
    /// let subtotal = Money::from_cents(469_950);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1800));
    /// assert_eq!(tax.cents(), 84_591);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Unit amount times a quantity. `None` on overflow.
    ///
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4599).checked_mul(50), Some(Money::from_cents(229_950)));
    /// assert_eq!(Money::from_cents(4599).checked_mul(3_000_000_000_000_000), None);
    /// ```
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sum of `amounts`, or `None` if any partial sum overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Addition clamped to the representable range.
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    #[inline]
    pub const fn saturating_sub(self, other: Money) -> Self {
        Money(self.0.saturating_sub(other.0))
    }

    /// Value in major units, as written to storage.
    ///
    /// Exact for every amount below 2^53 cents.
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Converts a currency number to money, rounding half-up to the cent.
    ///
    /// Rounding works on the shortest decimal form of `value`, so `2.675`
    /// becomes $2.68 even though the nearest double is slightly below it.
    /// `None` for NaN, infinities and values outside the money range.
    ///
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(5545.41), Some(Money::from_cents(554_541)));
    /// assert_eq!(Money::from_major(2.675), Some(Money::from_cents(268)));
    /// assert_eq!(Money::from_major(f64::NAN), None);
    /// ```
    pub fn from_major(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        parse_amount_input(&value.to_string()).ok()
    }

    /// Expresses `self` as a percentage of `base`, rounded to two decimals.
    ///
    /// Returns `0.0` when `base` is zero.
    ///
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// let profit = Money::from_cents(2500);
    /// let sales = Money::from_cents(10000);
    /// assert_eq!(profit.percentage_of(sales), 25.0);
    /// ```
    pub fn percentage_of(&self, base: Money) -> f64 {
        if base.is_zero() {
            return 0.0;
        }

        // Hundredths of a percent, rounded half away from zero.
        let num = self.0 as i128 * 10_000;
        let den = base.0 as i128;
        let quotient = num / den;
        let remainder = num % den;
        let rounded = if 2 * remainder.abs() >= den.abs() {
            quotient + num.signum() * den.signum()
        } else {
            quotient
        };

        rounded as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form, used in logs and invoice DTOs.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Saturates at the ends of the money range.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a currency amount such as 45.99")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Money, E> {
        value
            .checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {} is out of range", value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Money, E> {
        i64::try_from(value)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {} is out of range", value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Money, E> {
        Money::from_major(value).ok_or_else(|| E::custom(format!("amount {} is out of range", value)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
