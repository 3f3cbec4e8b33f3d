//! # Money Module
//!
//! Provides the `Money` type for finalized monetary values.
//!
//! ## Two Number Types, One Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WORKING VALUES                     FINAL VALUES                        │
//! │  (Decimal, unrounded)               (Money, integer cents)              │
//! │                                                                         │
//! │  45.00 / 1.12 = 40.178571...  ──►  from_decimal()  ──►  4018 cents     │
//! │                                                                         │
//! │  Tax extraction divides, so intermediate values keep full precision.   │
//! │  Every figure shown to the user crosses into Money exactly once,       │
//! │  rounded to 2 decimal places, half away from zero.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bizdesk_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let tax = Money::from_decimal(Decimal::new(4821, 3)); // 4.821
//! assert_eq!(tax.cents(), 482);
//!
//! let total = tax + Money::from_cents(2400);
//! assert_eq!(total.to_string(), "$28.82");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

/// Decimal places for every finalized amount.
pub const MONEY_DECIMALS: u32 = 2;

/// Rounds a working value to money precision (2 dp, half away from zero).
///
/// `2.675 → 2.68`, `-2.675 → -2.68`, `2.674999 → 2.67`.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Serializes as the integer number of cents: `$269.00` is `26900` in JSON
/// and in the generated TypeScript `number`. Divide by 100 (or format with
/// the currency settings) before showing it.
///
/// ## Design Decisions
/// - **i64 (signed)**: credit lines and refunds produce negative totals
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No float constructor**: amounts enter either as cents or through
///   [`Money::from_decimal`], which owns the rounding rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bizdesk_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds a decimal amount to cents, half away from zero.
    ///
    /// Values beyond the i64 cent range saturate instead of wrapping.
    ///
    /// ```rust
    /// use bizdesk_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Money::from_decimal(Decimal::new(40178571, 6)).cents(), 4018);
    /// assert_eq!(Money::from_decimal(Decimal::new(-2675, 3)).cents(), -268);
    /// ```
    pub fn from_decimal(value: Decimal) -> Self {
        let cents = round_money(value)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64());

        match cents {
            Some(c) => Money(c),
            None if value.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal with scale 2 (`1099 → 10.99`).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MONEY_DECIMALS)
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

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

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
// Arithmetic saturates at the i64 bounds.

/// Debug-friendly display (`-$5.50`).
///
/// ## Note
/// User-facing text goes through `CurrencyFormat::format`, which knows the
/// configured symbol.
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by an integer count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
