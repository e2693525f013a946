//! Money arithmetic for orders and carts.
//!
//! Amounts stay `Decimal` end to end. Floating point only appears when a
//! payload is serialized for TaxJar.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Decimal places used when rounding computed amounts.
pub const DECIMAL_PLACES: u32 = 2;

/// An amount in a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency.clone())
    }

    pub fn round(&self) -> Self {
        Self::new(self.amount.round_dp(DECIMAL_PLACES), self.currency.clone())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        debug_assert_eq!(self.currency, rhs.currency, "currency mismatch");
        Money::new(self.amount + rhs.amount, self.currency)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        debug_assert_eq!(self.currency, rhs.currency, "currency mismatch");
        Money::new(self.amount - rhs.amount, self.currency)
    }
}

impl Sub<&Money> for Money {
    type Output = Money;

    fn sub(self, rhs: &Money) -> Money {
        debug_assert_eq!(self.currency, rhs.currency, "currency mismatch");
        Money::new(self.amount - rhs.amount, self.currency)
    }
}

/// A price carrying both its net and gross amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxedMoney {
    pub net: Money,
    pub gross: Money,
}

impl TaxedMoney {
    pub fn new(net: Money, gross: Money) -> Self {
        Self { net, gross }
    }

    /// Net and gross are the same amount.
    pub fn untaxed(money: Money) -> Self {
        Self {
            net: money.clone(),
            gross: money,
        }
    }

    pub fn zero(currency: &str) -> Self {
        Self::untaxed(Money::zero(currency))
    }

    pub fn tax(&self) -> Money {
        self.gross.clone() - &self.net
    }

    pub fn currency(&self) -> &str {
        &self.gross.currency
    }

    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.net.times(quantity), self.gross.times(quantity))
    }
}

impl Add for TaxedMoney {
    type Output = TaxedMoney;

    fn add(self, rhs: TaxedMoney) -> TaxedMoney {
        TaxedMoney::new(self.net + rhs.net, self.gross + rhs.gross)
    }
}

/// Subtracting plain money takes the same amount off net and gross.
impl Sub<&Money> for TaxedMoney {
    type Output = TaxedMoney;

    fn sub(self, rhs: &Money) -> TaxedMoney {
        TaxedMoney::new(self.net - rhs, self.gross - rhs)
    }
}

/// A discount stored either as a money object or as a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiscountAmount {
    Money(Money),
    Bare(Decimal),
}

impl DiscountAmount {
    pub fn amount(&self) -> Decimal {
        match self {
            DiscountAmount::Money(money) => money.amount,
            DiscountAmount::Bare(amount) => *amount,
        }
    }

    pub fn to_money(&self, currency: &str) -> Money {
        match self {
            DiscountAmount::Money(money) => money.clone(),
            DiscountAmount::Bare(amount) => Money::new(*amount, currency),
        }
    }
}

impl Default for DiscountAmount {
    fn default() -> Self {
        DiscountAmount::Bare(Decimal::ZERO)
    }
}
