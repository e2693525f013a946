//! Checkout cart snapshot.

use super::money::{Money, TaxedMoney};
use super::order::{Address, ShippingMethod, Variant};
use crate::hooks::VariantPricing;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub variant: Variant,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub currency: String,
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub shipping_method: Option<ShippingMethod>,
    pub discount_amount: Money,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of discounted line prices, without tax.
    pub fn subtotal(&self, pricing: &dyn VariantPricing) -> TaxedMoney {
        self.lines
            .iter()
            .fold(TaxedMoney::zero(&self.currency), |acc, line| {
                acc + TaxedMoney::untaxed(pricing.price(&line.variant).times(line.quantity))
            })
    }

    pub fn shipping_price(&self) -> TaxedMoney {
        match &self.shipping_method {
            Some(method) => TaxedMoney::untaxed(method.price.clone()),
            None => TaxedMoney::zero(&self.currency),
        }
    }
}
