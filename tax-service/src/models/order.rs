//! Order snapshot as handed over by the host on save.

use super::money::{DiscountAmount, Money, TaxedMoney};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type OrderId = i64;

/// Postal address attached to an order or cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    /// State, province or other subdivision code.
    #[serde(default)]
    pub country_area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street_address_1: Option<String>,
}

impl Address {
    pub fn postal_code(&self) -> Option<&str> {
        non_blank(self.postal_code.as_deref())
    }

    pub fn region(&self) -> Option<&str> {
        non_blank(self.country_area.as_deref())
    }

    pub fn city(&self) -> Option<&str> {
        non_blank(self.city.as_deref())
    }

    pub fn street(&self) -> Option<&str> {
        non_blank(self.street_address_1.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    Value,
    Product,
    Category,
    Shipping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub code: String,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
}

impl Voucher {
    pub fn discounts_shipping(&self) -> bool {
        self.voucher_type == VoucherType::Shipping
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Waiting,
    Preauth,
    Confirmed,
    Rejected,
    Refunded,
    Error,
    Input,
}

impl PaymentStatus {
    /// Statuses whose amount counts towards paying off an order.
    pub fn is_settling(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Confirmed | PaymentStatus::Preauth | PaymentStatus::Refunded
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub status: PaymentStatus,
    pub currency: String,
    /// Gross amount of the payment, tax included.
    pub total: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub captured_amount: Decimal,
    pub created: DateTime<Utc>,
}

impl Payment {
    pub fn total_price(&self) -> TaxedMoney {
        TaxedMoney::new(
            Money::new(self.total - self.tax, self.currency.clone()),
            Money::new(self.total, self.currency.clone()),
        )
    }

    pub fn captured_price(&self) -> Money {
        Money::new(self.captured_amount, self.currency.clone())
    }
}

/// Product variant as the host's catalog describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub sku: String,
    pub name: String,
    /// Undiscounted, untaxed unit price.
    pub base_price: Money,
    /// Name of the product's tax rate, usually a TaxJar product tax code.
    #[serde(default)]
    pub tax_rate: String,
    #[serde(default)]
    pub track_inventory: bool,
    #[serde(default = "default_true")]
    pub is_shipping_required: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// `None` until the host persists the line.
    #[serde(default)]
    pub id: Option<i64>,
    pub product_name: String,
    pub product_sku: String,
    pub is_shipping_required: bool,
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<Variant>,
    pub unit_price: TaxedMoney,
    #[serde(default)]
    pub tax_rate: Decimal,
}

impl OrderLine {
    /// New line priced without line-level tax.
    pub fn for_variant(variant: &Variant, quantity: u32, unit_price: Money) -> Self {
        Self {
            id: None,
            product_name: variant.name.clone(),
            product_sku: variant.sku.clone(),
            is_shipping_required: variant.is_shipping_required,
            quantity,
            variant: Some(variant.clone()),
            unit_price: TaxedMoney::untaxed(unit_price),
            tax_rate: Decimal::ZERO,
        }
    }

    pub fn total(&self) -> TaxedMoney {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub name: String,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created: DateTime<Utc>,
    pub total: TaxedMoney,
    pub shipping_price: TaxedMoney,
    #[serde(default)]
    pub discount_amount: DiscountAmount,
    #[serde(default)]
    pub voucher: Option<Voucher>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub shipping_method: Option<ShippingMethod>,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Order {
    pub fn currency(&self) -> &str {
        self.total.currency()
    }

    pub fn total_net(&self) -> &Money {
        &self.total.net
    }

    pub fn shipping_net(&self) -> &Money {
        &self.shipping_price.net
    }

    pub fn total_tax(&self) -> Money {
        self.total.tax()
    }

    /// Shipping address, or the billing address when nothing ships.
    pub fn destination(&self) -> Option<&Address> {
        self.shipping_address
            .as_ref()
            .or(self.billing_address.as_ref())
    }

    /// Most recently created payment; ties go to the higher id.
    pub fn last_payment(&self) -> Option<&Payment> {
        self.payments.iter().max_by_key(|p| (p.created, p.id))
    }
}
