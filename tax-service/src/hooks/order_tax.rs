//! Build TaxJar order tax requests from carts and orders.

use super::VariantPricing;
use crate::models::{
    Address, Cart, LineItem, Order, OrderTaxRequest, TaxDestination, TaxableAmount, TaxedMoney,
    DEFAULT_TAX_RATE_NAME,
};
use rust_decimal::Decimal;

/// One priced line of something TaxJar is asked to tax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketLine {
    pub id: String,
    pub quantity: u32,
    /// Undiscounted unit price.
    pub base_price: Decimal,
    /// Unit price after discounts.
    pub unit_price: Decimal,
    pub tax_rate: String,
}

impl BasketLine {
    fn to_line_item(&self) -> LineItem {
        let unit_discount = (self.base_price - self.unit_price).max(Decimal::ZERO);
        let product_tax_code = Some(self.tax_rate.trim())
            .filter(|code| !code.is_empty() && *code != DEFAULT_TAX_RATE_NAME)
            .map(str::to_string);

        LineItem {
            id: self.id.clone(),
            quantity: self.quantity,
            unit_price: self.base_price,
            product_tax_code,
            discount: unit_discount * Decimal::from(self.quantity),
        }
    }
}

/// A cart or order seen as lines, an address and a discount.
pub trait TaxableBasket {
    fn shipping_address(&self) -> Option<&Address>;

    fn basket_lines(&self, pricing: &dyn VariantPricing) -> Vec<BasketLine>;

    /// Gross sum of discounted lines.
    fn subtotal(&self, pricing: &dyn VariantPricing) -> TaxedMoney;

    fn discount(&self) -> Decimal;
}

impl TaxableBasket for Cart {
    fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    fn basket_lines(&self, pricing: &dyn VariantPricing) -> Vec<BasketLine> {
        self.lines
            .iter()
            .map(|line| BasketLine {
                id: line.variant.id.to_string(),
                quantity: line.quantity,
                base_price: line.variant.base_price.amount,
                unit_price: pricing.price(&line.variant).amount,
                tax_rate: line.variant.tax_rate.clone(),
            })
            .collect()
    }

    fn subtotal(&self, pricing: &dyn VariantPricing) -> TaxedMoney {
        Cart::subtotal(self, pricing)
    }

    fn discount(&self) -> Decimal {
        self.discount_amount.amount
    }
}

/// Order lines carry their own unit price; `pricing` is not consulted.
impl TaxableBasket for Order {
    fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    fn basket_lines(&self, _pricing: &dyn VariantPricing) -> Vec<BasketLine> {
        self.lines
            .iter()
            .map(|line| match &line.variant {
                Some(variant) => BasketLine {
                    id: variant.id.to_string(),
                    quantity: line.quantity,
                    base_price: variant.base_price.amount,
                    unit_price: line.unit_price.net.amount,
                    tax_rate: variant.tax_rate.clone(),
                },
                None => BasketLine {
                    id: line.product_sku.clone(),
                    quantity: line.quantity,
                    base_price: line.unit_price.net.amount,
                    unit_price: line.unit_price.net.amount,
                    tax_rate: String::new(),
                },
            })
            .collect()
    }

    fn subtotal(&self, _pricing: &dyn VariantPricing) -> TaxedMoney {
        self.lines
            .iter()
            .fold(TaxedMoney::zero(self.currency()), |acc, line| acc + line.total())
    }

    fn discount(&self) -> Decimal {
        self.discount_amount.amount()
    }
}

/// Request for the tax on `basket` shipped for `shipping`.
///
/// `None` when the basket has no shipping address to tax against.
pub fn build_order_tax_request(
    basket: &dyn TaxableBasket,
    shipping: &TaxedMoney,
    pricing: &dyn VariantPricing,
    use_line_items: bool,
) -> Option<OrderTaxRequest> {
    let address = basket.shipping_address()?;

    let taxable = if use_line_items {
        let lines = basket.basket_lines(pricing);
        if lines.is_empty() {
            TaxableAmount::Amount(Decimal::ZERO)
        } else {
            TaxableAmount::LineItems(lines.iter().map(BasketLine::to_line_item).collect())
        }
    } else {
        TaxableAmount::Amount(basket.subtotal(pricing).gross.amount - basket.discount())
    };

    Some(OrderTaxRequest {
        destination: TaxDestination {
            country: address.country.clone(),
            zip: address.postal_code().map(str::to_string),
            state: address.region().map(str::to_string),
            city: address.city().map(str::to_string),
            street: address.street().map(str::to_string),
        },
        shipping: shipping.gross.amount,
        taxable,
    })
}
