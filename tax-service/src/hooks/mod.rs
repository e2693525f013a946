//! Pricing and tax strategy the host calls through.
//!
//! The host asks for cart totals, order totals and tax lookups through
//! [`TaxHooks`] instead of its built-in implementation. Which strategy it gets
//! is decided once at startup by [`select_hooks`].

pub mod order_tax;
pub mod request;
pub mod taxjar;
pub mod untaxed;

use crate::config::Config;
use crate::error::HookError;
use crate::models::{
    Address, Cart, DiscountAmount, Money, Order, OrderLine, TaxRateTable, TaxedMoney, Variant,
};
use crate::services::TaxRateProvider;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

pub use order_tax::{build_order_tax_request, BasketLine, TaxableBasket};
pub use request::{LazyTaxes, RequestTaxes};
pub use taxjar::TaxJarHooks;
pub use untaxed::UntaxedHooks;

/// Discounted unit price of a variant, as the host's sale rules compute it.
pub trait VariantPricing: Send + Sync {
    fn price(&self, variant: &Variant) -> Money;
}

/// Pricing with no discounts applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasePricing;

impl VariantPricing for BasePricing {
    fn price(&self, variant: &Variant) -> Money {
        variant.base_price.clone()
    }
}

/// Host stock bookkeeping.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Fails with [`HookError::InsufficientStock`] when `quantity` is not available.
    async fn check_quantity(&self, variant: &Variant, quantity: u32) -> Result<(), HookError>;

    async fn allocate_stock(&self, variant: &Variant, quantity: u32) -> Result<(), HookError>;
}

#[async_trait]
pub trait TaxHooks: Send + Sync {
    /// Rates for a country, narrowed to a region where the provider has them.
    async fn taxes_for_country_region(
        &self,
        country: &str,
        region: Option<&str>,
    ) -> Result<Option<TaxRateTable>, HookError>;

    /// Rates for an address, or for the default country without one.
    async fn taxes_for_address(
        &self,
        address: Option<&Address>,
    ) -> Result<Option<TaxRateTable>, HookError>;

    /// Rates for a cart at checkout.
    async fn taxes_for_cart(
        &self,
        cart: &Cart,
        default_taxes: Option<TaxRateTable>,
    ) -> Result<Option<TaxRateTable>, HookError>;

    async fn cart_total(
        &self,
        cart: &Cart,
        pricing: &dyn VariantPricing,
    ) -> Result<TaxedMoney, HookError>;

    /// Recompute `order.total` from its lines, shipping and discount.
    async fn recalculate_order(&self, order: &mut Order) -> Result<(), HookError>;

    /// `(code, name)` pairs for the product form's tax rate field.
    async fn tax_rate_type_choices(&self) -> Result<Vec<(String, String)>, HookError>;

    async fn taxes_for_country(&self, country: &str) -> Result<Option<TaxRateTable>, HookError> {
        self.taxes_for_country_region(country, None).await
    }

    /// Re-price lines and shipping without line-level tax, then recalculate.
    async fn update_order_prices(
        &self,
        order: &mut Order,
        pricing: &dyn VariantPricing,
    ) -> Result<(), HookError> {
        for line in order.lines.iter_mut() {
            let price = line.variant.as_ref().map(|variant| pricing.price(variant));
            if let Some(price) = price {
                line.unit_price = TaxedMoney::untaxed(price);
                line.tax_rate = Decimal::ZERO;
            }
        }

        let shipping = order.shipping_method.as_ref().map(|m| m.price.clone());
        if let Some(shipping) = shipping {
            order.shipping_price = TaxedMoney::untaxed(shipping);
        }

        self.recalculate_order(order).await
    }

    /// Add `quantity` of `variant`, merging into an existing line.
    async fn add_variant_to_order(
        &self,
        order: &mut Order,
        variant: &Variant,
        quantity: u32,
        pricing: &dyn VariantPricing,
        inventory: &dyn Inventory,
    ) -> Result<(), HookError> {
        inventory.check_quantity(variant, quantity).await?;

        let existing = order
            .lines
            .iter_mut()
            .find(|line| line.variant.as_ref().is_some_and(|v| v.id == variant.id));
        match existing {
            Some(line) => {
                let current = line.quantity;
                line.quantity =
                    current
                        .checked_add(quantity)
                        .ok_or_else(|| HookError::QuantityOverflow {
                            sku: variant.sku.clone(),
                            current,
                            added: quantity,
                        })?;
            }
            None => order.lines.push(OrderLine::for_variant(
                variant,
                quantity,
                pricing.price(variant),
            )),
        }

        if variant.track_inventory {
            inventory.allocate_stock(variant, quantity).await?;
        }

        Ok(())
    }
}

/// Subtotal plus shipping minus the cart discount, without tax.
pub(crate) fn untaxed_cart_total(cart: &Cart, pricing: &dyn VariantPricing) -> TaxedMoney {
    cart.subtotal(pricing) + cart.shipping_price() - &cart.discount_amount
}

/// Line totals plus shipping, less the order discount.
///
/// The discount is capped at the gross total and written back to the order.
pub(crate) fn discounted_order_total(order: &mut Order) -> TaxedMoney {
    let total = order
        .lines
        .iter()
        .fold(order.shipping_price.clone(), |acc, line| acc + line.total());

    let discount = order.discount_amount.amount().min(total.gross.amount);
    order.discount_amount = DiscountAmount::Money(Money::new(discount, total.currency()));

    if discount.is_zero() {
        total
    } else {
        let discount = Money::new(discount, total.currency());
        total - &discount
    }
}

/// TaxJar hooks when an API key is configured, untaxed hooks otherwise.
pub fn select_hooks(config: &Config, provider: Arc<dyn TaxRateProvider>) -> Arc<dyn TaxHooks> {
    if config.taxjar_enabled() {
        Arc::new(TaxJarHooks::new(provider, config.pricing.clone()))
    } else {
        tracing::warn!("TaxJar API key not configured - prices will be calculated without tax");
        Arc::new(UntaxedHooks)
    }
}
