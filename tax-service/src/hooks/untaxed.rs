//! Hooks used when no TaxJar API key is configured.

use super::{discounted_order_total, untaxed_cart_total, TaxHooks, VariantPricing};
use crate::error::HookError;
use crate::models::{Address, Cart, Order, TaxRateTable, TaxedMoney};
use async_trait::async_trait;

/// Prices everything at net, with no tax lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct UntaxedHooks;

#[async_trait]
impl TaxHooks for UntaxedHooks {
    async fn taxes_for_country_region(
        &self,
        _country: &str,
        _region: Option<&str>,
    ) -> Result<Option<TaxRateTable>, HookError> {
        Ok(None)
    }

    async fn taxes_for_address(
        &self,
        _address: Option<&Address>,
    ) -> Result<Option<TaxRateTable>, HookError> {
        Ok(None)
    }

    async fn taxes_for_cart(
        &self,
        _cart: &Cart,
        _default_taxes: Option<TaxRateTable>,
    ) -> Result<Option<TaxRateTable>, HookError> {
        Ok(None)
    }

    async fn cart_total(
        &self,
        cart: &Cart,
        pricing: &dyn VariantPricing,
    ) -> Result<TaxedMoney, HookError> {
        Ok(untaxed_cart_total(cart, pricing))
    }

    async fn recalculate_order(&self, order: &mut Order) -> Result<(), HookError> {
        order.total = discounted_order_total(order);
        tracing::debug!(
            order_id = order.id,
            total = %order.total.gross.amount,
            "Order recalculated without tax"
        );
        Ok(())
    }

    async fn tax_rate_type_choices(&self) -> Result<Vec<(String, String)>, HookError> {
        Ok(vec![(String::new(), String::new())])
    }
}
