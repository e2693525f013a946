//! Hooks backed by TaxJar rates and order tax.

use super::order_tax::{build_order_tax_request, TaxableBasket};
use super::{discounted_order_total, untaxed_cart_total, BasePricing, TaxHooks, VariantPricing};
use crate::config::PricingConfig;
use crate::error::HookError;
use crate::models::{Address, Cart, Order, TaxRateTable, TaxedMoney};
use crate::services::TaxRateProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Countries TaxJar publishes region-level summary rates for.
const REGIONAL_COUNTRIES: [&str; 2] = ["US", "CA"];

pub struct TaxJarHooks {
    provider: Arc<dyn TaxRateProvider>,
    pricing: PricingConfig,
    rate_types: OnceCell<Vec<(String, String)>>,
}

impl TaxJarHooks {
    pub fn new(provider: Arc<dyn TaxRateProvider>, pricing: PricingConfig) -> Self {
        Self {
            provider,
            pricing,
            rate_types: OnceCell::new(),
        }
    }

    /// Net `total` with TaxJar's tax for `basket` added on top.
    async fn tax_total(
        &self,
        basket: &(dyn TaxableBasket + Sync),
        shipping: &TaxedMoney,
        pricing: &dyn VariantPricing,
        total: TaxedMoney,
    ) -> Result<TaxedMoney, HookError> {
        let Some(request) =
            build_order_tax_request(basket, shipping, pricing, self.pricing.use_line_items)
        else {
            return Ok(total);
        };

        let tax = self.provider.tax_for_order(&request).await?;
        Ok(tax.apply(&total))
    }

    async fn rate_types(&self) -> Result<&[(String, String)], HookError> {
        let rate_types = self
            .rate_types
            .get_or_try_init(|| async {
                let categories = self.provider.categories().await?;
                Ok::<_, HookError>(
                    categories
                        .into_iter()
                        .map(|c| (c.product_tax_code, c.name))
                        .collect(),
                )
            })
            .await?;
        Ok(rate_types.as_slice())
    }
}

#[async_trait]
impl TaxHooks for TaxJarHooks {
    async fn taxes_for_country_region(
        &self,
        country: &str,
        region: Option<&str>,
    ) -> Result<Option<TaxRateTable>, HookError> {
        let region = region.filter(|_| {
            REGIONAL_COUNTRIES
                .iter()
                .any(|code| code.eq_ignore_ascii_case(country))
        });

        let rates = self.provider.rates_for_region(country, region).await?;
        Ok(rates.map(|rates| TaxRateTable::standard(rates.average_rate.rate)))
    }

    async fn taxes_for_address(
        &self,
        address: Option<&Address>,
    ) -> Result<Option<TaxRateTable>, HookError> {
        match address {
            Some(address) => {
                self.taxes_for_country_region(&address.country, address.region())
                    .await
            }
            None => {
                self.taxes_for_country_region(&self.pricing.default_country, None)
                    .await
            }
        }
    }

    async fn taxes_for_cart(
        &self,
        cart: &Cart,
        default_taxes: Option<TaxRateTable>,
    ) -> Result<Option<TaxRateTable>, HookError> {
        match &cart.shipping_address {
            Some(address) => {
                self.taxes_for_country_region(&address.country, address.region())
                    .await
            }
            None => Ok(default_taxes),
        }
    }

    async fn cart_total(
        &self,
        cart: &Cart,
        pricing: &dyn VariantPricing,
    ) -> Result<TaxedMoney, HookError> {
        let total = untaxed_cart_total(cart, pricing);
        if cart.shipping_address.is_none() || cart.is_empty() {
            return Ok(total);
        }

        self.tax_total(cart, &cart.shipping_price(), pricing, total)
            .await
    }

    async fn recalculate_order(&self, order: &mut Order) -> Result<(), HookError> {
        let total = discounted_order_total(order);
        let total = self
            .tax_total(&*order, &order.shipping_price, &BasePricing, total)
            .await?;

        tracing::debug!(
            order_id = order.id,
            net = %total.net.amount,
            gross = %total.gross.amount,
            "Order recalculated with TaxJar tax"
        );
        order.total = total;
        Ok(())
    }

    async fn tax_rate_type_choices(&self) -> Result<Vec<(String, String)>, HookError> {
        let mut choices = vec![(String::new(), String::new())];
        choices.extend(self.rate_types().await?.iter().cloned());
        choices.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(choices)
    }
}
