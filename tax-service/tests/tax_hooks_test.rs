mod common;

use async_trait::async_trait;
use common::{san_francisco, settled_order, usd, variant, FlatTax};
use rust_decimal::Decimal;
use secrecy::Secret;
use std::sync::{Arc, Mutex};
use tax_service::config::{Config, PricingConfig};
use tax_service::error::HookError;
use tax_service::hooks::{
    select_hooks, BasePricing, Inventory, TaxHooks, TaxJarHooks, UntaxedHooks, VariantPricing,
};
use tax_service::models::{
    Cart, CartLine, DiscountAmount, Money, OrderLine, ShippingMethod, TaxRateTable, TaxableAmount,
    TaxedMoney, Variant,
};

/// Every variant sells for 2 off its base price.
struct TwoOff;

impl VariantPricing for TwoOff {
    fn price(&self, variant: &Variant) -> Money {
        Money::new(
            variant.base_price.amount - Decimal::from(2),
            variant.base_price.currency.clone(),
        )
    }
}

#[derive(Default)]
struct StockRoom {
    available: u32,
    allocated: Mutex<Vec<(i64, u32)>>,
}

#[async_trait]
impl Inventory for StockRoom {
    async fn check_quantity(&self, variant: &Variant, quantity: u32) -> Result<(), HookError> {
        if quantity > self.available {
            return Err(HookError::InsufficientStock {
                sku: variant.sku.clone(),
                requested: quantity,
            });
        }
        Ok(())
    }

    async fn allocate_stock(&self, variant: &Variant, quantity: u32) -> Result<(), HookError> {
        self.allocated.lock().unwrap().push((variant.id, quantity));
        Ok(())
    }
}

fn cart() -> Cart {
    Cart {
        currency: "USD".to_string(),
        lines: vec![
            CartLine {
                variant: variant(1, 20, "20010"),
                quantity: 2,
            },
            CartLine {
                variant: variant(2, 12, "standard"),
                quantity: 1,
            },
        ],
        shipping_address: Some(san_francisco()),
        shipping_method: Some(ShippingMethod {
            name: "Ground".to_string(),
            price: usd(10),
        }),
        discount_amount: usd(4),
    }
}

fn taxjar(tax: Arc<FlatTax>) -> TaxJarHooks {
    TaxJarHooks::new(tax, PricingConfig::default())
}

#[tokio::test]
async fn cart_total_adds_remote_tax_to_net() {
    let tax = Arc::new(FlatTax::new(Decimal::new(375, 2)));
    let hooks = taxjar(tax.clone());

    let total = hooks
        .cart_total(&cart(), &TwoOff)
        .await
        .expect("Failed to total cart");

    // (18 * 2 + 10) + 10 - 4
    assert_eq!(total.net.amount, Decimal::from(52));
    assert_eq!(total.gross.amount, Decimal::new(5575, 2));

    let requests = tax.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].shipping, Decimal::from(10));
    let TaxableAmount::LineItems(items) = &requests[0].taxable else {
        panic!("expected line items");
    };
    assert_eq!(items[0].unit_price, Decimal::from(20));
    assert_eq!(items[0].discount, Decimal::from(4));
    assert_eq!(items[1].product_tax_code, None);
}

#[tokio::test]
async fn cart_total_without_address_stays_untaxed() {
    let tax = Arc::new(FlatTax::new(Decimal::new(375, 2)));
    let hooks = taxjar(tax.clone());
    let mut cart = cart();
    cart.shipping_address = None;

    let total = hooks
        .cart_total(&cart, &BasePricing)
        .await
        .expect("Failed to total cart");

    assert_eq!(total, TaxedMoney::untaxed(usd(58)));
    assert!(tax.requests().is_empty());
}

#[tokio::test]
async fn aggregate_amount_is_sent_when_line_items_are_off() {
    let tax = Arc::new(FlatTax::new(Decimal::ONE));
    let pricing = PricingConfig {
        use_line_items: false,
        ..PricingConfig::default()
    };
    let hooks = TaxJarHooks::new(tax.clone(), pricing);

    hooks
        .cart_total(&cart(), &TwoOff)
        .await
        .expect("Failed to total cart");

    assert_eq!(
        tax.requests()[0].taxable,
        TaxableAmount::Amount(Decimal::from(42))
    );
}

#[tokio::test]
async fn recalculate_order_caps_discount_and_applies_tax() {
    let tax = Arc::new(FlatTax::new(Decimal::from(3)));
    let hooks = taxjar(tax.clone());
    let mut order = settled_order();
    order.lines = vec![OrderLine::for_variant(&variant(1, 20, ""), 2, usd(20))];
    order.discount_amount = DiscountAmount::Bare(Decimal::from(500));

    hooks
        .recalculate_order(&mut order)
        .await
        .expect("Failed to recalculate order");

    // lines 40 + shipping 10, discount capped at 50
    assert_eq!(order.discount_amount.amount(), Decimal::from(50));
    assert_eq!(order.total.net.amount, Decimal::ZERO);
    assert_eq!(order.total.gross.amount, Decimal::from(3));
    assert_eq!(tax.requests().len(), 1);
}

#[tokio::test]
async fn recalculate_order_without_shipping_address_keeps_untaxed_total() {
    let tax = Arc::new(FlatTax::new(Decimal::from(3)));
    let hooks = taxjar(tax.clone());
    let mut order = settled_order();
    order.shipping_address = None;
    order.lines = vec![OrderLine::for_variant(&variant(1, 20, ""), 2, usd(20))];
    order.discount_amount = DiscountAmount::Bare(Decimal::from(5));

    hooks
        .recalculate_order(&mut order)
        .await
        .expect("Failed to recalculate order");

    assert_eq!(order.total, TaxedMoney::untaxed(usd(45)));
    assert!(tax.requests().is_empty());
}

#[tokio::test]
async fn update_order_prices_strips_line_tax() {
    let hooks = UntaxedHooks;
    let mut order = settled_order();
    let mut line = OrderLine::for_variant(&variant(1, 20, ""), 1, usd(20));
    line.unit_price = TaxedMoney::new(usd(20), usd(22));
    line.tax_rate = Decimal::new(10, 2);
    order.lines = vec![line];
    order.shipping_method = Some(ShippingMethod {
        name: "Express".to_string(),
        price: usd(15),
    });
    order.discount_amount = DiscountAmount::default();

    hooks
        .update_order_prices(&mut order, &TwoOff)
        .await
        .expect("Failed to update prices");

    assert_eq!(order.lines[0].unit_price, TaxedMoney::untaxed(usd(18)));
    assert_eq!(order.lines[0].tax_rate, Decimal::ZERO);
    assert_eq!(order.shipping_price, TaxedMoney::untaxed(usd(15)));
    assert_eq!(order.total, TaxedMoney::untaxed(usd(33)));
}

#[tokio::test]
async fn add_variant_merges_into_existing_line() {
    let hooks = UntaxedHooks;
    let stock = StockRoom {
        available: 10,
        ..StockRoom::default()
    };
    let mut tracked = variant(3, 9, "");
    tracked.track_inventory = true;
    let mut order = settled_order();

    hooks
        .add_variant_to_order(&mut order, &tracked, 2, &BasePricing, &stock)
        .await
        .expect("Failed to add variant");
    hooks
        .add_variant_to_order(&mut order, &tracked, 3, &BasePricing, &stock)
        .await
        .expect("Failed to add variant");

    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].quantity, 5);
    assert_eq!(order.lines[0].product_sku, "SKU-3");
    assert_eq!(order.lines[0].unit_price, TaxedMoney::untaxed(usd(9)));
    assert_eq!(*stock.allocated.lock().unwrap(), vec![(3, 2), (3, 3)]);
}

#[tokio::test]
async fn add_variant_fails_on_insufficient_stock() {
    let hooks = UntaxedHooks;
    let stock = StockRoom::default();
    let mut order = settled_order();

    let err = hooks
        .add_variant_to_order(&mut order, &variant(3, 9, ""), 1, &BasePricing, &stock)
        .await
        .unwrap_err();

    assert!(matches!(err, HookError::InsufficientStock { requested: 1, .. }));
    assert!(order.lines.is_empty());
}

#[tokio::test]
async fn add_variant_rejects_quantity_overflow() {
    let hooks = UntaxedHooks;
    let stock = StockRoom {
        available: u32::MAX,
        ..StockRoom::default()
    };
    let item = variant(3, 9, "");
    let mut order = settled_order();

    hooks
        .add_variant_to_order(&mut order, &item, u32::MAX, &BasePricing, &stock)
        .await
        .expect("Failed to add variant");
    let err = hooks
        .add_variant_to_order(&mut order, &item, 1, &BasePricing, &stock)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HookError::QuantityOverflow {
            current: u32::MAX,
            added: 1,
            ..
        }
    ));
    assert_eq!(order.lines[0].quantity, u32::MAX);
}

#[tokio::test]
async fn untaxed_hooks_return_no_taxes() {
    let hooks = UntaxedHooks;

    assert!(hooks.taxes_for_country("US").await.unwrap().is_none());
    assert!(hooks.taxes_for_cart(&cart(), None).await.unwrap().is_none());
    assert_eq!(
        hooks.tax_rate_type_choices().await.unwrap(),
        vec![(String::new(), String::new())]
    );
}

#[tokio::test]
async fn taxes_for_cart_falls_back_to_default_taxes() {
    let hooks = taxjar(Arc::new(FlatTax::new(Decimal::ZERO)));
    let mut cart = cart();
    cart.shipping_address = None;
    let defaults = TaxRateTable::standard(Decimal::new(5, 2));

    let taxes = hooks
        .taxes_for_cart(&cart, Some(defaults.clone()))
        .await
        .unwrap();

    assert_eq!(taxes, Some(defaults));
}

#[tokio::test]
async fn hooks_follow_api_key_presence() {
    let provider = Arc::new(FlatTax::new(Decimal::ZERO));

    let untaxed = select_hooks(&Config::default(), provider.clone());
    assert!(untaxed.taxes_for_country("US").await.unwrap().is_none());

    let mut config = Config::default();
    config.taxjar.api_key = Secret::new("test-key".to_string());
    let taxed = select_hooks(&config, provider);
    let table = taxed
        .taxes_for_country("US")
        .await
        .unwrap()
        .expect("expected US rates");
    assert_eq!(
        table.standard_rate().map(|r| r.value),
        Some(Decimal::new(8, 2))
    );
}
