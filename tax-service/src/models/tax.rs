//! Tax rates and order tax as returned by TaxJar.

use super::money::{Money, TaxedMoney};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name the host gives its default tax rate.
pub const DEFAULT_TAX_RATE_NAME: &str = "standard";

/// A flat rate applied to net prices, e.g. `0.0825` for 8.25%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub value: Decimal,
}

impl TaxRate {
    pub fn apply(&self, net: &Money) -> TaxedMoney {
        let tax = Money::new(net.amount * self.value, net.currency.clone()).round();
        TaxedMoney::new(net.clone(), net.clone() + tax)
    }
}

/// Rates keyed by tax rate name, as the host expects from a tax lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxRateTable(BTreeMap<String, TaxRate>);

impl TaxRateTable {
    /// Table with only the host's default rate.
    pub fn standard(rate: Decimal) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(DEFAULT_TAX_RATE_NAME.to_string(), TaxRate { value: rate });
        Self(rates)
    }

    pub fn get(&self, name: &str) -> Option<&TaxRate> {
        self.0.get(name)
    }

    pub fn standard_rate(&self) -> Option<&TaxRate> {
        self.get(DEFAULT_TAX_RATE_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateInfo {
    #[serde(default)]
    pub label: Option<String>,
    pub rate: Decimal,
}

/// Summary rates for one country or one of its regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRates {
    pub country_code: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub minimum_rate: RateInfo,
    pub average_rate: RateInfo,
}

/// Product tax category offered to merchants when classifying products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCategory {
    pub name: String,
    pub product_tax_code: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Where the goods ship to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxDestination {
    pub country: String,
    pub zip: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// `None` sends the line as generally taxable.
    pub product_tax_code: Option<String>,
    /// Discount for the whole line.
    pub discount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxableAmount {
    LineItems(Vec<LineItem>),
    Amount(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTaxRequest {
    pub destination: TaxDestination,
    pub shipping: Decimal,
    pub taxable: TaxableAmount,
}

/// Tax TaxJar computed for a whole order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTax {
    #[serde(default)]
    pub order_total_amount: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    #[serde(default)]
    pub taxable_amount: Decimal,
    pub amount_to_collect: Decimal,
    #[serde(default)]
    pub rate: Decimal,
    #[serde(default)]
    pub has_nexus: bool,
    #[serde(default)]
    pub freight_taxable: bool,
    #[serde(default)]
    pub tax_source: Option<String>,
}

impl OrderTax {
    /// Keep the net total and add the collectable tax on top of it.
    pub fn apply(&self, total: &TaxedMoney) -> TaxedMoney {
        let tax = Money::new(self.amount_to_collect, total.net.currency.clone());
        TaxedMoney::new(total.net.clone(), total.net.clone() + tax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_applies_to_net_and_rounds() {
        let rate = TaxRate {
            value: Decimal::new(825, 4),
        };
        let price = rate.apply(&Money::new(Decimal::new(1999, 2), "USD"));

        assert_eq!(price.net.amount, Decimal::new(1999, 2));
        // 19.99 * 0.0825 = 1.649175
        assert_eq!(price.gross.amount, Decimal::new(2164, 2));
    }

    #[test]
    fn test_order_tax_adds_amount_to_collect_to_net() {
        let tax = OrderTax {
            order_total_amount: Decimal::from(110),
            shipping: Decimal::from(10),
            taxable_amount: Decimal::from(100),
            amount_to_collect: Decimal::new(825, 2),
            rate: Decimal::new(825, 4),
            has_nexus: true,
            freight_taxable: false,
            tax_source: Some("destination".to_string()),
        };
        let total = TaxedMoney::untaxed(Money::new(Decimal::from(110), "USD"));

        let taxed = tax.apply(&total);
        assert_eq!(taxed.net.amount, Decimal::from(110));
        assert_eq!(taxed.gross.amount, Decimal::new(11825, 2));
    }

    #[test]
    fn test_standard_table_uses_default_rate_name() {
        let table = TaxRateTable::standard(Decimal::new(6, 2));
        assert_eq!(table.standard_rate().map(|r| r.value), Some(Decimal::new(6, 2)));
        assert!(table.get("books").is_none());
    }
}
