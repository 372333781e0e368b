//! Storefront price table derived from the remote catalog.

use std::collections::BTreeMap;

use serde::Serialize;
use storekeep_core::{PriceKind, RemoteProduct};

const DEFAULT_CURRENCY: &str = "USD";

/// The displayable price of one active remote product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    pub product_id: String,
    pub price_id: String,
    pub name: String,
    /// Minor currency units.
    pub amount: i64,
    /// As the platform reports it (e.g. `usd`); `USD` when absent.
    pub currency: String,
    /// `"FREE"` or `"$D.CC"`.
    pub formatted: String,
}

/// Build the price table keyed by remote product id.
///
/// Archived products, products without an active price, and non-free prices
/// without an amount are left out.
pub fn price_table<'a, I>(products: I) -> BTreeMap<String, PriceSummary>
where
    I: IntoIterator<Item = &'a RemoteProduct>,
{
    products
        .into_iter()
        .filter(|p| !p.is_archived)
        .filter_map(|product| {
            let price = product.primary_price()?;
            let (amount, currency, formatted) = match (&price.kind, price.amount) {
                (PriceKind::Free, _) => (0, DEFAULT_CURRENCY.to_string(), "FREE".to_string()),
                (_, Some(amount)) => (
                    amount,
                    price
                        .currency
                        .clone()
                        .filter(|c| !c.is_empty())
                        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                    format_minor_units(amount),
                ),
                (_, None) => return None,
            };
            Some((
                product.id.clone(),
                PriceSummary {
                    product_id: product.id.clone(),
                    price_id: price.id.clone(),
                    name: product.name.clone(),
                    amount,
                    currency,
                    formatted,
                },
            ))
        })
        .collect()
}

/// Render minor units as `$D.CC`.
#[must_use]
pub fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}
