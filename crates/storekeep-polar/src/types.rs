//! Polar API response types.
//!
//! These model the snake_case JSON of the `/v1/products/` list endpoint and
//! never leave this crate unmapped; [`ProductItem::into_remote`] converts
//! them into the shared catalog shapes.

use serde::Deserialize;
use storekeep_core::{PriceKind, RemotePrice, RemoteProduct};

/// One page of a Polar list endpoint: `{ "items": [...], "pagination": {...} }`.
#[derive(Debug, Deserialize)]
pub struct ListResource<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub total_count: u64,
    /// Highest valid page number; 0 when the listing is empty.
    pub max_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct ProductItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub prices: Vec<PriceItem>,
}

#[derive(Debug, Deserialize)]
pub struct PriceItem {
    pub id: String,
    /// `"fixed"`, `"free"`, `"custom"`, or a newer type.
    #[serde(default)]
    pub amount_type: Option<String>,
    /// Minor units; present for fixed prices.
    #[serde(default)]
    pub price_amount: Option<i64>,
    #[serde(default)]
    pub price_currency: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
}

impl ProductItem {
    #[must_use]
    pub fn into_remote(self) -> RemoteProduct {
        RemoteProduct {
            id: self.id,
            name: self.name,
            is_archived: self.is_archived,
            prices: self.prices.into_iter().map(PriceItem::into_remote).collect(),
        }
    }
}

impl PriceItem {
    #[must_use]
    pub fn into_remote(self) -> RemotePrice {
        // Older payloads omit amount_type; an amount implies a fixed price.
        let kind = match (self.amount_type.as_deref(), self.price_amount) {
            (Some(raw), _) => PriceKind::from_amount_type(raw),
            (None, Some(_)) => PriceKind::Fixed,
            (None, None) => PriceKind::Unknown("unspecified".to_string()),
        };
        RemotePrice {
            id: self.id,
            amount: self.price_amount,
            currency: self.price_currency,
            is_archived: self.is_archived,
            kind,
        }
    }
}
