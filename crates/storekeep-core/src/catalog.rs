//! Catalog records shared by the adapters and the checks.
//!
//! Both external services are mapped into these shapes at the boundary, so
//! nothing downstream depends on either service's wire format.

use serde::{Deserialize, Serialize};

/// A product row from the storefront's own catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProductRecord {
    /// Row id in the local store (a UUID rendered as text).
    pub id: String,
    pub title: String,
    /// URL slug, e.g. `"bevel-tool-pro"`.
    pub handle: String,
    /// Id of the payments-platform product this row sells through, if linked.
    pub external_product_id: Option<String>,
    pub external_price_id: Option<String>,
    /// Free-form status label, e.g. `"active"` or `"draft"`.
    pub status: String,
}

/// A product as the payments platform knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: String,
    pub name: String,
    pub is_archived: bool,
    /// Prices in the order the platform returned them.
    pub prices: Vec<RemotePrice>,
}

impl RemoteProduct {
    /// First non-archived price, which the storefront treats as the product's price.
    #[must_use]
    pub fn primary_price(&self) -> Option<&RemotePrice> {
        self.prices.iter().find(|p| !p.is_archived)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePrice {
    pub id: String,
    /// Amount in minor currency units; absent for free and custom prices.
    pub amount: Option<i64>,
    /// ISO 4217 code as the platform reports it (usually lowercase).
    pub currency: Option<String>,
    pub is_archived: bool,
    pub kind: PriceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    Fixed,
    Free,
    /// Pay-what-you-want.
    Custom,
    Unknown(String),
}

impl PriceKind {
    /// Maps the platform's `amount_type` string. Unrecognized types are kept, not rejected.
    #[must_use]
    pub fn from_amount_type(raw: &str) -> Self {
        match raw {
            "fixed" => PriceKind::Fixed,
            "free" => PriceKind::Free,
            "custom" => PriceKind::Custom,
            other => PriceKind::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for PriceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceKind::Fixed => write!(f, "fixed"),
            PriceKind::Free => write!(f, "free"),
            PriceKind::Custom => write!(f, "custom"),
            PriceKind::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}
