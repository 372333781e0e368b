//! PostgREST row types for the `products` table.

use serde::Deserialize;
use storekeep_core::LocalProductRecord;

/// Columns selected from `products`. Nullable text columns map to empty strings.
#[derive(Debug, Deserialize)]
pub struct ProductRow {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub polar_product_id: Option<String>,
    #[serde(default)]
    pub polar_price_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// PostgREST error body: `{ "message", "code", "details", "hint" }`.
#[derive(Debug, Deserialize)]
pub struct PostgrestError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ProductRow {
    #[must_use]
    pub fn into_record(self) -> LocalProductRecord {
        LocalProductRecord {
            id: self.id,
            title: self.title.unwrap_or_default(),
            handle: self.handle.unwrap_or_default(),
            external_product_id: non_blank(self.polar_product_id),
            external_price_id: non_blank(self.polar_price_id),
            status: self.status.unwrap_or_default(),
        }
    }
}

/// Empty-string ids were written by older sync scripts; treat them as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
