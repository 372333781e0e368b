use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storekeep_recon::{price_table, PriceSummary};

use super::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PriceEntry {
    product_id: String,
    price_id: String,
    /// Major currency units, e.g. `14.99`.
    amount: f64,
    currency: String,
    formatted: String,
    name: String,
}

impl From<PriceSummary> for PriceEntry {
    fn from(summary: PriceSummary) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let amount = summary.amount as f64 / 100.0;
        Self {
            product_id: summary.product_id,
            price_id: summary.price_id,
            amount,
            currency: summary.currency,
            formatted: summary.formatted,
            name: summary.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PricesResponse {
    prices: BTreeMap<String, PriceEntry>,
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl PricesResponse {
    fn failure(message: String) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                prices: BTreeMap::new(),
                error: Some(message),
                timestamp: Utc::now(),
            }),
        )
    }
}

/// Current price of every active Polar product, keyed by product id.
pub(super) async fn polar_prices(
    State(state): State<AppState>,
) -> (StatusCode, Json<PricesResponse>) {
    let Some(polar) = state.polar.as_ref() else {
        tracing::error!("POLAR_API_TOKEN / POLAR_ORG_ID not configured");
        return PricesResponse::failure(
            "Server configuration error: Polar credentials not set".to_string(),
        );
    };

    let products = match polar
        .client
        .list_products(&polar.organization_id, false)
        .await
    {
        Ok(products) => products,
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch Polar prices");
            return PricesResponse::failure("Failed to fetch product prices".to_string());
        }
    };

    let prices: BTreeMap<String, PriceEntry> = price_table(&products)
        .into_iter()
        .map(|(id, summary)| (id, PriceEntry::from(summary)))
        .collect();
    tracing::info!(count = prices.len(), "fetched Polar prices");

    (
        StatusCode::OK,
        Json(PricesResponse {
            prices,
            error: None,
            timestamp: Utc::now(),
        }),
    )
}
