//! Client for the storefront's `products` table behind the Supabase
//! PostgREST gateway.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::json;
use storekeep_core::{LocalProductRecord, SupabaseConfig};

use crate::error::SupabaseError;
use crate::types::{PostgrestError, ProductRow};

const PRODUCT_COLUMNS: &str = "id,title,handle,polar_product_id,polar_price_id,status";

/// Client for the storefront's Supabase project.
///
/// Sends the key both as `apikey` (gateway routing) and as a bearer token
/// (row-level security role).
pub struct SupabaseClient {
    client: Client,
    key: String,
    rest_url: Url,
}

impl SupabaseClient {
    /// Creates a client for the project at `project_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`SupabaseError::InvalidBaseUrl`] if the URL does not parse.
    pub fn new(project_url: &str, key: &str, timeout_secs: u64) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("storekeep/0.1 (catalog-checks)")
            .build()?;

        let normalised = format!("{}/rest/v1/", project_url.trim_end_matches('/'));
        let rest_url = Url::parse(&normalised).map_err(|e| SupabaseError::InvalidBaseUrl {
            url: project_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            key: key.to_owned(),
            rest_url,
        })
    }

    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`SupabaseClient::new`].
    pub fn from_config(config: &SupabaseConfig, timeout_secs: u64) -> Result<Self, SupabaseError> {
        Self::new(&config.url, &config.key, timeout_secs)
    }

    /// Lists every product row, ordered by title.
    ///
    /// # Errors
    ///
    /// - [`SupabaseError::Api`] on a non-2xx response.
    /// - [`SupabaseError::Http`] on network failure.
    /// - [`SupabaseError::Deserialize`] if the rows do not match the expected shape.
    pub async fn list_products(&self) -> Result<Vec<LocalProductRecord>, SupabaseError> {
        let url = self.products_url()?;
        let response = self
            .client
            .get(url.clone())
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body));
        }

        let rows: Vec<ProductRow> =
            serde_json::from_str(&body).map_err(|e| SupabaseError::Deserialize {
                context: "products".to_string(),
                source: e,
            })?;
        tracing::info!(count = rows.len(), "fetched Supabase products");

        Ok(rows.into_iter().map(ProductRow::into_record).collect())
    }

    /// Points the product row `record_id` at a Polar product and price.
    ///
    /// # Errors
    ///
    /// - [`SupabaseError::RowNotFound`] if no row has that id.
    /// - [`SupabaseError::Api`] on a non-2xx response.
    /// - [`SupabaseError::Http`] on network failure.
    pub async fn update_product_mapping(
        &self,
        record_id: &str,
        polar_product_id: &str,
        polar_price_id: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{record_id}"));

        let response = self
            .client
            .patch(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=representation")
            .json(&json!({
                "polar_product_id": polar_product_id,
                "polar_price_id": polar_price_id,
                "updated_at": Utc::now().to_rfc3339(),
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body));
        }

        let updated: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| SupabaseError::Deserialize {
                context: "product update".to_string(),
                source: e,
            })?;
        if updated.is_empty() {
            return Err(SupabaseError::RowNotFound {
                id: record_id.to_string(),
            });
        }
        tracing::debug!(record_id, polar_product_id, "updated product mapping");
        Ok(())
    }

    fn table_url(&self) -> Result<Url, SupabaseError> {
        self.rest_url
            .join("products")
            .map_err(|e| SupabaseError::InvalidBaseUrl {
                url: self.rest_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn products_url(&self) -> Result<Url, SupabaseError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", PRODUCT_COLUMNS)
            .append_pair("order", "title.asc");
        Ok(url)
    }

    fn api_error(status: u16, body: &str) -> SupabaseError {
        let message = match serde_json::from_str::<PostgrestError>(body) {
            Ok(err) => {
                let mut message = err.message;
                if let Some(code) = err.code {
                    message = format!("{message} (code {code})");
                }
                if let Some(hint) = err.hint {
                    message = format!("{message}; hint: {hint}");
                }
                message
            }
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.chars().take(500).collect(),
        };
        SupabaseError::Api { status, message }
    }
}
