//! HTTP client for the Polar REST API.
//!
//! Wraps `reqwest` with token handling, page iteration and typed response
//! deserialization. Only the product listing used by the catalog checks is
//! exposed.

use std::time::Duration;

use reqwest::{Client, Url};
use storekeep_core::{PolarConfig, RemoteProduct};

use crate::error::PolarError;
use crate::types::{ListResource, ProductItem};

const DEFAULT_BASE_URL: &str = "https://api.polar.sh/";

/// Page size requested from list endpoints (the API maximum).
const PAGE_LIMIT: u32 = 100;

/// Stops a misbehaving `max_page` from looping forever.
const MAX_PAGES: u32 = 100;

/// Response bodies echoed into errors are cut to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Both partitions of an organization's product catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogPartitions {
    pub active: Vec<RemoteProduct>,
    pub archived: Vec<RemoteProduct>,
}

/// Client for the Polar REST API.
///
/// Use [`PolarClient::new`] for production or [`PolarClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PolarClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl PolarClient {
    /// Creates a new client pointed at the production Polar API.
    ///
    /// # Errors
    ///
    /// Returns [`PolarError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64) -> Result<Self, PolarError> {
        Self::with_base_url(access_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`PolarClient::with_base_url`].
    pub fn from_config(config: &PolarConfig, timeout_secs: u64) -> Result<Self, PolarError> {
        Self::with_base_url(&config.access_token, timeout_secs, &config.base_url)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PolarError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PolarError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PolarError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("storekeep/0.1 (catalog-checks)")
            .build()?;

        // Exactly one trailing slash so relative joins append instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PolarError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
        })
    }

    /// Lists every product of an organization in one archived partition.
    ///
    /// Pages through `/v1/products/` until `pagination.max_page` is reached.
    /// All-or-nothing: a failing page discards the pages already fetched.
    ///
    /// # Errors
    ///
    /// - [`PolarError::UnexpectedStatus`] on a non-2xx response.
    /// - [`PolarError::Http`] on network failure.
    /// - [`PolarError::Deserialize`] if a page does not match the expected shape.
    /// - [`PolarError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn list_products(
        &self,
        organization_id: &str,
        is_archived: bool,
    ) -> Result<Vec<RemoteProduct>, PolarError> {
        let mut products = Vec::new();
        let mut page = 1u32;

        loop {
            if page > MAX_PAGES {
                return Err(PolarError::PaginationLimit {
                    max_pages: MAX_PAGES,
                });
            }

            let url = self.products_url(organization_id, is_archived, page)?;
            let body = self.request_text(&url).await?;
            let listing: ListResource<ProductItem> =
                serde_json::from_str(&body).map_err(|e| PolarError::Deserialize {
                    context: format!("products(page={page}, is_archived={is_archived})"),
                    source: e,
                })?;

            tracing::debug!(
                page,
                max_page = listing.pagination.max_page,
                items = listing.items.len(),
                is_archived,
                "fetched Polar product page"
            );

            products.extend(listing.items.into_iter().map(ProductItem::into_remote));

            if page >= listing.pagination.max_page {
                break;
            }
            page += 1;
        }

        Ok(products)
    }

    /// Fetches the active and archived partitions concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error from either [`Self::list_products`] call.
    pub async fn fetch_catalog(
        &self,
        organization_id: &str,
    ) -> Result<CatalogPartitions, PolarError> {
        let (active, archived) = tokio::try_join!(
            self.list_products(organization_id, false),
            self.list_products(organization_id, true),
        )?;
        tracing::info!(
            active = active.len(),
            archived = archived.len(),
            "fetched Polar catalog"
        );
        Ok(CatalogPartitions { active, archived })
    }

    fn products_url(
        &self,
        organization_id: &str,
        is_archived: bool,
        page: u32,
    ) -> Result<Url, PolarError> {
        let mut url = self
            .base_url
            .join("v1/products/")
            .map_err(|e| PolarError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("organization_id", organization_id)
            .append_pair("is_archived", if is_archived { "true" } else { "false" })
            .append_pair("page", &page.to_string())
            .append_pair("limit", &PAGE_LIMIT.to_string());
        Ok(url)
    }

    /// Sends an authenticated GET and returns the body of a 2xx response.
    async fn request_text(&self, url: &Url) -> Result<String, PolarError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PolarError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        Ok(body)
    }
}
