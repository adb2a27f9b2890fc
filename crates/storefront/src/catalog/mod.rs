//! Product catalog: remote source client and the pure query engine.
//!
//! [`CatalogClient`] talks to the Shopify Storefront API with hand-written
//! GraphQL documents over `reqwest` and caches responses with `moka`
//! (5-minute TTL). Products are read fresh on every catalog load and never
//! mutated locally.
//!
//! # Example
//!
//! ```rust,ignore
//! use zarista_storefront::catalog::{CatalogClient, query::CatalogQuery};
//!
//! let client = CatalogClient::new(&config.shopify);
//! let products = client.fetch_products(20).await?;
//! let visible = query::apply(&products, &CatalogQuery::default());
//! ```

pub mod query;
pub mod types;
mod wire;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use types::Product;
use wire::{GraphQlResponse, ProductByHandleData, ProductsData, convert_product};

/// Errors that can occur when loading the catalog.
///
/// All variants surface to the UI as a "catalog unavailable" condition;
/// retrying is the caller's decision.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog source.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products { limit: u32 },
    Product(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
}

const PRODUCTS_QUERY: &str = r"
query Products($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        handle
        title
        description
        productType
        images(first: 10) {
          edges { node { url altText } }
        }
        variants(first: 50) {
          edges {
            node {
              id
              title
              availableForSale
              price { amount currencyCode }
              selectedOptions { name value }
            }
          }
        }
      }
    }
  }
}
";

const PRODUCT_BY_HANDLE_QUERY: &str = r"
query ProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    handle
    title
    description
    productType
    images(first: 10) {
      edges { node { url altText } }
    }
    variants(first: 50) {
      edges {
        node {
          id
          title
          availableForSale
          price { amount currencyCode }
          selectedOptions { name value }
        }
      }
    }
  }
}
";

/// Client for the product catalog source.
///
/// Cheaply cloneable; responses are cached for 5 minutes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token: config.storefront_public_token.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL query against the catalog endpoint.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T, CatalogError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Storefront-Access-Token", &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog source returned non-success status"
            );
            return Err(CatalogError::GraphQl(vec![format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )]));
        }

        let envelope: GraphQlResponse<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse catalog GraphQL response"
                );
                return Err(CatalogError::Parse(e));
            }
        };

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            return Err(CatalogError::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        envelope
            .data
            .ok_or_else(|| CatalogError::GraphQl(vec!["response carried no data".to_string()]))
    }

    /// Fetch up to `limit` products in the catalog source's order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the catalog source is unreachable or
    /// rejects the query.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, limit: u32) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Products { limit };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!(limit, "products served from cache");
            return Ok(products);
        }

        let data: ProductsData = self
            .execute(PRODUCTS_QUERY, serde_json::json!({ "first": limit }))
            .await?;

        let products: Vec<Product> = data
            .products
            .edges
            .into_iter()
            .map(|edge| convert_product(edge.node))
            .collect();

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch a single product by its URL handle.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product carries the handle,
    /// or another [`CatalogError`] if the catalog source fails.
    #[instrument(skip(self))]
    pub async fn product_by_handle(&self, handle: &str) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(handle.to_owned());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!(handle, "product served from cache");
            return Ok(*product);
        }

        let data: ProductByHandleData = self
            .execute(
                PRODUCT_BY_HANDLE_QUERY,
                serde_json::json!({ "handle": handle }),
            )
            .await?;

        let product = data
            .product_by_handle
            .map(convert_product)
            .ok_or_else(|| CatalogError::NotFound(handle.to_owned()))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("gold-ring".to_string());
        assert_eq!(err.to_string(), "Not found: gold-ring");

        let err = CatalogError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = CatalogError::GraphQl(vec![
            "Field not found".to_string(),
            "Invalid ID".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }
}
