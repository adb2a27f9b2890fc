//! Supabase-backed favorites store.
//!
//! Talks to the `favorites` table through PostgREST: filters are query
//! parameters (`user_id=eq.<id>`), auth is the anon key as both `apikey`
//! and bearer token, and inserts ask for the created row back with
//! `Prefer: return=representation`.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{Favorite, FavoritesStore, FavoritesStoreError, NewFavorite};
use crate::config::SupabaseConfig;
use zarista_core::{FavoriteId, ProductId, UserId};

/// A favorites row as PostgREST returns it.
#[derive(Debug, Deserialize)]
struct FavoriteRow {
    id: FavoriteId,
    user_id: UserId,
    product_id: ProductId,
    product_handle: String,
    product_title: String,
    product_image_url: Option<String>,
    product_price: String,
    product_currency: String,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            product_handle: row.product_handle,
            product_title: row.product_title,
            product_image_url: row.product_image_url,
            product_price: row.product_price,
            product_currency: row.product_currency,
            created_at: row.created_at,
        }
    }
}

/// Favorites store backed by a Supabase `favorites` table.
#[derive(Clone)]
pub struct SupabaseFavorites {
    client: reqwest::Client,
    table_url: Url,
    anon_key: SecretString,
}

impl SupabaseFavorites {
    /// Create a store client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] if the configured project URL is invalid.
    pub fn new(config: &SupabaseConfig) -> Result<Self, url::ParseError> {
        let base = Url::parse(&config.url)?;
        let table_url = base.join("rest/v1/favorites")?;

        Ok(Self {
            client: reqwest::Client::new(),
            table_url,
            anon_key: config.anon_key.clone(),
        })
    }

    /// Table URL with `eq.` filters for the pair.
    fn pair_url(&self, user: &UserId, product: &ProductId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user}"))
            .append_pair("product_id", &format!("eq.{product}"));
        url
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .header(
                "Authorization",
                format!("Bearer {}", self.anon_key.expose_secret()),
            )
    }

    /// Surface non-success statuses as a store rejection with a truncated
    /// body for diagnostics.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, FavoritesStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        tracing::error!(status = %status, detail = %detail, "favorites store rejected request");
        Err(FavoritesStoreError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }

    async fn parse_rows(response: reqwest::Response) -> Result<Vec<FavoriteRow>, FavoritesStoreError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse favorites store response"
            );
            FavoritesStoreError::Parse(e)
        })
    }
}

impl FavoritesStore for SupabaseFavorites {
    #[instrument(skip(self))]
    async fn exists(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<bool, FavoritesStoreError> {
        let mut url = self.pair_url(user, product);
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("limit", "1");

        let response = self.request(reqwest::Method::GET, url).send().await?;
        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    #[instrument(skip(self, favorite), fields(product_id = %favorite.product_id))]
    async fn insert(&self, favorite: &NewFavorite) -> Result<FavoriteId, FavoritesStoreError> {
        let response = self
            .request(reqwest::Method::POST, self.table_url.clone())
            .header("Prefer", "return=representation")
            .json(favorite)
            .send()
            .await?;

        let rows = Self::parse_rows(Self::check(response).await?).await?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or(FavoritesStoreError::MissingRow)
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<(), FavoritesStoreError> {
        let url = self.pair_url(user, product);
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, user: &UserId) -> Result<Vec<Favorite>, FavoritesStoreError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user}"))
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");

        let response = self.request(reqwest::Method::GET, url).send().await?;
        let rows = Self::parse_rows(Self::check(response).await?).await?;
        Ok(rows.into_iter().map(Favorite::from).collect())
    }
}
