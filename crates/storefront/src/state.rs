//! Application state shared across the UI shell.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::cart::CartLedger;
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::favorites::FavoritesSynchronizer;
use crate::favorites::supabase::SupabaseFavorites;

/// Error building the storefront state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid SUPABASE_URL: {0}")]
    InvalidSupabaseUrl(#[from] url::ParseError),
}

/// Storefront state shared across the UI.
///
/// This struct is cheaply cloneable via `Arc`; consumers hold a handle
/// rather than reaching into shared globals. The cart ledger sits behind a
/// mutex because its operations are synchronous and atomic; favorites and
/// catalog access are internally shareable.
#[derive(Clone)]
pub struct StorefrontState {
    inner: Arc<StorefrontStateInner>,
}

struct StorefrontStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: Mutex<CartLedger>,
    favorites: FavoritesSynchronizer<SupabaseFavorites>,
}

impl StorefrontState {
    /// Create a new storefront state.
    ///
    /// # Errors
    ///
    /// Returns an error if the favorites store configuration is invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = CatalogClient::new(&config.shopify);
        let favorites = FavoritesSynchronizer::new(SupabaseFavorites::new(&config.supabase)?);

        Ok(Self {
            inner: Arc::new(StorefrontStateInner {
                config,
                catalog,
                cart: Mutex::new(CartLedger::new()),
                favorites,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Lock the cart ledger for a sequence of synchronous operations.
    #[must_use]
    pub fn cart(&self) -> MutexGuard<'_, CartLedger> {
        self.inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a reference to the favorites synchronizer.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesSynchronizer<SupabaseFavorites> {
        &self.inner.favorites
    }
}
