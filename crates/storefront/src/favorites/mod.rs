//! Per-user favorites, synchronized against a remote store.
//!
//! The remote store is the sole source of truth: a toggle never flips local
//! state optimistically. Instead, a successful mutation returns the explicit
//! set of [`Invalidation`]s whose read paths the caller must re-query, which
//! gives read-your-writes without any local patching that could drift when a
//! remote write fails.
//!
//! Favorite rows denormalize the product fields they need for display
//! (handle, title, image, price). That is deliberate: rendering a favorites
//! list never requires rejoining against the live catalog, at the cost of
//! staleness if the canonical product changes later.

pub mod supabase;

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::catalog::types::{Product, ProductVariant};
use zarista_core::{FavoriteId, ProductId, UserId};

/// A favorite row as the remote store holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    /// Remote-store-assigned row ID.
    pub id: FavoriteId,
    /// Owning user.
    pub user_id: UserId,
    /// Favorited product.
    pub product_id: ProductId,
    /// Product handle snapshot.
    pub product_handle: String,
    /// Product title snapshot.
    pub product_title: String,
    /// Canonical image URL snapshot, if the product had one.
    pub product_image_url: Option<String>,
    /// Price amount snapshot (decimal string).
    pub product_price: String,
    /// Currency code snapshot.
    pub product_currency: String,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// A favorite row about to be inserted; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFavorite {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_handle: String,
    pub product_title: String,
    pub product_image_url: Option<String>,
    pub product_price: String,
    pub product_currency: String,
}

impl NewFavorite {
    /// Denormalize the display fields of `product` at toggle time.
    #[must_use]
    pub fn snapshot(user: &UserId, product: &Product, variant: &ProductVariant) -> Self {
        Self {
            user_id: user.clone(),
            product_id: product.id.clone(),
            product_handle: product.handle.clone(),
            product_title: product.title.clone(),
            product_image_url: product.featured_image().map(|image| image.url.clone()),
            product_price: variant.price.amount.clone(),
            product_currency: variant.price.currency_code.clone(),
        }
    }
}

/// Errors from the remote favorites store.
#[derive(Debug, Error)]
pub enum FavoritesStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The store rejected the request.
    #[error("store rejected request with status {status}: {detail}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        detail: String,
    },

    /// An insert succeeded but returned no row to read the ID from.
    #[error("store returned no row for the inserted favorite")]
    MissingRow,
}

/// The remote favorites store collaborator.
///
/// Keyed by `(user, product)` with at most one row per pair; conflict
/// resolution is last-write-wins. Used generically by the synchronizer;
/// dyn dispatch is not part of the contract.
#[allow(async_fn_in_trait)]
pub trait FavoritesStore {
    /// Whether a row exists for `(user, product)`.
    async fn exists(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<bool, FavoritesStoreError>;

    /// Insert a row and return its store-assigned ID.
    async fn insert(&self, favorite: &NewFavorite) -> Result<FavoriteId, FavoritesStoreError>;

    /// Delete the row for `(user, product)`, if any.
    async fn delete(&self, user: &UserId, product: &ProductId)
    -> Result<(), FavoritesStoreError>;

    /// All of `user`'s favorites, newest first.
    async fn list(&self, user: &UserId) -> Result<Vec<Favorite>, FavoritesStoreError>;
}

/// Observed favorite state for one `(user, product)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoriteStatus {
    /// Not yet queried; the UI's initial state.
    #[default]
    Unknown,
    /// No row in the remote store (always the case without a user).
    Absent,
    /// A row exists in the remote store.
    Present,
    /// A mutation for the pair is in flight.
    Pending,
}

/// Errors surfaced by favorite operations.
#[derive(Debug, Error)]
pub enum FavoriteError {
    /// No authenticated user; an expected condition the UI answers with a
    /// sign-in prompt, not a system failure.
    #[error("sign in to save favorites")]
    Unauthenticated,

    /// A toggle for the same `(user, product)` pair is already in flight.
    #[error("a favorites update for this product is already in flight")]
    ToggleInFlight,

    /// The remote store failed; no local state is assumed changed.
    #[error(transparent)]
    Store(#[from] FavoritesStoreError),
}

/// What a successful toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// A favorite row was inserted.
    Added,
    /// The favorite row was deleted.
    Removed,
}

/// A read path the caller must re-query after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// The single-pair existence query.
    FavoriteStatus { user: UserId, product: ProductId },
    /// The user's list-of-favorites query.
    FavoritesList { user: UserId },
}

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Whether the toggle added or removed the favorite.
    pub action: ToggleAction,
    /// Read paths to re-query; this is the read-your-writes contract.
    pub invalidations: Vec<Invalidation>,
}

type Pair = (UserId, ProductId);

/// Coordinates favorite toggles against a remote store.
///
/// Mutations for the same `(user, product)` pair are serialized: a toggle
/// arriving while one is in flight for that pair is rejected. Unrelated
/// pairs never block each other.
#[derive(Debug)]
pub struct FavoritesSynchronizer<S> {
    store: S,
    in_flight: Mutex<HashSet<Pair>>,
}

impl<S: FavoritesStore> FavoritesSynchronizer<S> {
    /// Create a synchronizer over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn is_pending(&self, user: &UserId, product: &ProductId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(user.clone(), product.clone()))
    }

    /// Mark `pair` in flight, or return `None` when it already is.
    fn begin(&self, pair: Pair) -> Option<InFlightGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(pair.clone()) {
            return None;
        }
        Some(InFlightGuard {
            set: &self.in_flight,
            pair,
        })
    }

    /// Observed state for `(user, product)`.
    ///
    /// Unauthenticated visitors are always `Absent`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::Store`] if the existence query fails.
    pub async fn status(
        &self,
        user: Option<&UserId>,
        product: &ProductId,
    ) -> Result<FavoriteStatus, FavoriteError> {
        let Some(user) = user else {
            return Ok(FavoriteStatus::Absent);
        };

        if self.is_pending(user, product) {
            return Ok(FavoriteStatus::Pending);
        }

        if self.store.exists(user, product).await? {
            Ok(FavoriteStatus::Present)
        } else {
            Ok(FavoriteStatus::Absent)
        }
    }

    /// Whether `(user, product)` is currently favorited.
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::Store`] if the existence query fails.
    pub async fn is_favorite(
        &self,
        user: Option<&UserId>,
        product: &ProductId,
    ) -> Result<bool, FavoriteError> {
        Ok(self.status(user, product).await? == FavoriteStatus::Present)
    }

    /// Toggle the favorite for `(user, product)`.
    ///
    /// Present pairs get a delete, absent pairs get an insert carrying the
    /// denormalized snapshot of `product` and `variant`. On success the
    /// caller must re-query every path named in the returned
    /// [`ToggleOutcome::invalidations`]; on failure no local state has
    /// changed and the pre-toggle state should be confirmed by reissuing
    /// the existence query.
    ///
    /// # Errors
    ///
    /// - [`FavoriteError::Unauthenticated`] without a user (the store is
    ///   never contacted).
    /// - [`FavoriteError::ToggleInFlight`] while a toggle for the same pair
    ///   is pending.
    /// - [`FavoriteError::Store`] if the remote mutation fails.
    #[instrument(skip(self, product, variant), fields(product_id = %product.id))]
    pub async fn toggle(
        &self,
        user: Option<&UserId>,
        product: &Product,
        variant: &ProductVariant,
    ) -> Result<ToggleOutcome, FavoriteError> {
        let user = user.ok_or(FavoriteError::Unauthenticated)?;

        let pair = (user.clone(), product.id.clone());
        let _guard = self.begin(pair).ok_or(FavoriteError::ToggleInFlight)?;

        let action = if self.store.exists(user, &product.id).await? {
            self.store.delete(user, &product.id).await?;
            ToggleAction::Removed
        } else {
            let snapshot = NewFavorite::snapshot(user, product, variant);
            self.store.insert(&snapshot).await?;
            ToggleAction::Added
        };

        debug!(?action, "favorite toggled");

        Ok(ToggleOutcome {
            action,
            invalidations: vec![
                Invalidation::FavoriteStatus {
                    user: user.clone(),
                    product: product.id.clone(),
                },
                Invalidation::FavoritesList { user: user.clone() },
            ],
        })
    }

    /// All favorites for `user`, newest first; empty without a user.
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::Store`] if the list query fails.
    pub async fn list(&self, user: Option<&UserId>) -> Result<Vec<Favorite>, FavoriteError> {
        match user {
            Some(user) => Ok(self.store.list(user).await?),
            None => Ok(Vec::new()),
        }
    }
}

/// Removes its pair from the in-flight set on drop, so a failed toggle
/// never wedges the pair.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Pair>>,
    pair: Pair,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.pair);
    }
}
