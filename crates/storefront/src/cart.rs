//! In-memory cart ledger.
//!
//! The ledger is process-local session state: an ordered list of line items
//! keyed by variant ID, mutated synchronously by user actions and never
//! persisted or synchronized remotely. Every operation is total: malformed
//! input degrades to a no-op or a removal, never an error.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::catalog::types::{Image, Product, ProductVariant, SelectedOption};
use crate::favorites::Favorite;
use zarista_core::{Money, VariantId};

/// One row in the cart, always tied to exactly one variant.
///
/// `price` is a snapshot taken at the moment of addition and deliberately
/// never re-read from the live catalog.
#[derive(Debug, Clone)]
pub struct CartLineItem {
    /// Full product snapshot at add-time, for display. Shared, immutable
    /// for the session.
    pub product: Arc<Product>,
    /// Variant this line is for.
    pub variant_id: VariantId,
    /// Variant title at add-time.
    pub variant_title: String,
    /// Price snapshot at add-time.
    pub price: Money,
    /// Quantity, always >= 1 while the line exists.
    pub quantity: u32,
    /// Selected options snapshot.
    pub selected_options: Vec<SelectedOption>,
}

impl CartLineItem {
    /// Build a line item for one variant of a product.
    #[must_use]
    pub fn for_variant(product: &Arc<Product>, variant: &ProductVariant, quantity: u32) -> Self {
        Self {
            product: Arc::clone(product),
            variant_id: variant.id.clone(),
            variant_title: variant.title.clone(),
            price: variant.price.clone(),
            quantity,
            selected_options: variant.selected_options.clone(),
        }
    }

    /// Build a line item from a favorite's denormalized snapshot.
    ///
    /// Favorites don't carry variant data, so the product ID doubles as the
    /// variant key and the title falls back to "Default".
    #[must_use]
    pub fn from_favorite(favorite: &Favorite) -> Self {
        let product = Product {
            id: favorite.product_id.clone(),
            handle: favorite.product_handle.clone(),
            title: favorite.product_title.clone(),
            description: None,
            product_type: None,
            images: favorite
                .product_image_url
                .iter()
                .map(|url| Image {
                    url: url.clone(),
                    alt_text: Some(favorite.product_title.clone()),
                })
                .collect(),
            variants: vec![],
        };

        Self {
            product: Arc::new(product),
            variant_id: VariantId::new(favorite.product_id.as_str()),
            variant_title: "Default".to_string(),
            price: Money::new(
                favorite.product_price.clone(),
                favorite.product_currency.clone(),
            ),
            quantity: 1,
            selected_options: vec![],
        }
    }

    /// The line's contribution to the cart total.
    #[must_use]
    pub fn line_amount(&self) -> Decimal {
        self.price.parsed_amount() * Decimal::from(self.quantity)
    }
}

/// Per-currency total for the cart.
///
/// A cart mixing currency codes is degenerate but must never be summed
/// across codes, so totals are always reported as a breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotal {
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Sum of `price * quantity` over lines in this currency.
    pub amount: Decimal,
}

/// The cart ledger: an ordered sequence of line items, at most one per
/// distinct variant ID.
#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    lines: Vec<CartLineItem>,
}

impl CartLedger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add an item, merging with an existing line for the same variant.
    ///
    /// A repeated addition increments the existing line's quantity and keeps
    /// its stored price and title snapshots (first-add wins). Items with
    /// zero quantity are ignored.
    pub fn add_item(&mut self, item: CartLineItem) {
        if item.quantity == 0 {
            return;
        }

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|line| line.variant_id == item.variant_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.lines.push(item);
        }
    }

    /// Remove the line for `variant_id`. A no-op when absent.
    pub fn remove_item(&mut self, variant_id: &VariantId) {
        self.lines.retain(|line| line.variant_id != *variant_id);
    }

    /// Set the quantity for `variant_id`; zero removes the line.
    pub fn update_quantity(&mut self, variant_id: &VariantId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(variant_id);
            return;
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.variant_id == *variant_id)
        {
            line.quantity = quantity;
        }
    }

    /// Empty the ledger.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across lines, for UI badges.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    /// Per-currency totals, in first-seen currency order.
    #[must_use]
    pub fn totals(&self) -> Vec<CartTotal> {
        let mut totals: Vec<CartTotal> = Vec::new();
        for line in &self.lines {
            let amount = line.line_amount();
            match totals
                .iter_mut()
                .find(|total| total.currency_code == line.price.currency_code)
            {
                Some(total) => total.amount += amount,
                None => totals.push(CartTotal {
                    currency_code: line.price.currency_code.clone(),
                    amount,
                }),
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use zarista_core::{FavoriteId, ProductId, UserId};

    fn sample_product() -> Arc<Product> {
        Arc::new(Product {
            id: ProductId::new("gid://shopify/Product/1"),
            handle: "gold-ring".to_string(),
            title: "Gold Ring".to_string(),
            description: None,
            product_type: Some("Rings".to_string()),
            images: vec![],
            variants: vec![ProductVariant {
                id: VariantId::new("v1"),
                title: "Default Title".to_string(),
                price: Money::new("50.00", "USD"),
                available_for_sale: true,
                selected_options: vec![],
            }],
        })
    }

    fn line(variant_id: &str, price: &str, currency: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            product: sample_product(),
            variant_id: VariantId::new(variant_id),
            variant_title: "Default Title".to_string(),
            price: Money::new(price, currency),
            quantity,
            selected_options: vec![],
        }
    }

    #[test]
    fn test_repeated_add_merges_and_keeps_first_price() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 1));
        // Second add carries a different price snapshot; first-add wins
        cart.add_item(line("v1", "60.00", "USD", 1));

        assert_eq!(cart.lines().len(), 1);
        let only = cart.lines().first().expect("line");
        assert_eq!(only.quantity, 2);
        assert_eq!(only.price.amount, "50.00");
    }

    #[test]
    fn test_distinct_variants_get_distinct_lines() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 1));
        cart.add_item(line("v2", "20.00", "USD", 3));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_variant_is_noop() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 1));
        cart.remove_item(&VariantId::new("missing"));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 2));
        cart.update_quantity(&VariantId::new("v1"), 0);

        assert!(cart.is_empty());
        assert!(cart.lines().iter().all(|l| l.quantity >= 1));
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 1));
        cart.update_quantity(&VariantId::new("v1"), 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_clear_empties_ledger() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 1));
        cart.add_item(line("v2", "20.00", "USD", 1));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_totals_group_per_currency() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "50.00", "USD", 2));
        cart.add_item(line("v2", "20.00", "USD", 1));
        cart.add_item(line("v3", "1000", "INR", 1));

        let totals = cart.totals();
        assert_eq!(
            totals,
            vec![
                CartTotal {
                    currency_code: "USD".to_string(),
                    amount: Decimal::new(12000, 2),
                },
                CartTotal {
                    currency_code: "INR".to_string(),
                    amount: Decimal::from(1000),
                },
            ]
        );
    }

    #[test]
    fn test_unparseable_price_contributes_zero() {
        let mut cart = CartLedger::new();
        cart.add_item(line("v1", "oops", "USD", 3));
        let totals = cart.totals();
        assert_eq!(totals.first().map(|t| t.amount), Some(Decimal::ZERO));
    }

    #[test]
    fn test_from_favorite_builds_mergeable_line() {
        let favorite = Favorite {
            id: FavoriteId::new(Uuid::new_v4()),
            user_id: UserId::new("user-1"),
            product_id: ProductId::new("gid://shopify/Product/9"),
            product_handle: "silver-chain".to_string(),
            product_title: "Silver Chain".to_string(),
            product_image_url: Some("https://cdn/chain.jpg".to_string()),
            product_price: "35.00".to_string(),
            product_currency: "USD".to_string(),
            created_at: Utc::now(),
        };

        let mut cart = CartLedger::new();
        cart.add_item(CartLineItem::from_favorite(&favorite));
        cart.add_item(CartLineItem::from_favorite(&favorite));

        assert_eq!(cart.lines().len(), 1);
        let only = cart.lines().first().expect("line");
        assert_eq!(only.quantity, 2);
        assert_eq!(only.variant_title, "Default");
        assert_eq!(only.product.featured_image().map(|i| i.url.as_str()),
            Some("https://cdn/chain.jpg"));
    }
}
