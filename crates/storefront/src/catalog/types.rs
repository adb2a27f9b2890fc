//! Domain types for the product catalog.
//!
//! These types provide a clean, ergonomic API separate from the raw wire
//! shapes the catalog source returns.

use serde::{Deserialize, Serialize};
use zarista_core::{Money, ProductId, VariantId};

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Metal").
    pub name: String,
    /// Selected value (e.g., "18in", "Gold").
    pub value: String,
}

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// A product variant (specific purchasable configuration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID, unique within its product.
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Current price.
    pub price: Money,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle, unique across the catalog.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: Option<String>,
    /// Product type, used as the category tag.
    pub product_type: Option<String>,
    /// Product images; the first is canonical.
    pub images: Vec<Image>,
    /// Product variants, in source order.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// The first variant, which carries the product's display price.
    #[must_use]
    pub fn first_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// The canonical image.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }
}
