//! Pure query engine over an in-memory product list.
//!
//! Filtering, searching, and sorting never touch the network and never fail;
//! the functions here take the raw product list plus a [`CatalogQuery`] and
//! produce the display-ready ordering.

use std::cmp::Reverse;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Product;

/// Pseudo-category that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// Sentinel category for products without a type tag.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Sort orderings the storefront offers.
///
/// `Name` compares Unicode-lowercased titles; without an ICU collator this
/// is the closest stable, reproducible stand-in for a locale-aware sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Source order, unchanged.
    #[default]
    Featured,
    /// Ascending by title.
    Name,
    /// Ascending by the first variant's price.
    PriceLow,
    /// Descending by the first variant's price.
    PriceHigh,
}

impl SortKey {
    /// Parse a UI parameter value; unknown values fall back to `Featured`.
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "name" => Self::Name,
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            _ => Self::Featured,
        }
    }

    /// The UI parameter value for this key.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Name => "name",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }
}

/// Filter, search, and sort configuration for one catalog view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Category to keep, or [`ALL_CATEGORIES`].
    pub category: String,
    /// Case-insensitive substring to match against title or description.
    /// Empty matches everything.
    pub search: String,
    /// Ordering applied after filtering.
    pub sort: SortKey,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            search: String::new(),
            sort: SortKey::Featured,
        }
    }
}

/// The category tag of a product, with the sentinel for untagged products.
#[must_use]
pub fn category_of(product: &Product) -> &str {
    product
        .product_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Distinct categories across `products`, in first-seen order, with
/// [`ALL_CATEGORIES`] prepended.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        let category = category_of(product);
        if !out.iter().any(|c| c == category) {
            out.push(category.to_string());
        }
    }
    out
}

/// Whether a product passes the query's category and search filters.
fn matches(product: &Product, query: &CatalogQuery) -> bool {
    let matches_category =
        query.category == ALL_CATEGORIES || category_of(product) == query.category;

    let matches_search = query.search.is_empty() || {
        let needle = query.search.to_lowercase();
        product.title.to_lowercase().contains(&needle)
            || product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    };

    matches_category && matches_search
}

/// Sort key: the first variant's price, degrading to zero when the product
/// has no variants or the amount fails to parse.
fn first_variant_amount(product: &Product) -> Decimal {
    product
        .first_variant()
        .map_or(Decimal::ZERO, |variant| variant.price.parsed_amount())
}

/// Apply `query` to `products`, producing the display-ready ordering.
///
/// Non-destructive: the input list is never reordered. Sorts are stable, so
/// products with equal keys keep their prior relative order.
#[must_use]
pub fn apply(products: &[Product], query: &CatalogQuery) -> Vec<Product> {
    let mut filtered: Vec<Product> = products
        .iter()
        .filter(|product| matches(product, query))
        .cloned()
        .collect();

    match query.sort {
        SortKey::Featured => {}
        SortKey::Name => filtered.sort_by_key(|product| product.title.to_lowercase()),
        SortKey::PriceLow => filtered.sort_by_key(first_variant_amount),
        SortKey::PriceHigh => filtered.sort_by_key(|product| Reverse(first_variant_amount(product))),
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::ProductVariant;
    use zarista_core::Money;

    fn product(title: &str, price: &str, product_type: Option<&str>) -> Product {
        Product {
            id: format!("gid://shopify/Product/{title}").into(),
            handle: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: Some(format!("{title} from our collection")),
            product_type: product_type.map(str::to_string),
            images: vec![],
            variants: vec![ProductVariant {
                id: format!("variant-{title}").into(),
                title: "Default Title".to_string(),
                price: Money::new(price, "USD"),
                available_for_sale: true,
                selected_options: vec![],
            }],
        }
    }

    fn jewelry() -> Vec<Product> {
        vec![
            product("Ring A", "50", Some("Rings")),
            product("Ring B", "20", Some("Rings")),
            product("Necklace C", "80", Some("Necklaces")),
        ]
    }

    #[test]
    fn test_categories_first_seen_order_with_all_prepended() {
        let mut products = jewelry();
        products.push(product("Mystery D", "10", None));
        products.push(product("Ring E", "15", Some("Rings")));

        assert_eq!(
            categories(&products),
            vec!["All", "Rings", "Necklaces", "Other"]
        );
    }

    #[test]
    fn test_blank_category_uses_sentinel() {
        let p = product("Blank", "5", Some("  "));
        assert_eq!(category_of(&p), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_all_filter_returns_same_set() {
        let products = jewelry();
        let out = apply(&products, &CatalogQuery::default());
        assert_eq!(out, products);
    }

    #[test]
    fn test_category_filter() {
        let products = jewelry();
        let query = CatalogQuery {
            category: "Rings".to_string(),
            ..CatalogQuery::default()
        };
        let out = apply(&products, &query);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| category_of(p) == "Rings"));
    }

    #[test]
    fn test_search_case_insensitive_over_title_and_description() {
        let products = jewelry();

        let query = CatalogQuery {
            search: "ring a".to_string(),
            ..CatalogQuery::default()
        };
        let out = apply(&products, &query);
        assert_eq!(out.len(), 1);
        assert_eq!(out.first().map(|p| p.title.as_str()), Some("Ring A"));

        // "collection" only appears in descriptions
        let query = CatalogQuery {
            search: "COLLECTION".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(apply(&products, &query).len(), 3);
    }

    #[test]
    fn test_search_without_match_yields_empty() {
        let products = jewelry();
        let query = CatalogQuery {
            search: "bracelet".to_string(),
            ..CatalogQuery::default()
        };
        assert!(apply(&products, &query).is_empty());
    }

    #[test]
    fn test_price_low_ordering() {
        let products = jewelry();
        let query = CatalogQuery {
            sort: SortKey::PriceLow,
            ..CatalogQuery::default()
        };
        let titles: Vec<String> = apply(&products, &query)
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Ring B", "Ring A", "Necklace C"]);
    }

    #[test]
    fn test_price_high_reverses_price_low_for_distinct_prices() {
        let products = jewelry();
        let low = apply(
            &products,
            &CatalogQuery {
                sort: SortKey::PriceLow,
                ..CatalogQuery::default()
            },
        );
        let mut high = apply(
            &products,
            &CatalogQuery {
                sort: SortKey::PriceHigh,
                ..CatalogQuery::default()
            },
        );
        high.reverse();
        assert_eq!(low, high);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let products = vec![
            product("pearl strand", "10", None),
            product("Amber Pendant", "10", None),
        ];
        let query = CatalogQuery {
            sort: SortKey::Name,
            ..CatalogQuery::default()
        };
        let out = apply(&products, &query);
        assert_eq!(out.first().map(|p| p.title.as_str()), Some("Amber Pendant"));
    }

    #[test]
    fn test_unparseable_price_sorts_as_zero() {
        let mut products = jewelry();
        products.push(product("Broken", "n/a", None));
        let query = CatalogQuery {
            sort: SortKey::PriceLow,
            ..CatalogQuery::default()
        };
        let out = apply(&products, &query);
        assert_eq!(out.first().map(|p| p.title.as_str()), Some("Broken"));
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let products = vec![
            product("First", "10", None),
            product("Second", "10", None),
            product("Third", "10", None),
        ];
        let query = CatalogQuery {
            sort: SortKey::PriceLow,
            ..CatalogQuery::default()
        };
        let out = apply(&products, &query);
        assert_eq!(out, products);
    }

    #[test]
    fn test_sort_key_params_round_trip() {
        for key in [
            SortKey::Featured,
            SortKey::Name,
            SortKey::PriceLow,
            SortKey::PriceHigh,
        ] {
            assert_eq!(SortKey::from_param(key.as_param()), key);
        }
        assert_eq!(SortKey::from_param("best-selling"), SortKey::Featured);
    }
}
