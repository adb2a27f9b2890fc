//! Wire shapes for Storefront API responses and their domain conversions.
//!
//! The API returns Relay-style connections (`edges` / `node`); everything
//! here exists to unwrap that shape into the flat domain types.

use serde::Deserialize;
use zarista_core::Money;

use super::types::{Image, Product, ProductVariant, SelectedOption};

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

/// A single error entry in a GraphQL response.
#[derive(Debug, Deserialize)]
pub(super) struct GraphQlError {
    pub message: String,
}

/// Relay-style connection wrapper.
#[derive(Debug, Deserialize)]
pub(super) struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductsData {
    pub products: Connection<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductByHandleData {
    pub product_by_handle: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductNode {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub images: Connection<ImageNode>,
    pub variants: Connection<VariantNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ImageNode {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VariantNode {
    pub id: String,
    pub title: String,
    pub price: MoneyNode,
    pub available_for_sale: bool,
    #[serde(default)]
    pub selected_options: Vec<OptionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MoneyNode {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct OptionNode {
    pub name: String,
    pub value: String,
}

// =============================================================================
// Conversions
// =============================================================================

pub(super) fn convert_product(node: ProductNode) -> Product {
    Product {
        id: node.id.into(),
        handle: node.handle,
        title: node.title,
        // The API sends empty strings for blank descriptions; normalize to None
        description: node.description.filter(|d| !d.is_empty()),
        product_type: node.product_type.filter(|t| !t.is_empty()),
        images: node.images.into_nodes().into_iter().map(convert_image).collect(),
        variants: node
            .variants
            .into_nodes()
            .into_iter()
            .map(convert_variant)
            .collect(),
    }
}

fn convert_image(node: ImageNode) -> Image {
    Image {
        url: node.url,
        alt_text: node.alt_text,
    }
}

fn convert_variant(node: VariantNode) -> ProductVariant {
    ProductVariant {
        id: node.id.into(),
        title: node.title,
        price: Money::new(node.price.amount, node.price.currency_code),
        available_for_sale: node.available_for_sale,
        selected_options: node
            .selected_options
            .into_iter()
            .map(|opt| SelectedOption {
                name: opt.name,
                value: opt.value,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_connection_shape() {
        let json = r#"{
            "id": "gid://shopify/Product/1",
            "handle": "gold-ring",
            "title": "Gold Ring",
            "description": "",
            "productType": "Rings",
            "images": {"edges": [{"node": {"url": "https://cdn/img.jpg", "altText": null}}]},
            "variants": {"edges": [{"node": {
                "id": "gid://shopify/ProductVariant/1",
                "title": "Default Title",
                "price": {"amount": "50.0", "currencyCode": "USD"},
                "availableForSale": true,
                "selectedOptions": [{"name": "Title", "value": "Default Title"}]
            }}]}
        }"#;

        let node: ProductNode = serde_json::from_str(json).expect("parse");
        let product = convert_product(node);

        assert_eq!(product.handle, "gold-ring");
        // Empty description normalized away
        assert_eq!(product.description, None);
        assert_eq!(product.product_type.as_deref(), Some("Rings"));
        assert_eq!(product.images.len(), 1);
        let variant = product.first_variant().expect("variant");
        assert_eq!(variant.price.amount, "50.0");
        assert!(variant.available_for_sale);
        assert_eq!(variant.selected_options.len(), 1);
    }

    #[test]
    fn test_missing_selected_options_default_empty() {
        let json = r#"{
            "id": "v1",
            "title": "Default Title",
            "price": {"amount": "10", "currencyCode": "USD"},
            "availableForSale": false
        }"#;

        let node: VariantNode = serde_json::from_str(json).expect("parse");
        assert!(node.selected_options.is_empty());
    }
}
