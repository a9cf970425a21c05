use serde::{Deserialize, Serialize};

use crate::slug::category_matches_path;

/// A product normalized from one of the upstream feeds, ready for querying
/// and JSON serialization toward the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Provider-assigned identifier, opaque to us.
    pub id: String,
    /// Stock-keeping unit; unique within one catalog snapshot and the
    /// external-facing product key.
    pub sku: String,
    pub name: String,
    /// Raw HTML fragment from the feed's `description` field.
    pub description: Option<String>,
    pub manufacturer: String,
    /// Full category paths from root to leaf, `" / "`-delimited, original
    /// casing preserved. The same logical path may appear with different
    /// capitalization on different products.
    pub categories: Vec<String>,
    /// Net price as a decimal string, exactly as the feed sends it.
    pub price_net: String,
    /// Fallback/list net price as a decimal string.
    pub default_price_net: String,
    /// Units available, as a decimal string.
    pub stock_quantity: String,
    /// Inactive products are excluded from category listings but stay
    /// resolvable by direct SKU lookup.
    pub active: bool,
    /// Absolute image URLs; the first one is the primary image.
    pub images: Vec<String>,
    pub weight: String,
    pub unit: String,
    pub ean: Option<String>,
    /// Minimum purchasable quantity; `"1"` when the feed does not say.
    pub min_order_quantity: String,
}

impl Product {
    /// Returns the primary image URL, if the product has any images.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Returns `true` if any of the product's category paths matches the
    /// requested URL path (slug-space prefix match).
    #[must_use]
    pub fn in_category(&self, url_path: &str) -> bool {
        self.categories
            .iter()
            .any(|c| category_matches_path(c, url_path))
    }
}

/// Finds the product with the given SKU. A missing SKU is a valid empty
/// result, never an error. Inactive products are found too — an existing
/// cart line may reference a since-deactivated SKU.
#[must_use]
pub fn find_by_sku<'a>(products: &'a [Product], sku: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.sku == sku)
}

/// Filters to active products matching the requested category path,
/// preserving feed order.
#[must_use]
pub fn filter_by_category_path(products: Vec<Product>, url_path: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.active && p.in_category(url_path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(sku: &str, categories: &[&str], active: bool) -> Product {
        Product {
            id: format!("id-{sku}"),
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            description: Some("<p>Pełnowartościowa karma.</p>".to_string()),
            manufacturer: "PetNature".to_string(),
            categories: categories.iter().map(ToString::to_string).collect(),
            price_net: "10.00".to_string(),
            default_price_net: "12.00".to_string(),
            stock_quantity: "3".to_string(),
            active,
            images: vec!["https://cdn.example.com/a.jpg".to_string()],
            weight: "2".to_string(),
            unit: "sztuka".to_string(),
            ean: Some("5901234567890".to_string()),
            min_order_quantity: "1".to_string(),
        }
    }

    #[test]
    fn primary_image_is_first() {
        let mut product = make_product("A1", &["Psy / Sucha karma"], true);
        product
            .images
            .push("https://cdn.example.com/b.jpg".to_string());
        assert_eq!(
            product.primary_image(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn primary_image_none_without_images() {
        let mut product = make_product("A1", &["Psy / Sucha karma"], true);
        product.images.clear();
        assert!(product.primary_image().is_none());
    }

    #[test]
    fn find_by_sku_returns_match() {
        let products = vec![
            make_product("A1", &["Psy / Sucha karma"], true),
            make_product("B2", &["Koty / Mokra karma"], true),
        ];
        let found = find_by_sku(&products, "B2").expect("B2 should be found");
        assert_eq!(found.sku, "B2");
    }

    #[test]
    fn find_by_sku_missing_is_none() {
        let products = vec![make_product("A1", &["Psy / Sucha karma"], true)];
        assert!(find_by_sku(&products, "ZZ9").is_none());
    }

    #[test]
    fn find_by_sku_includes_inactive_products() {
        let products = vec![make_product("A1", &["Psy / Sucha karma"], false)];
        assert!(find_by_sku(&products, "A1").is_some());
    }

    #[test]
    fn filter_by_category_matches_prefix() {
        let products = vec![
            make_product("A1", &["Psy / Sucha karma / Bezzbożowa"], true),
            make_product("B2", &["Koty / Mokra karma"], true),
        ];
        let filtered = filter_by_category_path(products, "psy/sucha-karma");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].sku, "A1");
    }

    #[test]
    fn filter_by_category_excludes_inactive() {
        let products = vec![
            make_product("A1", &["Psy / Sucha karma"], true),
            make_product("B2", &["Psy / Sucha karma"], false),
        ];
        let filtered = filter_by_category_path(products, "psy/sucha-karma");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].sku, "A1");
    }

    #[test]
    fn filter_by_category_preserves_feed_order() {
        let products = vec![
            make_product("C3", &["Psy / Sucha karma"], true),
            make_product("A1", &["Psy / Sucha karma"], true),
            make_product("B2", &["Psy / Mokra karma"], true),
        ];
        let filtered = filter_by_category_path(products, "psy/sucha-karma");
        let skus: Vec<_> = filtered.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["C3", "A1"]);
    }

    #[test]
    fn serde_roundtrip_product() {
        let product = make_product("A1", &["Psy / Sucha karma"], true);
        let json = serde_json::to_string(&product).expect("serialization failed");
        let decoded: Product = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded.sku, product.sku);
        assert_eq!(decoded.categories, product.categories);
        assert_eq!(decoded.price_net, "10.00");
        assert!(decoded.active);
    }

    #[test]
    fn product_serializes_snake_case_fields() {
        let product = make_product("A1", &["Psy / Sucha karma"], true);
        let json = serde_json::to_value(&product).expect("serialize");
        assert!(json.get("price_net").is_some());
        assert!(json.get("stock_quantity").is_some());
        assert!(json.get("min_order_quantity").is_some());
    }
}
