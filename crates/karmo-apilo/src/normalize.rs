//! Normalization from raw Apilo types to [`karmo_core::Product`].

use karmo_core::Product;

use crate::types::ApiloProduct;

/// Normalizes a raw [`ApiloProduct`] into the canonical catalog record.
///
/// Returns `None` when the record lacks a usable SKU or name — the same
/// inclusion rule the XML feed parser applies. The SKU falls back to the
/// numeric Apilo id when the `sku` field is empty.
#[must_use]
pub fn normalize_product(product: ApiloProduct) -> Option<Product> {
    let sku = product
        .sku
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| product.id.map(|id| id.to_string()))?;
    let name = product.name.clone().filter(|s| !s.is_empty())?;
    let id = product
        .id
        .map_or_else(|| sku.clone(), |id| id.to_string());

    let price_net = decimal_string(product.price_without_tax.as_ref()).unwrap_or_else(|| "0".to_string());

    let mut images: Vec<String> = product
        .images
        .iter()
        .filter_map(|img| img.url.clone())
        .filter(|url| is_absolute_url(url))
        .collect();
    if images.is_empty() {
        if let Some(main) = product.main_image.clone().filter(|url| is_absolute_url(url)) {
            images.push(main);
        }
    }

    let categories: Vec<String> = product
        .categories
        .iter()
        .filter_map(category_name)
        .collect();

    Some(Product {
        id,
        sku,
        name,
        description: product.description.filter(|s| !s.is_empty()),
        manufacturer: String::new(),
        categories,
        // Apilo has no separate list price; the current net price doubles
        // as the fallback.
        default_price_net: price_net.clone(),
        price_net,
        stock_quantity: decimal_string(product.quantity.as_ref()).unwrap_or_else(|| "0".to_string()),
        active: product.status.is_none_or(|s| s == 1),
        images,
        weight: decimal_string(product.weight.as_ref()).unwrap_or_else(|| "0".to_string()),
        unit: product.unit.filter(|s| !s.is_empty()).unwrap_or_else(|| "sztuka".to_string()),
        ean: product.ean.filter(|s| !s.is_empty()),
        min_order_quantity: "1".to_string(),
    })
}

/// Stringifies a numeric-or-string JSON value; `None` for anything else.
fn decimal_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// A category entry is either `{"name": "..."}` or a bare string.
fn category_name(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Object(map) => match map.get("name") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
