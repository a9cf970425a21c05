//! Navigation tree derived from the flat category paths on each product.
//!
//! The feed carries no category entity of its own — every product lists the
//! full root-to-leaf paths it belongs to, and the same logical path shows up
//! with varying capitalization across products. The tree is rebuilt from
//! scratch on every catalog fetch and carries no state beyond its path.

use std::collections::HashMap;

use serde::Serialize;

use crate::product::Product;
use crate::slug::{slugify, split_path};

/// One node of the derived category tree.
///
/// `href` is reconstructible purely from the chain of ancestor labels: it is
/// the slugs of that chain joined under `/kategoria/`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    /// Display segment, original feed casing (first occurrence wins).
    pub label: String,
    /// Storefront URL for the filtered listing at this node.
    pub href: String,
    /// Alphabetically ordered by label; empty for leaves.
    pub children: Vec<CategoryNode>,
}

/// Builds the navigation tree for one top-level group (e.g. `"Psy"`).
///
/// Every product category path whose first segment case-insensitively
/// equals `top_level` contributes all of its prefix paths as nodes. Roots
/// of the returned forest are the depth-2 paths (`"<top_level> / <...>"`);
/// siblings are sorted alphabetically for deterministic output.
#[must_use]
pub fn build_category_tree(products: &[Product], top_level: &str) -> Vec<CategoryNode> {
    let wanted = slugify(top_level);
    if wanted.is_empty() {
        return Vec::new();
    }

    // Path-keyed edge map: joined slug path -> ordered set of child slug
    // paths. Labels remember the first-seen original casing per node.
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    let mut labels: HashMap<String, String> = HashMap::new();
    let mut roots: Vec<String> = Vec::new();

    for product in products {
        for category in &product.categories {
            let segments = split_path(category);
            if segments.len() < 2 || slugify(segments[0]) != wanted {
                continue;
            }

            let mut key = slugify(segments[0]);
            for (depth, segment) in segments.iter().enumerate().skip(1) {
                let parent = key.clone();
                key = format!("{key}/{}", slugify(segment));
                labels
                    .entry(key.clone())
                    .or_insert_with(|| (*segment).to_string());

                if depth == 1 {
                    if !roots.contains(&key) {
                        roots.push(key.clone());
                    }
                } else {
                    let siblings = children.entry(parent).or_default();
                    if !siblings.contains(&key) {
                        siblings.push(key.clone());
                    }
                }
            }
        }
    }

    let mut tree: Vec<CategoryNode> = roots
        .iter()
        .map(|key| materialize(key, &children, &labels))
        .collect();
    tree.sort_by(|a, b| a.label.cmp(&b.label));
    tree
}

fn materialize(
    key: &str,
    children: &HashMap<String, Vec<String>>,
    labels: &HashMap<String, String>,
) -> CategoryNode {
    let mut kids: Vec<CategoryNode> = children
        .get(key)
        .map(|child_keys| {
            child_keys
                .iter()
                .map(|child| materialize(child, children, labels))
                .collect()
        })
        .unwrap_or_default();
    kids.sort_by(|a, b| a.label.cmp(&b.label));

    CategoryNode {
        label: labels.get(key).cloned().unwrap_or_default(),
        href: format!("/kategoria/{key}"),
        children: kids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_categories(sku: &str, categories: &[&str]) -> Product {
        Product {
            id: format!("id-{sku}"),
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            description: None,
            manufacturer: String::new(),
            categories: categories.iter().map(ToString::to_string).collect(),
            price_net: "1.00".to_string(),
            default_price_net: "1.00".to_string(),
            stock_quantity: "1".to_string(),
            active: true,
            images: Vec::new(),
            weight: "0".to_string(),
            unit: "sztuka".to_string(),
            ean: None,
            min_order_quantity: "1".to_string(),
        }
    }

    #[test]
    fn roots_are_depth_two_paths() {
        let products = vec![
            product_with_categories("A", &["Psy / Sucha karma / Bezzbożowa"]),
            product_with_categories("B", &["Psy / Mokra karma"]),
            product_with_categories("C", &["Koty / Sucha karma"]),
        ];
        let tree = build_category_tree(&products, "Psy");
        let labels: Vec<_> = tree.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Mokra karma", "Sucha karma"]);
    }

    #[test]
    fn top_level_filter_is_case_insensitive() {
        let products = vec![product_with_categories("A", &["PSY / Sucha karma"])];
        let tree = build_category_tree(&products, "psy");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].label, "Sucha karma");
    }

    #[test]
    fn children_are_nested_under_their_parents() {
        let products = vec![product_with_categories(
            "A",
            &["Psy / Sucha karma / Karma wg. wieku / Psy dorosłe"],
        )];
        let tree = build_category_tree(&products, "Psy");
        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.label, "Sucha karma");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].label, "Karma wg. wieku");
        assert_eq!(root.children[0].children[0].label, "Psy dorosłe");
    }

    #[test]
    fn href_is_built_from_ancestor_slugs() {
        let products = vec![product_with_categories(
            "A",
            &["Psy / Sucha karma / Karma wg. wieku"],
        )];
        let tree = build_category_tree(&products, "Psy");
        assert_eq!(tree[0].href, "/kategoria/psy/sucha-karma");
        assert_eq!(
            tree[0].children[0].href,
            "/kategoria/psy/sucha-karma/karma-wg-wieku"
        );
    }

    #[test]
    fn same_logical_path_with_different_casing_merges() {
        let products = vec![
            product_with_categories("A", &["Psy / Sucha karma / Bezzbożowa"]),
            product_with_categories("B", &["Psy / sucha karma / bezzbożowa"]),
        ];
        let tree = build_category_tree(&products, "Psy");
        assert_eq!(tree.len(), 1, "case variants must collapse to one node");
        // First-seen casing wins the label.
        assert_eq!(tree[0].label, "Sucha karma");
        assert_eq!(tree[0].children.len(), 1);
    }

    #[test]
    fn siblings_sort_alphabetically() {
        let products = vec![
            product_with_categories("A", &["Psy / Sucha karma / Światłoczuła"]),
            product_with_categories("B", &["Psy / Sucha karma / Bezzbożowa"]),
            product_with_categories("C", &["Psy / Sucha karma / Monobiałkowa"]),
        ];
        let tree = build_category_tree(&products, "Psy");
        let labels: Vec<_> = tree[0]
            .children
            .iter()
            .map(|n| n.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Bezzbożowa", "Monobiałkowa", "Światłoczuła"]);
    }

    #[test]
    fn other_top_levels_are_excluded() {
        let products = vec![
            product_with_categories("A", &["Koty / Mokra karma"]),
            product_with_categories("B", &["Gryzonie / Siano"]),
        ];
        let tree = build_category_tree(&products, "Psy");
        assert!(tree.is_empty());
    }

    #[test]
    fn bare_top_level_path_contributes_no_node() {
        // A path with only the top-level segment has no depth-2 prefix.
        let products = vec![product_with_categories("A", &["Psy"])];
        let tree = build_category_tree(&products, "Psy");
        assert!(tree.is_empty());
    }

    #[test]
    fn leaf_nodes_have_no_children() {
        let products = vec![product_with_categories("A", &["Psy / Przysmaki"])];
        let tree = build_category_tree(&products, "Psy");
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn tree_serializes_nested_shape() {
        let products = vec![product_with_categories(
            "A",
            &["Psy / Sucha karma / Bezzbożowa"],
        )];
        let tree = build_category_tree(&products, "Psy");
        let json = serde_json::to_value(&tree).expect("serialize tree");
        assert_eq!(json[0]["label"], "Sucha karma");
        assert_eq!(json[0]["children"][0]["href"], "/kategoria/psy/sucha-karma/bezzbozowa");
    }
}
