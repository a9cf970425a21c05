//! Event-driven parser for the wholesaler catalog document.
//!
//! ## Observed shape of the upstream feed
//!
//! One `<product>` element per catalog entry, with child tags `id`, `code`,
//! `name`, `description`, `producer`, `active` (`"1"` = active),
//! `price_netto`, `default_price_netto`, `quantity`, `weight`, `unit` and
//! `min_order`. Category paths come as repeated
//! `<category><![CDATA[Psy / Sucha karma / …]]></category>` elements, either
//! directly under the product or inside a `<categories>` wrapper. Images
//! come in two shapes: a `<images><img><url>…</url></img>…</images>` list,
//! or a single `<large>`/`<main>` field inside `<images>`. The EAN barcode
//! hides in `<attribute type="1"><value>…</value></attribute>`.
//!
//! Text fields arrive CDATA-wrapped with uneven whitespace and the odd
//! stray markup fragment; [`clean_text`] normalizes all of that before any
//! value is used downstream. Records missing `id`, `code` or `name` are
//! dropped with a warning; the rest of the document still parses.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use karmo_core::Product;

use crate::error::FeedError;

/// Parses a full catalog document into products, in document order.
///
/// # Errors
///
/// - [`FeedError::Xml`] — the document is structurally broken XML
///   (mismatched tags, truncated element). Individual records missing
///   required fields do NOT trigger this; they are skipped with a warning.
/// - [`FeedError::NotXml`] — the body contains no XML elements at all
///   (e.g. a JSON error page served where the feed should be).
pub fn parse_products(xml: &str) -> Result<Vec<Product>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut builder: Option<ProductBuilder> = None;
    let mut attribute_type: Option<String> = None;
    let mut saw_element = false;
    let mut products = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_element = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let parent = stack.last().map_or("", String::as_str);

                if builder.is_none() {
                    if name == "product" {
                        builder = Some(ProductBuilder::default());
                    }
                    stack.push(name);
                    continue;
                }

                match name.as_str() {
                    "id" | "code" | "name" | "description" | "producer" | "active"
                    | "price_netto" | "default_price_netto" | "quantity" | "weight" | "unit"
                    | "min_order"
                        if parent == "product" =>
                    {
                        let value = read_leaf(&mut reader, &e)?;
                        if let Some(b) = builder.as_mut() {
                            b.set_field(&name, value);
                        }
                    }
                    "category" if parent == "product" || parent == "categories" => {
                        let value = read_leaf(&mut reader, &e)?;
                        if !value.is_empty() {
                            if let Some(b) = builder.as_mut() {
                                b.categories.push(value);
                            }
                        }
                    }
                    "url" if parent == "img" => {
                        let value = read_leaf(&mut reader, &e)?;
                        if let Some(b) = builder.as_mut() {
                            b.push_image(value);
                        }
                    }
                    "large" | "main" if parent == "images" => {
                        let value = read_leaf(&mut reader, &e)?;
                        if let Some(b) = builder.as_mut() {
                            b.push_image(value);
                        }
                    }
                    "value" if parent == "attribute" && attribute_type.as_deref() == Some("1") => {
                        let value = read_leaf(&mut reader, &e)?;
                        if let Some(b) = builder.as_mut() {
                            b.ean = Some(value);
                        }
                    }
                    "attribute" => {
                        attribute_type = e
                            .try_get_attribute("type")
                            .ok()
                            .flatten()
                            .map(|a| String::from_utf8_lossy(&a.value).into_owned());
                        stack.push(name);
                    }
                    _ => stack.push(name),
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "product" {
                    if let Some(b) = builder.take() {
                        match b.build() {
                            Some(product) => products.push(product),
                            None => {
                                tracing::warn!("skipping product record missing id, code or name");
                            }
                        }
                    }
                }
                if name == "attribute" {
                    attribute_type = None;
                }
                stack.pop();
            }
            Ok(Event::Empty(_)) => saw_element = true,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FeedError::Xml {
                    context: "catalog document".to_owned(),
                    source: e,
                })
            }
            _ => {}
        }
    }

    if !saw_element {
        return Err(FeedError::NotXml {
            context: "catalog document contains no XML elements".to_owned(),
        });
    }

    Ok(products)
}

/// Reads the full inner content of a leaf element (consuming through its end
/// tag) and cleans it.
fn read_leaf(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String, FeedError> {
    let end = start.name().as_ref().to_vec();
    let raw = reader.read_text(QName(&end)).map_err(|e| FeedError::Xml {
        context: format!(
            "field <{}>",
            String::from_utf8_lossy(start.name().as_ref())
        ),
        source: e,
    })?;
    Ok(clean_text(&raw))
}

/// Normalizes a raw field value: CDATA wrappers stripped, stray embedded
/// tags removed, entities resolved, whitespace collapsed and trimmed.
/// Applied uniformly to every extracted text field — category strings in
/// particular must be clean before they become hierarchy keys.
pub(crate) fn clean_text(raw: &str) -> String {
    let without_cdata = raw.replace("<![CDATA[", "").replace("]]>", "");
    let mut stripped = String::with_capacity(without_cdata.len());
    let mut in_tag = false;
    for ch in without_cdata.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    match quick_xml::escape::unescape(&collapsed) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => collapsed,
    }
}

fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Accumulates one `<product>` element's fields until `build` decides
/// whether the record qualifies for the catalog.
#[derive(Default)]
struct ProductBuilder {
    id: Option<String>,
    code: Option<String>,
    name: Option<String>,
    description: Option<String>,
    producer: Option<String>,
    active: Option<String>,
    categories: Vec<String>,
    price_netto: Option<String>,
    default_price_netto: Option<String>,
    quantity: Option<String>,
    images: Vec<String>,
    weight: Option<String>,
    unit: Option<String>,
    ean: Option<String>,
    min_order: Option<String>,
}

impl ProductBuilder {
    fn set_field(&mut self, tag: &str, value: String) {
        match tag {
            "id" => self.id = Some(value),
            "code" => self.code = Some(value),
            "name" => self.name = Some(value),
            "description" => self.description = Some(value),
            "producer" => self.producer = Some(value),
            "active" => self.active = Some(value),
            "price_netto" => self.price_netto = Some(value),
            "default_price_netto" => self.default_price_netto = Some(value),
            "quantity" => self.quantity = Some(value),
            "weight" => self.weight = Some(value),
            "unit" => self.unit = Some(value),
            "min_order" => self.min_order = Some(value),
            _ => {}
        }
    }

    /// Only scheme-prefixed absolute URLs are accepted; anything else is
    /// skipped rather than failing the record.
    fn push_image(&mut self, url: String) {
        if is_absolute_url(&url) {
            self.images.push(url);
        }
    }

    /// A record is included only with non-empty `id`, `code` and `name`.
    fn build(self) -> Option<Product> {
        let id = self.id.filter(|s| !s.is_empty())?;
        let sku = self.code.filter(|s| !s.is_empty())?;
        let name = self.name.filter(|s| !s.is_empty())?;
        Some(Product {
            id,
            sku,
            name,
            description: self.description.filter(|s| !s.is_empty()),
            manufacturer: self.producer.unwrap_or_default(),
            categories: self.categories,
            price_net: self.price_netto.unwrap_or_else(|| "0".to_string()),
            default_price_net: self.default_price_netto.unwrap_or_else(|| "0".to_string()),
            stock_quantity: self.quantity.unwrap_or_else(|| "0".to_string()),
            active: self.active.as_deref().is_none_or(|v| v == "1"),
            images: self.images,
            weight: self.weight.unwrap_or_else(|| "0".to_string()),
            unit: self.unit.unwrap_or_else(|| "sztuka".to_string()),
            ean: self.ean.filter(|s| !s.is_empty()),
            min_order_quantity: self.min_order.unwrap_or_else(|| "1".to_string()),
        })
    }
}
