//! Secondary stock/price feed parsing and the SKU-keyed overlay merge.
//!
//! Some providers split the slow-changing catalog (names, descriptions,
//! categories) from the fast-changing stock data (prices, quantities) into
//! two documents. The stock document reuses the `<product>` shape restricted
//! to `code`, `quantity`, `price_netto`, `active` and `min_order`.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use karmo_core::Product;

use crate::error::FeedError;
use crate::parse::clean_text;

/// One row of the stock overlay document.
#[derive(Debug, Clone)]
pub struct StockRecord {
    pub sku: String,
    pub quantity: String,
    pub price_net: String,
    pub active: bool,
    pub min_order: String,
}

#[derive(Default)]
struct StockBuilder {
    code: Option<String>,
    quantity: Option<String>,
    price_netto: Option<String>,
    active: Option<String>,
    min_order: Option<String>,
}

impl StockBuilder {
    fn build(self) -> Option<StockRecord> {
        let sku = self.code.filter(|s| !s.is_empty())?;
        Some(StockRecord {
            sku,
            quantity: self.quantity.unwrap_or_else(|| "0".to_string()),
            price_net: self.price_netto.unwrap_or_else(|| "0".to_string()),
            active: self.active.as_deref().is_none_or(|v| v == "1"),
            min_order: self.min_order.unwrap_or_else(|| "1".to_string()),
        })
    }
}

/// Parses the stock overlay document. Records without a `code` are skipped.
///
/// # Errors
///
/// Same document-level policy as the catalog parser: [`FeedError::Xml`] for
/// broken XML, [`FeedError::NotXml`] for a body with no elements.
pub fn parse_stock_feed(xml: &str) -> Result<Vec<StockRecord>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut builder: Option<StockBuilder> = None;
    let mut current: Option<String> = None;
    let mut text = String::new();
    let mut saw_element = false;
    let mut records = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_element = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "product" {
                    builder = Some(StockBuilder::default());
                } else if builder.is_some() {
                    current = Some(name);
                    text.clear();
                }
            }
            Ok(Event::Text(e)) => {
                text.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "product" {
                    if let Some(b) = builder.take() {
                        match b.build() {
                            Some(record) => records.push(record),
                            None => tracing::warn!("skipping stock record missing code"),
                        }
                    }
                } else if current.as_deref() == Some(name.as_str()) {
                    let value = clean_text(&text);
                    if let Some(b) = builder.as_mut() {
                        match name.as_str() {
                            "code" => b.code = Some(value),
                            "quantity" => b.quantity = Some(value),
                            "price_netto" => b.price_netto = Some(value),
                            "active" => b.active = Some(value),
                            "min_order" => b.min_order = Some(value),
                            _ => {}
                        }
                    }
                    current = None;
                    text.clear();
                }
            }
            Ok(Event::Empty(_)) => saw_element = true,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FeedError::Xml {
                    context: "stock document".to_owned(),
                    source: e,
                })
            }
            _ => {}
        }
    }

    if !saw_element {
        return Err(FeedError::NotXml {
            context: "stock document contains no XML elements".to_owned(),
        });
    }

    Ok(records)
}

/// Overlays stock records onto the parsed catalog, keyed strictly by SKU.
///
/// A matched product gets exactly `price_net`, `stock_quantity`, `active`
/// and `min_order_quantity` replaced; everything else stays as parsed from
/// the primary feed. Records with no matching product are silently dropped,
/// products with no matching record are left untouched.
pub fn merge_stock(products: &mut [Product], records: Vec<StockRecord>) {
    let overlay: HashMap<String, StockRecord> = records
        .into_iter()
        .map(|record| (record.sku.clone(), record))
        .collect();

    for product in products.iter_mut() {
        if let Some(record) = overlay.get(&product.sku) {
            product.price_net = record.price_net.clone();
            product.stock_quantity = record.quantity.clone();
            product.active = record.active;
            product.min_order_quantity = record.min_order.clone();
        }
    }
}
